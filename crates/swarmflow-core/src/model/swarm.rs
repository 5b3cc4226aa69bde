//! Swarm定義（swarm.kdl 全体）

use super::artifact::{ClientArtifact, ImageSpec};
use super::stage::Stage;
use crate::inventory::DEFAULT_HOST_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// リモート操作の既定タイムアウト（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// swarm.kdl の内容
///
/// `stages` が空の場合は組み込みのパイプラインが使われる。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwarmConfig {
    pub cluster: ClusterSettings,
    #[serde(default)]
    pub images: Vec<ImageSpec>,
    #[serde(default)]
    pub client_artifact: Option<ClientArtifact>,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

/// クラスタ構成と接続設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSettings {
    /// マネージャー＋ワーカーのホスト数
    pub size: Option<usize>,
    /// クライアントのホスト数
    pub clients: Option<usize>,
    /// マネージャーが広告するアドレス
    pub manager: Option<String>,
    /// ホスト名のプレフィックス
    pub prefix: String,
    pub user: Option<String>,
    pub identity: Option<PathBuf>,
    /// 1オペレーションあたりのタイムアウト（秒）
    pub timeout_secs: u64,
    /// マネージャー初期化の最大試行回数
    pub init_attempts: u32,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            size: None,
            clients: None,
            manager: None,
            prefix: DEFAULT_HOST_PREFIX.to_string(),
            user: None,
            identity: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            init_attempts: 1,
        }
    }
}

impl ClusterSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
