//! 配布アーティファクト定義

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// レジストリの既定ポート
pub const DEFAULT_REGISTRY_PORT: u16 = 5000;

/// エフェメラルレジストリのアドレス
///
/// マネージャーからは 127.0.0.1 で到達でき、他ノードからはクラスタ内アドレスで到達する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAddress {
    pub host: String,
    pub port: u16,
}

impl RegistryAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// マネージャーから見たレジストリ
    pub fn loopback() -> Self {
        Self::new("127.0.0.1", DEFAULT_REGISTRY_PORT)
    }

    /// `<host>:<port>/<name>:<variant>` 形式のイメージ参照
    pub fn image_reference(&self, image: &ImageSpec) -> String {
        format!("{}/{}:{}", self, image.name, image.variant())
    }
}

impl Default for RegistryAddress {
    fn default() -> Self {
        Self::loopback()
    }
}

impl fmt::Display for RegistryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// ビルドしてレジストリにプッシュするイメージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    /// イメージ名（レジストリ・タグなし）
    pub name: String,

    /// ビルドコンテキスト（ビルドホストのホームからの相対パス可）
    pub context: PathBuf,

    /// タグ（省略時は latest）
    #[serde(default)]
    pub variant: Option<String>,

    /// Dockerfile（省略時はコンテキスト直下の Dockerfile）
    #[serde(default)]
    pub dockerfile: Option<PathBuf>,
}

impl ImageSpec {
    pub fn new(name: impl Into<String>, context: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            context: context.into(),
            variant: None,
            dockerfile: None,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn variant(&self) -> &str {
        self.variant.as_deref().unwrap_or("latest")
    }

    pub fn dockerfile_path(&self) -> PathBuf {
        match &self.dockerfile {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.context.join(path),
            None => self.context.join("Dockerfile"),
        }
    }
}

/// クライアントホストでソースからビルドする小さなネイティブプログラム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperProgram {
    /// Cソース（リモートのホーム相対）
    pub source: String,
    /// 出力バイナリ（リモートのホーム相対）
    pub output: String,
}

/// クライアントに直接配布するアーカイブ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientArtifact {
    /// ローカルのアーカイブ（zip）
    pub archive: PathBuf,

    /// リモートの配置先（省略時はホーム直下に同名で配置）
    #[serde(default)]
    pub remote: Option<PathBuf>,

    /// 展開後のルートディレクトリ名
    pub root: String,

    /// ルートからホーム直下へ移動するエントリ
    #[serde(default)]
    pub moves: Vec<String>,

    #[serde(default)]
    pub helper: Option<HelperProgram>,
}

impl ClientArtifact {
    pub fn new(archive: impl Into<PathBuf>, root: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
            remote: None,
            root: root.into(),
            moves: Vec::new(),
            helper: None,
        }
    }

    /// リモートでのアーカイブパス
    pub fn remote_path(&self) -> PathBuf {
        match &self.remote {
            Some(path) => path.clone(),
            None => self
                .archive
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| self.archive.clone()),
        }
    }
}
