//! ステージ定義
//!
//! ステージは静的に宣言され、実行中は読み取り専用。

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// 失敗時の振る舞い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// 1ホストでも失敗したらステージを中断
    #[default]
    FailFast,
    /// 失敗は記録するが中断しない
    BestEffort,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "fail-fast"),
            FailurePolicy::BestEffort => write!(f, "best-effort"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail-fast" => Ok(FailurePolicy::FailFast),
            "best-effort" => Ok(FailurePolicy::BestEffort),
            other => Err(CoreError::UnknownPolicy(other.to_string())),
        }
    }
}

/// ステージの実行対象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// マネージャー＋全ワーカー
    Cluster,
    /// マネージャーを除くワーカー
    Workers,
    /// マネージャーのみ
    Manager,
    /// 全クライアント
    Clients,
    /// 先頭のクライアントのみ
    FirstClient,
    /// オーケストレータ自身
    Local,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Target::Cluster => "cluster",
            Target::Workers => "workers",
            Target::Manager => "manager",
            Target::Clients => "clients",
            Target::FirstClient => "first-client",
            Target::Local => "local",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Target {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cluster" => Ok(Target::Cluster),
            "workers" => Ok(Target::Workers),
            "manager" => Ok(Target::Manager),
            "clients" => Ok(Target::Clients),
            "first-client" => Ok(Target::FirstClient),
            "local" => Ok(Target::Local),
            other => Err(CoreError::UnknownTarget(other.to_string())),
        }
    }
}

/// ファンアウトで実行する単一の論理オペレーション
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// シェルコマンド
    Command(String),
    /// ファイル転送（転送先ディレクトリは事前に作成される）
    Transfer { local: PathBuf, remote: PathBuf },
}

impl Operation {
    pub fn command(cmd: impl Into<String>) -> Self {
        Operation::Command(cmd.into())
    }

    pub fn transfer(local: impl Into<PathBuf>, remote: impl Into<PathBuf>) -> Self {
        Operation::Transfer {
            local: local.into(),
            remote: remote.into(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Command(cmd) => write!(f, "$ {}", cmd),
            Operation::Transfer { local, remote } => {
                write!(f, "put {} → {}", local.display(), remote.display())
            }
        }
    }
}

/// ステージが実行する内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageAction {
    /// 対象グループでオペレーションを順番にファンアウト実行
    Operations(Vec<Operation>),
    /// 既存のクラスタ所属を強制解除
    ResetCluster,
    /// マネージャー初期化 → トークン抽出 → ワーカー参加
    FormCluster,
    /// クラスタ上にレジストリサービスを起動
    StartRegistry,
    /// イメージのビルドとレジストリへのプッシュ
    DistributeImages,
    /// クライアントアーカイブの配布・展開・ヘルパーのコンパイル
    DistributeClientArtifact,
}

impl StageAction {
    /// 組み込みステージの種別名（swarm.kdl の kind= に対応）
    pub fn kind(&self) -> &'static str {
        match self {
            StageAction::Operations(_) => "operations",
            StageAction::ResetCluster => "reset-cluster",
            StageAction::FormCluster => "form-cluster",
            StageAction::StartRegistry => "start-registry",
            StageAction::DistributeImages => "distribute-images",
            StageAction::DistributeClientArtifact => "distribute-client",
        }
    }

    /// 種別名から組み込みアクションを生成
    pub fn from_kind(kind: &str) -> Result<Self, CoreError> {
        match kind {
            "reset-cluster" => Ok(StageAction::ResetCluster),
            "form-cluster" => Ok(StageAction::FormCluster),
            "start-registry" => Ok(StageAction::StartRegistry),
            "distribute-images" => Ok(StageAction::DistributeImages),
            "distribute-client" => Ok(StageAction::DistributeClientArtifact),
            other => Err(CoreError::UnknownStageKind(other.to_string())),
        }
    }

    fn default_target(&self) -> Target {
        match self {
            StageAction::Operations(_) => Target::Cluster,
            StageAction::ResetCluster | StageAction::FormCluster => Target::Cluster,
            StageAction::StartRegistry => Target::Manager,
            StageAction::DistributeImages => Target::Local,
            StageAction::DistributeClientArtifact => Target::Clients,
        }
    }

    fn default_policy(&self) -> FailurePolicy {
        match self {
            StageAction::ResetCluster => FailurePolicy::BestEffort,
            _ => FailurePolicy::FailFast,
        }
    }
}

/// 名前付きステージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// ステージ名（--skip で使用するID）
    pub name: String,
    pub target: Target,
    pub policy: FailurePolicy,
    pub action: StageAction,
}

impl Stage {
    /// 組み込みアクションのステージ（ターゲット・ポリシーは既定値）
    pub fn builtin(name: impl Into<String>, action: StageAction) -> Self {
        Self {
            name: name.into(),
            target: action.default_target(),
            policy: action.default_policy(),
            action,
        }
    }

    /// コマンドを順に実行するステージ
    pub fn run<I, S>(name: impl Into<String>, target: Target, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ops = commands.into_iter().map(Operation::command).collect();
        Self {
            name: name.into(),
            target,
            policy: FailurePolicy::FailFast,
            action: StageAction::Operations(ops),
        }
    }

    /// 任意のオペレーション列を実行するステージ
    pub fn operations(name: impl Into<String>, target: Target, ops: Vec<Operation>) -> Self {
        Self {
            name: name.into(),
            target,
            policy: FailurePolicy::FailFast,
            action: StageAction::Operations(ops),
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn best_effort(self) -> Self {
        self.with_policy(FailurePolicy::BestEffort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_round_trip_names() {
        for name in ["cluster", "workers", "manager", "clients", "first-client", "local"] {
            let target: Target = name.parse().unwrap();
            assert_eq!(target.to_string(), name);
        }
        assert!("everyone".parse::<Target>().is_err());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "best-effort".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::BestEffort
        );
        assert!(matches!(
            "sometimes".parse::<FailurePolicy>(),
            Err(CoreError::UnknownPolicy(_))
        ));
    }

    #[test]
    fn test_builtin_defaults() {
        let reset = Stage::builtin("reset", StageAction::ResetCluster);
        assert_eq!(reset.policy, FailurePolicy::BestEffort);
        assert_eq!(reset.target, Target::Cluster);

        let registry = Stage::builtin("registry", StageAction::StartRegistry);
        assert_eq!(registry.policy, FailurePolicy::FailFast);
        assert_eq!(registry.target, Target::Manager);
    }

    #[test]
    fn test_from_kind() {
        assert_eq!(
            StageAction::from_kind("form-cluster").unwrap(),
            StageAction::FormCluster
        );
        assert_eq!(StageAction::FormCluster.kind(), "form-cluster");
        assert!(StageAction::from_kind("teleport").is_err());
    }
}
