use swarmflow_core::GroupExecutionReport;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    /// swarm init の出力にトークンがない
    #[error("swarm init の出力に参加コマンドが見つかりません")]
    JoinCommandNotFound,

    #[error("クラスタグループにホストがありません")]
    NoManager,

    /// swarm init 自体が非ゼロで終了
    #[error("swarm init が終了コード {exit_status} で失敗しました: {stderr}")]
    InitCommandFailed { exit_status: i32, stderr: String },

    #[error("マネージャー {manager} の初期化に失敗しました ({attempts}回試行): {source}")]
    ManagerInitFailed {
        manager: String,
        attempts: u32,
        #[source]
        source: Box<ClusterError>,
        report: Box<GroupExecutionReport>,
    },

    #[error(
        "ワーカーの参加に失敗しました: {}/{} 台 ({})",
        .report.failures().len(),
        .report.results.len(),
        failed_hosts(.report)
    )]
    WorkerJoinFailed { report: Box<GroupExecutionReport> },

    #[error("{artifact} の配布に失敗しました ({})", failed_hosts(.report))]
    ArtifactDistribution {
        artifact: String,
        report: Box<GroupExecutionReport>,
    },

    #[error("正規表現エラー: {0}")]
    Pattern(#[from] regex::Error),
}

impl ClusterError {
    /// 失敗の原因となったグループレポート
    pub fn report(&self) -> Option<&GroupExecutionReport> {
        match self {
            ClusterError::ManagerInitFailed { report, .. }
            | ClusterError::WorkerJoinFailed { report }
            | ClusterError::ArtifactDistribution { report, .. } => Some(report),
            _ => None,
        }
    }

    pub(crate) fn artifact(artifact: impl Into<String>, report: GroupExecutionReport) -> Self {
        ClusterError::ArtifactDistribution {
            artifact: artifact.into(),
            report: Box::new(report),
        }
    }
}

fn failed_hosts(report: &GroupExecutionReport) -> String {
    report
        .failures()
        .iter()
        .map(|r| r.host.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ClusterError>;
