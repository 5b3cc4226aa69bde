use swarmflow_cluster::ClusterError;
use swarmflow_core::GroupExecutionReport;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("ステージ '{stage}' が失敗しました: {}", failed_hosts(.report))]
    StageFailed {
        stage: String,
        report: Box<GroupExecutionReport>,
    },

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("ステージ '{stage}' には {what} の設定が必要です")]
    MissingInput { stage: String, what: &'static str },

    #[error("不明なステージ: {0}")]
    UnknownStage(String),
}

impl PipelineError {
    /// 失敗の原因となったグループレポート
    pub fn report(&self) -> Option<&GroupExecutionReport> {
        match self {
            PipelineError::StageFailed { report, .. } => Some(report),
            PipelineError::Cluster(e) => e.report(),
            _ => None,
        }
    }
}

fn failed_hosts(report: &GroupExecutionReport) -> String {
    report
        .failures()
        .iter()
        .map(|r| format!("{} (exit {})", r.host.id, r.exit_status))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, PipelineError>;
