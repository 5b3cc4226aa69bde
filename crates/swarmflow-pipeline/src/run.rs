//! パイプライン実行の記録
//!
//! `PipelineRun` は起動ごとに1つだけ作られ、シーケンサーだけが更新する。

use serde::Serialize;
use std::time::Duration;
use swarmflow_cluster::JoinCredential;
use swarmflow_core::{GroupExecutionReport, Stage};

/// 実行全体の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Succeeded,
    Aborted,
}

/// ステージ単位の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    Succeeded,
    Skipped,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub outcome: StageOutcome,
    pub reports: Vec<GroupExecutionReport>,
    pub duration: Duration,
}

impl StageReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, StageOutcome::Failed { .. })
    }

    /// best-effort で無視された失敗ホスト数
    pub fn tolerated_failures(&self) -> usize {
        self.reports.iter().map(|r| r.failures().len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    stages: Vec<Stage>,
    current: usize,
    status: RunStatus,
    reports: Vec<StageReport>,
    failed_stage: Option<usize>,
    credential: Option<JoinCredential>,
}

impl PipelineRun {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            current: 0,
            status: RunStatus::Running,
            reports: Vec::new(),
            failed_stage: None,
            credential: None,
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// 実行中（または中断した）ステージの位置
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    pub fn is_aborted(&self) -> bool {
        self.status == RunStatus::Aborted
    }

    /// 試行したステージのレポート（宣言順）
    pub fn reports(&self) -> &[StageReport] {
        &self.reports
    }

    pub fn report_for(&self, stage: &str) -> Option<&StageReport> {
        self.reports.iter().find(|r| r.stage == stage)
    }

    /// 中断の原因となったステージの位置
    pub fn failed_stage(&self) -> Option<usize> {
        self.failed_stage
    }

    pub fn failed_report(&self) -> Option<&StageReport> {
        self.reports.iter().find(|r| r.is_failed())
    }

    /// フォーメーションで得た参加資格情報
    pub fn credential(&self) -> Option<&JoinCredential> {
        self.credential.as_ref()
    }

    pub(crate) fn set_credential(&mut self, credential: JoinCredential) {
        self.credential = Some(credential);
    }

    /// 現在のステージの結果を記録して次へ進む
    pub(crate) fn record(&mut self, report: StageReport) {
        if report.is_failed() {
            self.failed_stage = Some(self.current);
            self.status = RunStatus::Aborted;
        }
        self.reports.push(report);
        if self.status == RunStatus::Running {
            self.current += 1;
            if self.current >= self.stages.len() {
                self.status = RunStatus::Succeeded;
            }
        }
    }

    /// ステージがない場合も含めて終端状態にする
    pub(crate) fn finish(&mut self) {
        if self.status == RunStatus::Running && self.current >= self.stages.len() {
            self.status = RunStatus::Succeeded;
        }
    }
}
