//! Swarm クラスタのフォーメーション
//!
//! RESET → MANAGER_INIT → TOKEN_EXTRACTED → WORKERS_JOINING → CLUSTER_READY
//! の順に遷移する。各段階のグループレポートはすべて保持される。

use crate::error::{ClusterError, Result};
use crate::join::{JoinCredential, extract_join_command};
use crate::scripts;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use swarmflow_core::{FailurePolicy, GroupExecutionReport, NodeGroup, Operation};
use swarmflow_remote::{Transport, run_on_group};

/// フォーメーションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormationState {
    Pending,
    Reset,
    ManagerInit,
    TokenExtracted,
    WorkersJoining { workers: usize },
    ClusterReady,
    Failed,
}

impl fmt::Display for FormationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormationState::Pending => write!(f, "PENDING"),
            FormationState::Reset => write!(f, "RESET"),
            FormationState::ManagerInit => write!(f, "MANAGER_INIT"),
            FormationState::TokenExtracted => write!(f, "TOKEN_EXTRACTED"),
            FormationState::WorkersJoining { workers } => write!(f, "WORKERS_JOINING({})", workers),
            FormationState::ClusterReady => write!(f, "CLUSTER_READY"),
            FormationState::Failed => write!(f, "FAILED"),
        }
    }
}

/// 1回のフォーメーション試行
pub struct ClusterFormation<'a> {
    transport: &'a dyn Transport,
    cluster: &'a NodeGroup,
    advertise_addr: String,
    timeout: Duration,
    init_attempts: u32,
    history: Vec<FormationState>,
    reports: Vec<GroupExecutionReport>,
}

impl<'a> ClusterFormation<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        cluster: &'a NodeGroup,
        advertise_addr: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            cluster,
            advertise_addr: advertise_addr.into(),
            timeout,
            init_attempts: 1,
            history: vec![FormationState::Pending],
            reports: Vec::new(),
        }
    }

    /// マネージャー初期化の試行回数（1 = 再試行なし）
    pub fn with_init_attempts(mut self, attempts: u32) -> Self {
        self.init_attempts = attempts.max(1);
        self
    }

    pub fn state(&self) -> FormationState {
        self.history
            .last()
            .copied()
            .unwrap_or(FormationState::Pending)
    }

    /// これまでの遷移（Pending から）
    pub fn history(&self) -> &[FormationState] {
        &self.history
    }

    pub fn reports(&self) -> &[GroupExecutionReport] {
        &self.reports
    }

    pub fn into_reports(self) -> Vec<GroupExecutionReport> {
        self.reports
    }

    fn transition(&mut self, next: FormationState) {
        tracing::info!(from = %self.state(), to = %next, "cluster formation");
        self.history.push(next);
    }

    async fn run_op(
        &self,
        group: &NodeGroup,
        command: String,
        policy: FailurePolicy,
    ) -> GroupExecutionReport {
        run_on_group(
            self.transport,
            group,
            &Operation::Command(command),
            policy,
            self.timeout,
        )
        .await
    }

    /// 全ホストで Swarm から強制離脱（best-effort）
    pub async fn reset(&mut self) -> &GroupExecutionReport {
        self.transition(FormationState::Reset);
        let report = self
            .run_op(
                self.cluster,
                scripts::LEAVE_SWARM.to_string(),
                FailurePolicy::BestEffort,
            )
            .await;
        self.push_report(report)
    }

    fn push_report(&mut self, report: GroupExecutionReport) -> &GroupExecutionReport {
        self.reports.push(report);
        let last = self.reports.len() - 1;
        &self.reports[last]
    }

    /// マネージャーを初期化して参加資格情報を取り出す
    pub async fn init_manager(&mut self) -> Result<JoinCredential> {
        let head = self.cluster.head();
        let manager = head.first().ok_or(ClusterError::NoManager)?.id.clone();

        let mut attempt = 0;
        loop {
            attempt += 1;
            if attempt > 1 {
                tracing::warn!(manager = %manager, attempt, "retrying manager init");
                let leave = self
                    .run_op(
                        &head,
                        scripts::LEAVE_SWARM.to_string(),
                        FailurePolicy::BestEffort,
                    )
                    .await;
                self.reports.push(leave);
            }

            self.transition(FormationState::ManagerInit);
            let report = self
                .run_op(
                    &head,
                    scripts::swarm_init(&self.advertise_addr),
                    FailurePolicy::FailFast,
                )
                .await;

            let outcome = match report.results.first() {
                Some(result) if result.success() => {
                    extract_join_command(&result.combined_output())
                }
                Some(result) => Err(ClusterError::InitCommandFailed {
                    exit_status: result.exit_status,
                    stderr: result.stderr.trim().to_string(),
                }),
                None => Err(ClusterError::NoManager),
            };

            match outcome {
                Ok(credential) => {
                    self.reports.push(report);
                    self.transition(FormationState::TokenExtracted);
                    return Ok(credential);
                }
                Err(cause) if attempt >= self.init_attempts => {
                    self.reports.push(report.clone());
                    self.transition(FormationState::Failed);
                    return Err(ClusterError::ManagerInitFailed {
                        manager,
                        attempts: attempt,
                        source: Box::new(cause),
                        report: Box::new(report),
                    });
                }
                Err(cause) => {
                    tracing::warn!(manager = %manager, "{}", cause);
                    self.reports.push(report);
                }
            }
        }
    }

    /// マネージャー以外の全ホストを参加させる
    pub async fn join_workers(&mut self, credential: &JoinCredential) -> Result<()> {
        let workers = self.cluster.workers();
        self.transition(FormationState::WorkersJoining {
            workers: workers.len(),
        });

        let report = self
            .run_op(
                &workers,
                credential.worker_command(),
                FailurePolicy::FailFast,
            )
            .await;

        if report.is_fatal() {
            self.reports.push(report.clone());
            self.transition(FormationState::Failed);
            return Err(ClusterError::WorkerJoinFailed {
                report: Box::new(report),
            });
        }

        self.reports.push(report);
        self.transition(FormationState::ClusterReady);
        Ok(())
    }

    /// リセット済みのグループでクラスタを組む
    pub async fn form(&mut self) -> Result<JoinCredential> {
        let credential = self.init_manager().await?;
        self.join_workers(&credential).await?;
        Ok(credential)
    }

    /// リセットからクラスタ完成までを通しで実行
    pub async fn run(&mut self) -> Result<JoinCredential> {
        self.reset().await;
        self.form().await
    }
}
