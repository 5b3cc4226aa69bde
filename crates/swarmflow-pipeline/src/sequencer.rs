//! fail-fast ステージシーケンサー
//!
//! ステージを宣言順に1回ずつ実行する。fail-fast のステージが失敗したら
//! 中断し、後続ステージは実行しない（ロールバックもしない）。

use crate::error::{PipelineError, Result};
use crate::logger::PipelineLogger;
use crate::run::{PipelineRun, StageOutcome, StageReport};
use crate::target::resolve_target;
use std::sync::Arc;
use std::time::{Duration, Instant};
use swarmflow_build::ImagePublisher;
use swarmflow_cluster::{
    ClusterFormation, JoinCredential, distribute_client_artifact, distribute_images,
    start_registry,
};
use swarmflow_core::{
    ClientArtifact, DEFAULT_TIMEOUT_SECS, GroupExecutionReport, ImageSpec, Inventory,
    RegistryAddress, Stage, StageAction, Target,
};
use swarmflow_remote::{Transport, run_operations};

/// ステージ実行に必要なもの一式
pub struct SequencerContext {
    pub inventory: Inventory,
    /// クラスタ・クライアントへのトランスポート
    pub remote: Arc<dyn Transport>,
    /// `local` ターゲット用のトランスポート
    pub local: Arc<dyn Transport>,
    pub publisher: Option<Arc<dyn ImagePublisher>>,
    /// マネージャーの advertise アドレス
    pub advertise_addr: String,
    pub registry: RegistryAddress,
    pub images: Vec<ImageSpec>,
    pub client_artifact: Option<ClientArtifact>,
    pub timeout: Duration,
    pub init_attempts: u32,
}

impl SequencerContext {
    pub fn new(
        inventory: Inventory,
        remote: Arc<dyn Transport>,
        local: Arc<dyn Transport>,
        advertise_addr: impl Into<String>,
    ) -> Self {
        Self {
            inventory,
            remote,
            local,
            publisher: None,
            advertise_addr: advertise_addr.into(),
            registry: RegistryAddress::loopback(),
            images: Vec::new(),
            client_artifact: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            init_attempts: 1,
        }
    }

    fn transport_for(&self, target: Target) -> &dyn Transport {
        match target {
            Target::Local => self.local.as_ref(),
            _ => self.remote.as_ref(),
        }
    }
}

pub struct StageSequencer {
    ctx: SequencerContext,
    skip: Vec<String>,
    logger: Option<PipelineLogger>,
}

impl StageSequencer {
    pub fn new(ctx: SequencerContext) -> Self {
        Self {
            ctx,
            skip: Vec::new(),
            logger: None,
        }
    }

    /// 実行せずに記録だけするステージ
    pub fn with_skip(mut self, skip: Vec<String>) -> Self {
        self.skip = skip;
        self
    }

    /// 進捗を標準出力に表示する
    pub fn with_logger(mut self, logger: PipelineLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn context(&self) -> &SequencerContext {
        &self.ctx
    }

    /// スキップ指定がすべて既知のステージ名か確認
    pub fn validate(&self, stages: &[Stage]) -> Result<()> {
        match self
            .skip
            .iter()
            .find(|id| !stages.iter().any(|s| &s.name == *id))
        {
            Some(unknown) => Err(PipelineError::UnknownStage(unknown.clone())),
            None => Ok(()),
        }
    }

    /// パイプラインを実行する
    pub async fn run(&self, stages: Vec<Stage>) -> PipelineRun {
        let mut run = PipelineRun::new(stages);
        let total = run.stages().len();
        // 直前のフォーメーション以降にリセットが完了しているか
        let mut reset_done = false;

        for index in 0..total {
            let stage = run.stages()[index].clone();

            if self.skip.contains(&stage.name) {
                if let Some(logger) = &self.logger {
                    logger.stage_skipped(&stage, "--skip");
                }
                run.record(StageReport {
                    stage: stage.name.clone(),
                    outcome: StageOutcome::Skipped,
                    reports: Vec::new(),
                    duration: Duration::ZERO,
                });
                continue;
            }

            if let Some(logger) = &self.logger {
                logger.start_stage(index, total, &stage);
            }
            tracing::info!(stage = %stage.name, index, "stage started");

            let started = Instant::now();
            let outcome = self.execute(&stage, reset_done).await;
            let duration = started.elapsed();

            let report = match outcome {
                Ok((reports, credential)) => {
                    match stage.action {
                        StageAction::ResetCluster => reset_done = true,
                        StageAction::FormCluster => reset_done = false,
                        _ => {}
                    }
                    if let Some(logger) = &self.logger {
                        for report in reports.iter().filter(|r| !r.aggregate_success()) {
                            logger.log_report(report);
                        }
                        logger.stage_success(&stage, duration);
                    }
                    if let Some(credential) = credential {
                        run.set_credential(credential);
                    }
                    StageReport {
                        stage: stage.name.clone(),
                        outcome: StageOutcome::Succeeded,
                        reports,
                        duration,
                    }
                }
                Err(e) => {
                    tracing::error!(stage = %stage.name, index, "{}", e);
                    if let Some(logger) = &self.logger {
                        logger.stage_failed(&stage, &e.to_string());
                        if let Some(report) = e.report() {
                            logger.log_report(report);
                        }
                    }
                    StageReport {
                        stage: stage.name.clone(),
                        outcome: StageOutcome::Failed {
                            error: e.to_string(),
                        },
                        reports: e.report().cloned().into_iter().collect(),
                        duration,
                    }
                }
            };

            run.record(report);
            if run.is_aborted() {
                break;
            }
        }

        run.finish();
        if let Some(logger) = &self.logger {
            logger.print_summary(&run);
        }
        run
    }

    /// 1ステージを実行
    ///
    /// `reset_done` が偽ならフォーメーションの前に強制離脱を行う。
    async fn execute(
        &self,
        stage: &Stage,
        reset_done: bool,
    ) -> Result<(Vec<GroupExecutionReport>, Option<JoinCredential>)> {
        let ctx = &self.ctx;
        let group = resolve_target(stage.target, &ctx.inventory);
        let transport = ctx.transport_for(stage.target);

        match &stage.action {
            StageAction::Operations(ops) => {
                let mut reports =
                    run_operations(transport, &group, ops, stage.policy, ctx.timeout).await;
                if reports.last().is_some_and(GroupExecutionReport::is_fatal)
                    && let Some(report) = reports.pop()
                {
                    return Err(PipelineError::StageFailed {
                        stage: stage.name.clone(),
                        report: Box::new(report),
                    });
                }
                Ok((reports, None))
            }
            StageAction::ResetCluster => {
                let mut formation =
                    ClusterFormation::new(transport, &group, &ctx.advertise_addr, ctx.timeout);
                formation.reset().await;
                Ok((formation.into_reports(), None))
            }
            StageAction::FormCluster => {
                let mut formation =
                    ClusterFormation::new(transport, &group, &ctx.advertise_addr, ctx.timeout)
                        .with_init_attempts(ctx.init_attempts);
                if !reset_done {
                    tracing::info!(stage = %stage.name, "no prior reset, leaving swarm first");
                    formation.reset().await;
                }
                let credential = formation.form().await?;
                if let Some(logger) = &self.logger {
                    logger.log_detail(&format!("manager {}", credential.manager));
                }
                Ok((formation.into_reports(), Some(credential)))
            }
            StageAction::StartRegistry => {
                let report = start_registry(transport, &group, &ctx.registry, ctx.timeout).await?;
                Ok((vec![report], None))
            }
            StageAction::DistributeImages => {
                let publisher = ctx.publisher.as_ref().ok_or(PipelineError::MissingInput {
                    stage: stage.name.clone(),
                    what: "image publisher",
                })?;
                let report = distribute_images(publisher.as_ref(), &ctx.registry, &ctx.images)
                    .await?;
                Ok((vec![report], None))
            }
            StageAction::DistributeClientArtifact => {
                let artifact =
                    ctx.client_artifact
                        .as_ref()
                        .ok_or(PipelineError::MissingInput {
                            stage: stage.name.clone(),
                            what: "client-artifact",
                        })?;
                let reports =
                    distribute_client_artifact(transport, &group, artifact, ctx.timeout).await?;
                Ok((reports, None))
            }
        }
    }
}
