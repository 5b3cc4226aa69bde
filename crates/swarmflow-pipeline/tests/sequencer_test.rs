//! シーケンサーの統合テスト
//!
//! ScriptedTransport でホストの応答を差し替えて実行する。

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use swarmflow_build::ImagePublisher;
use swarmflow_core::{
    CommandResult, FailurePolicy, Host, ImageSpec, Stage, StageAction, Target, build_inventory,
};
use swarmflow_pipeline::{
    PipelineError, RunStatus, SequencerContext, StageOutcome, StageSequencer,
    default_client_artifact, default_images, default_pipeline,
};
use swarmflow_remote::testing::ScriptedTransport;

const INIT_OUTPUT: &str = "Swarm initialized: current node (k2j8) is now a manager.\n\
    To add a worker to this swarm, run the following command:\n\
    docker swarm join --token SWMTKN-1-3pu6hszjas19xyp7ghgosyx9k8atbfcr8p2is99znpy26u2lkl-1awxwuwd3z9j1z3puu7rcgdbx 10.10.1.1:2377\n";

struct NoopPublisher;

#[async_trait]
impl ImagePublisher for NoopPublisher {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn publish(
        &self,
        _image: &ImageSpec,
        reference: &str,
    ) -> swarmflow_build::Result<CommandResult> {
        Ok(CommandResult::new(Host::local(), 0, reference, ""))
    }
}

fn context(
    n: usize,
    m: usize,
    remote: Arc<ScriptedTransport>,
    local: Arc<ScriptedTransport>,
) -> SequencerContext {
    let mut ctx = SequencerContext::new(build_inventory(n, m).unwrap(), remote, local, "10.10.1.1");
    ctx.timeout = Duration::from_secs(5);
    ctx
}

#[tokio::test]
async fn test_abort_on_fail_fast_stage() {
    let remote = Arc::new(ScriptedTransport::new());
    let local = Arc::new(ScriptedTransport::new().fail("stage-b", 2, "no such file"));
    let sequencer = StageSequencer::new(context(2, 1, remote, local.clone()));

    let run = sequencer
        .run(vec![
            Stage::run("a", Target::Local, ["echo stage-a"]),
            Stage::run("b", Target::Local, ["echo stage-b"]),
            Stage::run("c", Target::Local, ["echo stage-c"]),
        ])
        .await;

    assert_eq!(run.status(), RunStatus::Aborted);
    assert_eq!(run.failed_stage(), Some(1));
    assert_eq!(run.reports().len(), 2);
    assert!(run.report_for("c").is_none());
    assert!(local.hosts_running("stage-c").is_empty());

    let failed = run.failed_report().unwrap();
    assert_eq!(failed.stage, "b");
    assert_eq!(failed.reports[0].results[0].exit_status, 2);
}

#[tokio::test]
async fn test_best_effort_failure_does_not_abort() {
    let remote = Arc::new(ScriptedTransport::new().fail_on("node-1", "rm -rf", 1, "busy"));
    let local = Arc::new(ScriptedTransport::new());
    let sequencer = StageSequencer::new(context(2, 1, remote.clone(), local));

    let run = sequencer
        .run(vec![
            Stage::run("cleanup", Target::Cluster, ["rm -rf DeathStarBench"]).best_effort(),
            Stage::run("collectl", Target::Cluster, ["apt-get install -y collectl"]),
        ])
        .await;

    assert!(run.is_succeeded());
    assert_eq!(run.report_for("cleanup").unwrap().tolerated_failures(), 1);
    assert_eq!(remote.hosts_running("collectl").len(), 2);
}

#[tokio::test]
async fn test_skipped_stage_is_recorded_not_executed() {
    let remote = Arc::new(ScriptedTransport::new());
    let local = Arc::new(ScriptedTransport::new());
    let sequencer = StageSequencer::new(context(2, 1, remote, local.clone()))
        .with_skip(vec!["b".to_string()]);

    let stages = vec![
        Stage::run("a", Target::Local, ["echo stage-a"]),
        Stage::run("b", Target::Local, ["echo stage-b"]),
    ];
    sequencer.validate(&stages).unwrap();
    let run = sequencer.run(stages).await;

    assert!(run.is_succeeded());
    assert_eq!(run.report_for("b").unwrap().outcome, StageOutcome::Skipped);
    assert!(local.hosts_running("stage-b").is_empty());
}

#[tokio::test]
async fn test_unknown_skip_is_rejected() {
    let remote = Arc::new(ScriptedTransport::new());
    let local = Arc::new(ScriptedTransport::new());
    let sequencer =
        StageSequencer::new(context(2, 1, remote, local)).with_skip(vec!["nope".to_string()]);

    let result = sequencer.validate(&default_pipeline());
    assert!(matches!(result, Err(PipelineError::UnknownStage(id)) if id == "nope"));
}

#[tokio::test]
async fn test_form_cluster_with_failing_worker_aborts() {
    // N=4, M=2: node-0 がマネージャー、node-1..3 がワーカー
    let remote = Arc::new(
        ScriptedTransport::new()
            .reply_on("node-0", "swarm init", INIT_OUTPUT)
            .fail_on("node-3", "swarm join", 1, "rpc error: code = Unavailable"),
    );
    let local = Arc::new(ScriptedTransport::new());
    let sequencer = StageSequencer::new(context(4, 2, remote.clone(), local));

    let run = sequencer
        .run(vec![
            Stage::builtin("reset", StageAction::ResetCluster),
            Stage::builtin("form", StageAction::FormCluster),
            Stage::builtin("registry", StageAction::StartRegistry),
        ])
        .await;

    assert!(run.is_aborted());
    assert_eq!(run.failed_stage(), Some(1));
    assert!(run.report_for("registry").is_none());
    assert!(run.credential().is_none());

    let join = &run.failed_report().unwrap().reports[0];
    assert_eq!(join.results.len(), 3);
    assert!(!join.result_for("node-3").unwrap().success());
    assert!(join.result_for("node-1").unwrap().success());
    assert!(join.result_for("node-2").unwrap().success());
    // クライアントはクラスタ操作の対象外
    assert!(remote.commands_for("node-4").is_empty());
}

#[tokio::test]
async fn test_default_pipeline_end_to_end() {
    let remote = Arc::new(ScriptedTransport::new().reply_on("node-0", "swarm init", INIT_OUTPUT));
    let local = Arc::new(ScriptedTransport::new());

    let mut ctx = context(4, 2, remote.clone(), local.clone());
    ctx.publisher = Some(Arc::new(NoopPublisher));
    ctx.images = default_images();
    ctx.client_artifact = Some(default_client_artifact());

    let run = StageSequencer::new(ctx).run(default_pipeline()).await;

    assert!(run.is_succeeded(), "{:?}", run.failed_report());
    assert_eq!(run.reports().len(), run.stages().len());
    assert_eq!(run.credential().unwrap().manager, "10.10.1.1:2377");

    let images = run.report_for("images").unwrap();
    assert_eq!(images.reports[0].success_count(), 3);

    // sysdig は先頭クライアントのみ
    assert_eq!(remote.hosts_running("sysdig"), vec!["node-4"]);
    // レジストリはマネージャーのみ
    assert_eq!(remote.hosts_running("registry:2"), vec!["node-0"]);
    // ローカルステージはリモートに流れない
    assert!(remote.hosts_running("start.sh").is_empty());
    assert!(!local.hosts_running("start.sh dedicate").is_empty());
}

#[tokio::test]
async fn test_missing_publisher_fails_image_stage() {
    let remote = Arc::new(ScriptedTransport::new());
    let local = Arc::new(ScriptedTransport::new());
    let run = StageSequencer::new(context(2, 1, remote, local))
        .run(vec![Stage::builtin("images", StageAction::DistributeImages)])
        .await;

    assert!(run.is_aborted());
    match &run.failed_report().unwrap().outcome {
        StageOutcome::Failed { error } => assert!(error.contains("image publisher")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_policy_override_on_operations() {
    let remote = Arc::new(ScriptedTransport::new().fail("collectl", 100, "E: lock held"));
    let local = Arc::new(ScriptedTransport::new());
    let run = StageSequencer::new(context(2, 1, remote, local))
        .run(vec![
            Stage::run("collectl", Target::Cluster, ["apt-get install -y collectl"])
                .with_policy(FailurePolicy::BestEffort),
        ])
        .await;
    assert!(run.is_succeeded());
}

fn leave_count(transport: &ScriptedTransport, host: &str) -> usize {
    transport
        .commands_for(host)
        .iter()
        .filter(|c| c.contains("swarm leave"))
        .count()
}

#[tokio::test]
async fn test_skipped_reset_still_leaves_before_init() {
    let remote = Arc::new(ScriptedTransport::new().reply_on("node-0", "swarm init", INIT_OUTPUT));
    let local = Arc::new(ScriptedTransport::new());
    let sequencer = StageSequencer::new(context(3, 1, remote.clone(), local))
        .with_skip(vec!["reset".to_string()]);

    let run = sequencer
        .run(vec![
            Stage::builtin("reset", StageAction::ResetCluster),
            Stage::builtin("form", StageAction::FormCluster),
        ])
        .await;

    assert!(run.is_succeeded());
    assert_eq!(run.report_for("reset").unwrap().outcome, StageOutcome::Skipped);
    for host in ["node-0", "node-1", "node-2"] {
        assert_eq!(leave_count(&remote, host), 1, "{}", host);
    }

    // 離脱は init より前
    let manager = remote.commands_for("node-0");
    let leave = manager.iter().position(|c| c.contains("swarm leave")).unwrap();
    let init = manager.iter().position(|c| c.contains("swarm init")).unwrap();
    assert!(leave < init);
}

#[tokio::test]
async fn test_form_without_reset_stage_leaves_first() {
    let remote = Arc::new(ScriptedTransport::new().reply_on("node-0", "swarm init", INIT_OUTPUT));
    let local = Arc::new(ScriptedTransport::new());

    let run = StageSequencer::new(context(2, 1, remote.clone(), local))
        .run(vec![Stage::builtin("form", StageAction::FormCluster)])
        .await;

    assert!(run.is_succeeded());
    assert_eq!(leave_count(&remote, "node-0"), 1);
    assert_eq!(leave_count(&remote, "node-1"), 1);
}

#[tokio::test]
async fn test_declared_reset_is_not_repeated_by_form() {
    let remote = Arc::new(ScriptedTransport::new().reply_on("node-0", "swarm init", INIT_OUTPUT));
    let local = Arc::new(ScriptedTransport::new());

    let run = StageSequencer::new(context(2, 1, remote.clone(), local))
        .run(vec![
            Stage::builtin("reset", StageAction::ResetCluster),
            Stage::builtin("form", StageAction::FormCluster),
        ])
        .await;

    assert!(run.is_succeeded());
    assert_eq!(leave_count(&remote, "node-0"), 1);
    assert_eq!(leave_count(&remote, "node-1"), 1);
}
