use super::*;
use crate::model::{FailurePolicy, Operation, StageAction, Target};
use std::path::PathBuf;

#[test]
fn test_parse_cluster() {
    let kdl = r#"
cluster {
    size 4
    clients 2
    manager "10.10.1.1"
    user "ubuntu"
    identity "/home/ubuntu/.ssh/id_rsa"
    timeout 120
    init-attempts 3
}
"#;

    let config = parse_swarm(kdl).unwrap();
    assert_eq!(config.cluster.size, Some(4));
    assert_eq!(config.cluster.clients, Some(2));
    assert_eq!(config.cluster.manager.as_deref(), Some("10.10.1.1"));
    assert_eq!(config.cluster.user.as_deref(), Some("ubuntu"));
    assert_eq!(
        config.cluster.identity,
        Some(PathBuf::from("/home/ubuntu/.ssh/id_rsa"))
    );
    assert_eq!(config.cluster.timeout_secs, 120);
    assert_eq!(config.cluster.init_attempts, 3);
    // 未指定のプレフィックスは既定値
    assert_eq!(config.cluster.prefix, "node-");
    assert!(config.stages.is_empty());
}

#[test]
fn test_parse_cluster_negative_size() {
    let kdl = r#"
cluster {
    size -1
}
"#;
    assert!(matches!(parse_swarm(kdl), Err(CoreError::InvalidConfig(_))));
}

#[test]
fn test_parse_cluster_zero_init_attempts() {
    let kdl = r#"
cluster {
    init-attempts 0
}
"#;
    assert!(parse_swarm(kdl).is_err());
}

#[test]
fn test_parse_cluster_out_of_range_values() {
    for kdl in [
        "cluster {\n    init-attempts 4294967296\n}\n",
        "cluster {\n    timeout 18446744073709551616\n}\n",
    ] {
        assert!(
            matches!(parse_swarm(kdl), Err(CoreError::InvalidConfig(_))),
            "accepted: {}",
            kdl
        );
    }

    // 境界値はそのまま受け入れる
    let config = parse_swarm("cluster {\n    init-attempts 4294967295\n}\n").unwrap();
    assert_eq!(config.cluster.init_attempts, u32::MAX);
}

#[test]
fn test_parse_images() {
    let kdl = r#"
image "social-network-microservices" {
    context "DeathStarBench/socialNetwork"
    variant "withLog_01"
}

image "cpu_intensive" {
    context "internal_triggers/cpu"
}
"#;

    let config = parse_swarm(kdl).unwrap();
    assert_eq!(config.images.len(), 2);
    assert_eq!(config.images[0].name, "social-network-microservices");
    assert_eq!(config.images[0].variant(), "withLog_01");
    assert_eq!(config.images[1].variant(), "latest");
    assert_eq!(
        config.images[1].context,
        PathBuf::from("internal_triggers/cpu")
    );
}

#[test]
fn test_parse_image_without_context() {
    let kdl = r#"image "orphan""#;
    assert!(matches!(parse_swarm(kdl), Err(CoreError::InvalidConfig(_))));
}

#[test]
fn test_parse_client_artifact() {
    let kdl = r#"
client-artifact "RubbosClient.zip" {
    move "elba" "rubbos"
    helper source="elba/rubbos/RUBBoS/bench/flush_cache.c" output="elba/rubbos/RUBBoS/bench/flush_cache"
}
"#;

    let config = parse_swarm(kdl).unwrap();
    let artifact = config.client_artifact.unwrap();
    assert_eq!(artifact.archive, PathBuf::from("RubbosClient.zip"));
    assert_eq!(artifact.root, "RubbosClient");
    assert_eq!(artifact.moves, vec!["elba", "rubbos"]);
    let helper = artifact.helper.unwrap();
    assert!(helper.source.ends_with("flush_cache.c"));
    assert!(helper.output.ends_with("flush_cache"));
}

#[test]
fn test_parse_client_artifact_incomplete_helper() {
    let kdl = r#"
client-artifact "client.zip" {
    helper source="main.c"
}
"#;
    assert!(parse_swarm(kdl).is_err());
}

#[test]
fn test_parse_stages_in_order() {
    let kdl = r#"
stage "cleanup" policy="best-effort" {
    run "rm -rf DeathStarBench"
}

stage "reset" kind="reset-cluster"

stage "form" kind="form-cluster"

stage "worker-keys" target="workers" {
    run "mkdir -p .ssh"
    put local="/root/.ssh/id_rsa" remote=".ssh/id_rsa"
}
"#;

    let config = parse_swarm(kdl).unwrap();
    let names: Vec<_> = config.stages.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["cleanup", "reset", "form", "worker-keys"]);

    let cleanup = &config.stages[0];
    assert_eq!(cleanup.policy, FailurePolicy::BestEffort);
    assert_eq!(cleanup.target, Target::Cluster);

    assert_eq!(config.stages[1].action, StageAction::ResetCluster);
    assert_eq!(config.stages[1].policy, FailurePolicy::BestEffort);
    assert_eq!(config.stages[2].action, StageAction::FormCluster);

    let keys = &config.stages[3];
    assert_eq!(keys.target, Target::Workers);
    match &keys.action {
        StageAction::Operations(ops) => {
            assert_eq!(ops.len(), 2);
            assert_eq!(ops[0], Operation::command("mkdir -p .ssh"));
            assert_eq!(
                ops[1],
                Operation::transfer("/root/.ssh/id_rsa", ".ssh/id_rsa")
            );
        }
        other => panic!("unexpected action: {:?}", other),
    }
}

#[test]
fn test_parse_stage_unknown_target() {
    let kdl = r#"
stage "x" target="everywhere" {
    run "true"
}
"#;
    assert!(matches!(parse_swarm(kdl), Err(CoreError::UnknownTarget(_))));
}

#[test]
fn test_parse_stage_without_operations() {
    let kdl = r#"stage "empty""#;
    assert!(matches!(parse_swarm(kdl), Err(CoreError::InvalidConfig(_))));
}

#[test]
fn test_parse_duplicate_stage() {
    let kdl = r#"
stage "reset" kind="reset-cluster"
stage "reset" kind="reset-cluster"
"#;
    assert!(matches!(parse_swarm(kdl), Err(CoreError::DuplicateStage(_))));
}

#[test]
fn test_parse_unknown_nodes_are_ignored() {
    let kdl = r#"
plot "latency" {
    csv "detailRT.csv"
}
"#;
    let config = parse_swarm(kdl).unwrap();
    assert!(config.images.is_empty());
}

#[test]
fn test_parse_swarm_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swarm.kdl");
    std::fs::write(&path, "cluster {\n    size 2\n}\n").unwrap();

    let config = parse_swarm_file(&path).unwrap();
    assert_eq!(config.cluster.size, Some(2));
}
