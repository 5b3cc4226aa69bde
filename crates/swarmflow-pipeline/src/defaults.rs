//! 既定のブートストラップパイプライン
//!
//! swarm.kdl に stage ノードがない場合に使われる。
//! ベンチマーク環境（socialNetwork + RUBBoS クライアント）の構築手順。

use swarmflow_cluster::scripts::{
    DISABLE_HOST_KEY_CHECKING, INSTALL_DOCKER, apt_install, clone_at_commit,
};
use swarmflow_core::{
    ClientArtifact, HelperProgram, ImageSpec, Operation, Stage, StageAction, Target,
};

pub const BENCHMARK_REPO: &str = "https://github.com/delimitrou/DeathStarBench.git";
pub const BENCHMARK_DIR: &str = "DeathStarBench";
pub const BENCHMARK_COMMIT: &str = "b2b7af9";

/// オーケストレータのホームで展開するソースアーカイブ
pub const LOCAL_SOURCE_ARCHIVES: [&str; 5] = [
    "src",
    "RubbosClient_src",
    "socialNetwork",
    "scripts_limit",
    "internal_triggers",
];

const SOCIAL_NETWORK: &str = "$HOME/DeathStarBench/socialNetwork";

/// 既定のイメージ
pub fn default_images() -> Vec<ImageSpec> {
    vec![
        ImageSpec::new("social-network-microservices", "DeathStarBench/socialNetwork")
            .with_variant("withLog_01"),
        ImageSpec::new("cpu_intensive", "internal_triggers/cpu"),
        ImageSpec::new("io_intensive", "internal_triggers/io"),
    ]
}

/// 既定のクライアントアーカイブ
pub fn default_client_artifact() -> ClientArtifact {
    let mut artifact = ClientArtifact::new("~/RubbosClient.zip", "RubbosClient");
    artifact.moves = vec!["elba".to_string(), "rubbos".to_string()];
    artifact.helper = Some(HelperProgram {
        source: "elba/rubbos/RUBBoS/bench/flush_cache.c".to_string(),
        output: "elba/rubbos/RUBBoS/bench/flush_cache".to_string(),
    });
    artifact
}

fn ssh_setup(name: &str, target: Target) -> Stage {
    Stage::operations(
        name,
        target,
        vec![
            Operation::command(DISABLE_HOST_KEY_CHECKING),
            Operation::transfer("~/.ssh/id_rsa", ".ssh/id_rsa"),
            Operation::command("chmod 600 .ssh/id_rsa"),
        ],
    )
}

/// 既定のパイプライン（宣言順に実行）
pub fn default_pipeline() -> Vec<Stage> {
    let unpack = LOCAL_SOURCE_ARCHIVES
        .iter()
        .map(|name| format!("unzip -o -q {}.zip", name))
        .collect::<Vec<_>>()
        .join(" && ");

    vec![
        Stage::run("cleanup", Target::Cluster, [format!("rm -rf {}", BENCHMARK_DIR)])
            .best_effort(),
        Stage::run("collectl", Target::Cluster, [apt_install(&["collectl"])]),
        Stage::run(
            "clone",
            Target::Cluster,
            [clone_at_commit(BENCHMARK_REPO, BENCHMARK_DIR, BENCHMARK_COMMIT)],
        ),
        Stage::run("docker", Target::Cluster, [INSTALL_DOCKER]),
        Stage::builtin("reset", StageAction::ResetCluster),
        Stage::builtin("form", StageAction::FormCluster),
        ssh_setup("worker-ssh", Target::Workers),
        Stage::builtin("registry", StageAction::StartRegistry),
        Stage::run("sysdig", Target::FirstClient, [apt_install(&["sysdig"])]),
        ssh_setup("client-ssh", Target::Clients),
        Stage::builtin("client-artifact", StageAction::DistributeClientArtifact),
        Stage::run(
            "unpack-sources",
            Target::Local,
            [
                format!("cd \"$HOME\" && {}", unpack),
                format!(
                    "cd \"$HOME\" && rm -rf {dir}/socialNetwork/src.bk \
                     && mv {dir}/socialNetwork/src {dir}/socialNetwork/src.bk \
                     && mv src {dir}/socialNetwork/",
                    dir = BENCHMARK_DIR
                ),
            ],
        ),
        Stage::builtin("images", StageAction::DistributeImages),
        Stage::run(
            "deploy",
            Target::Local,
            [
                "cd \"$HOME\" && rsync -a --remove-source-files socialNetwork/ DeathStarBench/socialNetwork/ \
                 && rm -rf socialNetwork/scripts"
                    .to_string(),
                format!("cd {} && sudo chmod +x ./start.sh && sudo ./start.sh start", SOCIAL_NETWORK),
            ],
        ),
        Stage::run(
            "load-generator",
            Target::Local,
            [
                "chmod -R +x \"$HOME\"/DeathStarBench/".to_string(),
                "cd \"$HOME\"/RubbosClient_src && mvn clean && mvn package \
                 && chmod +x ./cpToCloud.sh && ./cpToCloud.sh"
                    .to_string(),
                "cd \"$HOME\"/DeathStarBench/wrk2 && make".to_string(),
                "sudo apt-get -y install libssl-dev libz-dev luarocks && sudo luarocks install luasocket"
                    .to_string(),
            ],
        ),
        Stage::run(
            "register",
            Target::Local,
            [
                format!("cd {} && sudo ./start.sh register", SOCIAL_NETWORK),
                format!("cd {} && sudo ./start.sh compose", SOCIAL_NETWORK),
            ],
        ),
        Stage::run(
            "dedicate",
            Target::Local,
            [format!("cd {} && ./start.sh dedicate", SOCIAL_NETWORK)],
        ),
    ]
}
