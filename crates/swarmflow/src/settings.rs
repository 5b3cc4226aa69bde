//! CLI オプションと swarm.kdl の統合
//!
//! CLI（環境変数を含む）の値が swarm.kdl より優先される。

use crate::ClusterArgs;
use anyhow::{Context, bail};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use swarmflow_config::locate_swarm_file;
use swarmflow_core::{
    ClientArtifact, ImageSpec, Inventory, NodeGroup, Stage, SwarmConfig, parse_swarm_file,
};
use swarmflow_pipeline::{default_client_artifact, default_images, default_pipeline};

/// 1回の起動で使う解決済みの設定
#[derive(Debug)]
pub struct Settings {
    pub config_path: Option<PathBuf>,
    pub cluster_size: usize,
    pub client_size: Option<usize>,
    pub advertise_addr: Option<String>,
    pub timeout: Duration,
    pub init_attempts: u32,
    pub images: Vec<ImageSpec>,
    pub client_artifact: ClientArtifact,
    pub stages: Vec<Stage>,
    config: SwarmConfig,
}

impl Settings {
    pub fn resolve(args: &ClusterArgs) -> anyhow::Result<Self> {
        let (config, config_path) = load_config(args)?;
        let cluster = &config.cluster;

        let cluster_size = args.number.or(cluster.size).context(
            "クラスタのホスト数が指定されていません (-n/--number, SWARM_SIZE, または swarm.kdl の cluster.size)",
        )?;
        let client_size = args.clients.or(cluster.clients);
        let advertise_addr = args.ip.clone().or_else(|| cluster.manager.clone());
        let timeout = args
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| cluster.timeout());

        let images = if config.images.is_empty() {
            default_images()
        } else {
            config.images.clone()
        };
        let client_artifact = config
            .client_artifact
            .clone()
            .unwrap_or_else(default_client_artifact);
        let stages = if config.stages.is_empty() {
            default_pipeline()
        } else {
            config.stages.clone()
        };

        Ok(Self {
            config_path,
            cluster_size,
            client_size,
            advertise_addr,
            timeout,
            init_attempts: cluster.init_attempts,
            images,
            client_artifact,
            stages,
            config,
        })
    }

    /// クラスタとクライアントの両方からなるインベントリ
    pub fn inventory(&self, args: &ClusterArgs) -> anyhow::Result<Inventory> {
        let client_size = self.client_size.context(
            "クライアントのホスト数が指定されていません (-c/--client-number, SWARM_CLIENTS, または swarm.kdl の cluster.clients)",
        )?;
        Ok(self.build_inventory(args, client_size)?)
    }

    /// クラスタグループだけを使うコマンド向け
    pub fn cluster_group(&self, args: &ClusterArgs) -> anyhow::Result<NodeGroup> {
        let inventory = self.build_inventory(args, self.client_size.unwrap_or(1))?;
        let (cluster, _) = inventory.into_groups();
        Ok(cluster)
    }

    pub fn require_addr(&self) -> anyhow::Result<&str> {
        match self.advertise_addr.as_deref() {
            Some(addr) if !addr.trim().is_empty() => Ok(addr),
            _ => bail!(
                "マネージャーのアドレスが指定されていません (-a/--ip, SWARM_MANAGER_IP, または swarm.kdl の cluster.manager)"
            ),
        }
    }

    /// 読み込んだ設定ファイルを表示
    pub fn print_source(&self) {
        match &self.config_path {
            Some(path) => println!("{} {}", "設定ファイル:".dimmed(), path.display()),
            None => println!("{}", "設定ファイル: なし（組み込みのパイプライン）".dimmed()),
        }
    }

    fn build_inventory(
        &self,
        args: &ClusterArgs,
        client_size: usize,
    ) -> swarmflow_core::Result<Inventory> {
        let cluster = &self.config.cluster;
        Inventory::builder()
            .prefix(args.prefix.clone().unwrap_or_else(|| cluster.prefix.clone()))
            .user(args.user.clone().or_else(|| cluster.user.clone()))
            .identity(args.identity.clone().or_else(|| cluster.identity.clone()))
            .build(self.cluster_size, client_size)
    }
}

fn load_config(args: &ClusterArgs) -> anyhow::Result<(SwarmConfig, Option<PathBuf>)> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => locate_swarm_file()?,
    };

    match path {
        Some(path) => {
            let config = parse_swarm_file(&path)
                .with_context(|| format!("設定ファイルの読み込みに失敗しました: {}", path.display()))?;
            tracing::info!(path = %path.display(), stages = config.stages.len(), "Loaded swarm file");
            Ok((config, Some(path)))
        }
        None => Ok((SwarmConfig::default(), None)),
    }
}
