//! イメージのビルドとプッシュをまとめた公開処理

use crate::builder::ImageBuilder;
use crate::context::ContextBuilder;
use crate::error::Result;
use crate::pusher::ImagePusher;
use async_trait::async_trait;
use bollard::Docker;
use std::path::PathBuf;
use std::sync::Arc;
use swarmflow_core::{CommandResult, Host, ImageSpec};
use swarmflow_remote::{Transport, shell_escape};

/// イメージを reference のタグでビルドし、レジストリへプッシュする
#[async_trait]
pub trait ImagePublisher: Send + Sync {
    fn name(&self) -> &'static str;

    /// 成功時の stdout は reference
    async fn publish(&self, image: &ImageSpec, reference: &str) -> Result<CommandResult>;
}

/// Docker API (bollard) で公開
pub struct DockerImagePublisher {
    builder: ImageBuilder,
    pusher: ImagePusher,
    base_dir: PathBuf,
}

impl DockerImagePublisher {
    pub fn new(docker: Docker, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            builder: ImageBuilder::new(docker.clone()),
            pusher: ImagePusher::new(docker),
            base_dir: base_dir.into(),
        }
    }

    /// ローカルの Docker デーモンに接続
    pub fn connect(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self::new(docker, base_dir))
    }
}

#[async_trait]
impl ImagePublisher for DockerImagePublisher {
    fn name(&self) -> &'static str {
        "docker-api"
    }

    async fn publish(&self, image: &ImageSpec, reference: &str) -> Result<CommandResult> {
        let context = ContextBuilder::for_image(&self.base_dir, image)?;
        self.builder.build_image(context, reference).await?;
        self.pusher.push(reference).await?;
        Ok(CommandResult::new(Host::local(), 0, reference, ""))
    }
}

/// docker CLI をトランスポート経由で実行して公開
pub struct ShellImagePublisher {
    transport: Arc<dyn Transport>,
    host: Host,
}

impl ShellImagePublisher {
    pub fn new(transport: Arc<dyn Transport>, host: Host) -> Self {
        Self { transport, host }
    }

    /// ビルドとプッシュのコマンド
    pub fn command(image: &ImageSpec, reference: &str) -> String {
        let mut build = format!("sudo docker build -t {}", shell_escape(reference));
        if let Some(dockerfile) = &image.dockerfile {
            build.push_str(&format!(" -f {}", shell_escape(&dockerfile.to_string_lossy())));
        }
        format!(
            "cd {} && {} . && sudo docker push {}",
            shell_escape(&image.context.to_string_lossy()),
            build,
            shell_escape(reference)
        )
    }
}

#[async_trait]
impl ImagePublisher for ShellImagePublisher {
    fn name(&self) -> &'static str {
        "docker-cli"
    }

    async fn publish(&self, image: &ImageSpec, reference: &str) -> Result<CommandResult> {
        let command = Self::command(image, reference);
        let mut result = self.transport.exec(&self.host, &command).await?;
        if result.success() {
            result.stdout = reference.to_string();
        }
        Ok(result)
    }
}
