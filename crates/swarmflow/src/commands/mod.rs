pub mod join_token;
pub mod plan;
pub mod reset;
pub mod up;

use crate::ImageBackend;
use crate::settings::Settings;
use std::sync::Arc;
use swarmflow_build::{DockerImagePublisher, ImagePublisher, ShellImagePublisher};
use swarmflow_core::{Host, Inventory};
use swarmflow_pipeline::{SequencerContext, StageSequencer};
use swarmflow_remote::{LocalTransport, SshTransport, Transport};

/// オーケストレータのホームを作業ディレクトリにしたローカルトランスポート
pub(crate) fn local_transport() -> LocalTransport {
    match dirs::home_dir() {
        Some(home) => LocalTransport::new().with_workdir(home),
        None => LocalTransport::new(),
    }
}

fn image_publisher(
    backend: ImageBackend,
    local: Arc<dyn Transport>,
) -> anyhow::Result<Arc<dyn ImagePublisher>> {
    let publisher: Arc<dyn ImagePublisher> = match backend {
        ImageBackend::Cli => Arc::new(ShellImagePublisher::new(local, Host::local())),
        ImageBackend::Api => {
            let base_dir = dirs::home_dir().unwrap_or_default();
            let publisher = DockerImagePublisher::connect(base_dir)
                .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;
            Arc::new(publisher)
        }
    };
    Ok(publisher)
}

/// 設定からシーケンサーを組み立てる
pub(crate) fn build_sequencer(
    settings: &Settings,
    inventory: Inventory,
    advertise_addr: &str,
    backend: Option<ImageBackend>,
    skip: Vec<String>,
) -> anyhow::Result<StageSequencer> {
    let local: Arc<dyn Transport> = Arc::new(local_transport());
    let remote: Arc<dyn Transport> = Arc::new(SshTransport::default());
    let publisher = backend
        .map(|backend| image_publisher(backend, local.clone()))
        .transpose()?;

    let mut ctx = SequencerContext::new(inventory, remote, local, advertise_addr);
    ctx.publisher = publisher;
    ctx.images = settings.images.clone();
    ctx.client_artifact = Some(settings.client_artifact.clone());
    ctx.timeout = settings.timeout;
    ctx.init_attempts = settings.init_attempts;

    Ok(StageSequencer::new(ctx).with_skip(skip))
}
