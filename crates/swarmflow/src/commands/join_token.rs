use crate::ClusterArgs;
use crate::settings::Settings;
use colored::Colorize;
use swarmflow_cluster::ClusterFormation;
use swarmflow_remote::SshTransport;

/// マネージャーを初期化し直して参加コマンドだけを標準出力に出す
pub async fn handle(args: &ClusterArgs) -> anyhow::Result<()> {
    let settings = Settings::resolve(args)?;
    let cluster = settings.cluster_group(args)?;
    let addr = settings.require_addr()?;
    let transport = SshTransport::default();

    let mut formation = ClusterFormation::new(&transport, &cluster, addr, settings.timeout)
        .with_init_attempts(settings.init_attempts);
    formation.reset().await;

    match formation.init_manager().await {
        Ok(credential) => {
            println!("{}", credential.command);
            Ok(())
        }
        Err(e) => {
            if let Some(report) = e.report() {
                for result in report.failures() {
                    eprintln!(
                        "{} {}: {}",
                        "✗".red(),
                        result.host.id,
                        result.combined_output().trim()
                    );
                }
            }
            Err(e.into())
        }
    }
}
