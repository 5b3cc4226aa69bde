use crate::ClusterArgs;
use crate::settings::Settings;
use colored::Colorize;
use swarmflow_cluster::ClusterFormation;
use swarmflow_remote::SshTransport;

/// クラスタ全体で swarm から強制離脱（失敗は無視）
pub async fn handle(args: &ClusterArgs) -> anyhow::Result<()> {
    let settings = Settings::resolve(args)?;
    let cluster = settings.cluster_group(args)?;
    let transport = SshTransport::default();

    println!("{} {} 台を swarm から離脱させます", "▶".cyan(), cluster.len());

    let addr = settings.advertise_addr.clone().unwrap_or_default();
    let mut formation = ClusterFormation::new(&transport, &cluster, &addr, settings.timeout);
    let report = formation.reset().await;

    for result in &report.results {
        if result.success() {
            println!("  {} {}", "✓".green(), result.host.id);
        } else {
            let output = result.combined_output();
            println!(
                "  {} {} {}",
                "-".yellow(),
                result.host.id,
                output.trim().lines().last().unwrap_or("").dimmed()
            );
        }
    }
    println!(
        "{} {}/{} 台が離脱しました",
        "✓".green().bold(),
        report.success_count(),
        report.results.len()
    );
    Ok(())
}
