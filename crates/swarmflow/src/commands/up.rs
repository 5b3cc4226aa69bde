use crate::settings::Settings;
use crate::{ClusterArgs, ImageBackend};
use colored::Colorize;
use swarmflow_pipeline::PipelineLogger;

pub async fn handle(
    args: &ClusterArgs,
    skip: Vec<String>,
    backend: ImageBackend,
) -> anyhow::Result<()> {
    let settings = Settings::resolve(args)?;
    let inventory = settings.inventory(args)?;
    let addr = settings.require_addr()?;

    settings.print_source();
    println!(
        "{} クラスタ {} 台 / クライアント {} 台 (manager: {})",
        "▶".cyan(),
        inventory.cluster().len(),
        inventory.clients().len(),
        addr.cyan()
    );
    println!();

    let sequencer = super::build_sequencer(&settings, inventory, addr, Some(backend), skip)?
        .with_logger(PipelineLogger::new());
    sequencer.validate(&settings.stages)?;

    let run = sequencer.run(settings.stages.clone()).await;

    if let Some(report) = run.failed_report() {
        anyhow::bail!("ステージ '{}' で中断しました", report.stage);
    }

    if let Some(credential) = run.credential() {
        println!();
        println!("{} {}", "参加コマンド:".bold(), credential.worker_command().dimmed());
    }
    println!("{}", "✓ パイプラインが完了しました".green().bold());
    Ok(())
}
