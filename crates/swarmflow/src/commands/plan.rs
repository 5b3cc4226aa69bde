use crate::ClusterArgs;
use crate::settings::Settings;
use colored::Colorize;
use swarmflow_core::StageAction;
use swarmflow_pipeline::resolve_target;

/// ステージ・対象ホスト・オペレーションを実行順に表示
pub fn handle(args: &ClusterArgs, skip: &[String]) -> anyhow::Result<()> {
    let settings = Settings::resolve(args)?;
    let inventory = settings.inventory(args)?;

    let sequencer = super::build_sequencer(
        &settings,
        inventory.clone(),
        settings.advertise_addr.as_deref().unwrap_or_default(),
        None,
        skip.to_vec(),
    )?;
    sequencer.validate(&settings.stages)?;

    settings.print_source();
    println!(
        "{} {}",
        "manager:".dimmed(),
        settings.advertise_addr.as_deref().unwrap_or("(未指定)")
    );
    println!();

    let total = settings.stages.len();
    for (index, stage) in settings.stages.iter().enumerate() {
        let skipped = skip.contains(&stage.name);
        let header = format!(
            "[{}/{}] {} ({}, {})",
            index + 1,
            total,
            stage.name,
            stage.target,
            stage.policy
        );
        if skipped {
            println!("{} {}", header.dimmed(), "skip".yellow());
        } else {
            println!("{}", header.bold());
        }

        let group = resolve_target(stage.target, &inventory);
        let hosts: Vec<_> = group.hosts().iter().map(|h| h.id.as_str()).collect();
        println!("    hosts: {}", hosts.join(", ").cyan());

        match &stage.action {
            StageAction::Operations(ops) => {
                for op in ops {
                    println!("    {}", op.to_string().dimmed());
                }
            }
            action => println!("    {}", format!("<{}>", action.kind()).dimmed()),
        }
    }

    Ok(())
}
