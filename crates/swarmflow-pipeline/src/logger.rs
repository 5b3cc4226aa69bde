//! パイプラインの進捗出力
//!
//! 各ステージの開始・完了・スキップ・失敗を時刻付きで表示し、
//! 最後に所要時間のサマリーを出す。

use crate::run::{PipelineRun, StageOutcome};
use chrono::Local;
use colored::Colorize;
use std::time::{Duration, Instant};
use swarmflow_core::{GroupExecutionReport, Stage};

/// パイプラインログ出力器
pub struct PipelineLogger {
    start_time: Instant,
}

impl PipelineLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    fn timestamp() -> String {
        Local::now().format("%H:%M:%S").to_string()
    }

    /// ステージ開始をログ出力
    pub fn start_stage(&self, index: usize, total: usize, stage: &Stage) {
        println!(
            "[{}] {} [{}/{}] {} {}",
            Self::timestamp().dimmed(),
            "▶".cyan(),
            index + 1,
            total,
            stage.name.bold(),
            format!("({}, {})", stage.target, stage.policy).dimmed()
        );
    }

    /// ステージ成功をログ出力
    pub fn stage_success(&self, stage: &Stage, duration: Duration) {
        println!(
            "[{}] {} {} 完了 ({})",
            Self::timestamp().dimmed(),
            "✓".green().bold(),
            stage.name,
            format_duration(duration).dimmed()
        );
    }

    /// ステージスキップをログ出力
    pub fn stage_skipped(&self, stage: &Stage, reason: &str) {
        println!(
            "[{}] {} {} ({})",
            Self::timestamp().dimmed(),
            "⏭".yellow(),
            stage.name,
            reason.dimmed()
        );
    }

    /// ステージ失敗をログ出力
    pub fn stage_failed(&self, stage: &Stage, error: &str) {
        println!(
            "[{}] {} {}: {}",
            Self::timestamp().dimmed(),
            "✗".red().bold(),
            stage.name,
            error.red()
        );
    }

    /// 失敗ホストの詳細
    pub fn log_report(&self, report: &GroupExecutionReport) {
        for result in report.failures() {
            let output = result.combined_output();
            let line = output.trim().lines().last().unwrap_or("");
            println!(
                "[{}]   → {} {} {}",
                Self::timestamp().dimmed(),
                result.host.id.yellow(),
                format!("exit {}", result.exit_status).red(),
                line.dimmed()
            );
        }
    }

    /// 詳細メッセージをログ出力
    pub fn log_detail(&self, message: &str) {
        println!("[{}]   → {}", Self::timestamp().dimmed(), message.cyan());
    }

    /// サマリーを出力
    pub fn print_summary(&self, run: &PipelineRun) {
        let total_duration = self.start_time.elapsed();

        let slowest_stage = run
            .reports()
            .iter()
            .filter(|r| r.outcome != StageOutcome::Skipped)
            .max_by_key(|r| r.duration);

        let skipped = run
            .reports()
            .iter()
            .filter(|r| r.outcome == StageOutcome::Skipped)
            .count();

        let tolerated: usize = run
            .reports()
            .iter()
            .filter(|r| !r.is_failed())
            .map(|r| r.tolerated_failures())
            .sum();

        println!();
        println!("{}", "═".repeat(44));
        println!("Pipeline Summary");
        println!("{}", "─".repeat(44));
        println!("Total time:    {}", format_duration(total_duration).green());
        println!(
            "Stages:        {}/{}",
            run.reports().len(),
            run.stages().len()
        );

        if let Some(stage) = slowest_stage {
            println!(
                "Slowest stage: {} ({})",
                stage.stage,
                format_duration(stage.duration)
            );
        }

        println!("Skipped:       {}", skipped);
        if tolerated > 0 {
            println!("Ignored:       {}", tolerated.to_string().yellow());
        }

        match run.failed_stage() {
            Some(index) => println!(
                "Failed:        {} {}",
                format!("[{}]", index + 1).red().bold(),
                run.stages()[index].name.red().bold()
            ),
            None => println!("Failed:        {}", "0".green()),
        }
        println!("{}", "═".repeat(44));
    }
}

impl Default for PipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Duration を読みやすい形式にフォーマット
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let minutes = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", minutes, secs)
    } else if total_secs >= 1 {
        format!("{}.{}s", total_secs, millis / 100)
    } else {
        format!("{}ms", millis)
    }
}
