//! クライアントアーカイブの直接配布

use crate::error::{ClusterError, Result};
use std::time::Duration;
use swarmflow_core::{ClientArtifact, FailurePolicy, GroupExecutionReport, NodeGroup, Operation};
use swarmflow_remote::{Transport, run_operations, shell_escape};

/// 配布で実行するオペレーション列
///
/// 転送 → 展開 → ホーム直下への移動 → ヘルパーのコンパイル。
pub fn client_operations(artifact: &ClientArtifact) -> Vec<Operation> {
    let remote = artifact.remote_path();
    let mut ops = vec![
        Operation::transfer(artifact.archive.clone(), remote.clone()),
        Operation::command(format!(
            "unzip -o -q {}",
            shell_escape(&remote.to_string_lossy())
        )),
    ];

    for entry in &artifact.moves {
        ops.push(Operation::command(format!(
            "rm -rf {entry} && mv {src} .",
            entry = shell_escape(entry),
            src = shell_escape(&format!("{}/{}", artifact.root, entry)),
        )));
    }

    if let Some(helper) = &artifact.helper {
        ops.push(Operation::command(format!(
            "gcc \"$HOME\"/{} -o \"$HOME\"/{}",
            shell_escape(&helper.source),
            shell_escape(&helper.output)
        )));
    }

    ops
}

/// クライアントグループ全体にアーカイブを配布する
pub async fn distribute_client_artifact(
    transport: &dyn Transport,
    clients: &NodeGroup,
    artifact: &ClientArtifact,
    timeout: Duration,
) -> Result<Vec<GroupExecutionReport>> {
    tracing::info!(
        group = %clients.name,
        hosts = clients.len(),
        "distributing {}",
        artifact.archive.display()
    );

    let ops = client_operations(artifact);
    let mut reports =
        run_operations(transport, clients, &ops, FailurePolicy::FailFast, timeout).await;

    if reports.last().is_some_and(GroupExecutionReport::is_fatal)
        && let Some(report) = reports.pop()
    {
        return Err(ClusterError::artifact(
            artifact.archive.display().to_string(),
            report,
        ));
    }
    Ok(reports)
}
