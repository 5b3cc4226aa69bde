//! グループへのファンアウト実行
//!
//! グループ内の全ホストを同時に実行し、全ホストの完了を待ってから
//! レポートを返す。fail-fast でも実行中のホストは取り消さない。

use crate::error::RemoteError;
use crate::transport::Transport;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;
use swarmflow_core::{CommandResult, FailurePolicy, GroupExecutionReport, NodeGroup, Operation};

/// 1つのオペレーションをグループ全体で実行
///
/// 結果はグループのホスト順に並ぶ。`first_failure` は完了順で
/// 最初に失敗したホスト。トランスポート失敗とタイムアウトは
/// `CommandResult::transport_failure` として記録される。
pub async fn run_on_group(
    transport: &dyn Transport,
    group: &NodeGroup,
    operation: &Operation,
    policy: FailurePolicy,
    timeout: Duration,
) -> GroupExecutionReport {
    tracing::debug!(
        group = %group.name,
        hosts = group.len(),
        transport = transport.name(),
        "{}",
        operation
    );

    let mut pending: FuturesUnordered<_> = group
        .hosts()
        .iter()
        .enumerate()
        .map(|(idx, host)| async move {
            let result = match tokio::time::timeout(timeout, transport.run(host, operation)).await
            {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => CommandResult::transport_failure(host.clone(), e.to_string()),
                Err(_) => CommandResult::transport_failure(
                    host.clone(),
                    RemoteError::Timeout {
                        secs: timeout.as_secs(),
                    }
                    .to_string(),
                ),
            };
            (idx, result)
        })
        .collect();

    let mut report = GroupExecutionReport::new(group.name.clone(), policy);
    let mut slots: Vec<Option<CommandResult>> = vec![None; group.len()];

    while let Some((idx, result)) = pending.next().await {
        if !result.success() {
            match policy {
                FailurePolicy::FailFast => tracing::error!(
                    host = %result.host,
                    status = result.exit_status,
                    "{}",
                    result.stderr.trim()
                ),
                FailurePolicy::BestEffort => tracing::warn!(
                    host = %result.host,
                    status = result.exit_status,
                    "失敗を無視します: {}",
                    result.stderr.trim()
                ),
            }
            if report.first_failure.is_none() {
                report.first_failure = Some(result.host.id.clone());
            }
        }
        slots[idx] = Some(result);
    }

    report.results = slots.into_iter().flatten().collect();
    report
}

/// オペレーション列を順に実行
///
/// fail-fast のオペレーションが失敗した時点で後続は実行しない。
pub async fn run_operations(
    transport: &dyn Transport,
    group: &NodeGroup,
    operations: &[Operation],
    policy: FailurePolicy,
    timeout: Duration,
) -> Vec<GroupExecutionReport> {
    let mut reports = Vec::with_capacity(operations.len());
    for operation in operations {
        let report = run_on_group(transport, group, operation, policy, timeout).await;
        let fatal = report.is_fatal();
        reports.push(report);
        if fatal {
            break;
        }
    }
    reports
}
