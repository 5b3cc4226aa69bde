//! クラスタ内レジストリとイメージ配布

use crate::error::{ClusterError, Result};
use crate::scripts;
use std::time::Duration;
use swarmflow_build::ImagePublisher;
use swarmflow_core::{
    CommandResult, FailurePolicy, GroupExecutionReport, Host, ImageSpec, NodeGroup, Operation,
    RegistryAddress,
};
use swarmflow_remote::{Transport, run_on_group};

/// マネージャー上でレジストリサービスを起動（既にあれば何もしない）
pub async fn start_registry(
    transport: &dyn Transport,
    manager: &NodeGroup,
    registry: &RegistryAddress,
    timeout: Duration,
) -> Result<GroupExecutionReport> {
    tracing::info!(group = %manager.name, registry = %registry, "starting registry service");

    let report = run_on_group(
        transport,
        manager,
        &Operation::Command(scripts::registry_service(registry.port)),
        FailurePolicy::FailFast,
        timeout,
    )
    .await;

    if report.is_fatal() {
        return Err(ClusterError::artifact("registry service", report));
    }
    Ok(report)
}

/// 各イメージをレジストリのタグでビルドしてプッシュ
///
/// イメージは宣言順に1つずつ処理し、失敗した時点で中断する。
pub async fn distribute_images(
    publisher: &dyn ImagePublisher,
    registry: &RegistryAddress,
    images: &[ImageSpec],
) -> Result<GroupExecutionReport> {
    let mut report = GroupExecutionReport::new("images", FailurePolicy::FailFast);

    for image in images {
        let reference = registry.image_reference(image);
        tracing::info!(publisher = publisher.name(), "publishing {}", reference);

        let result = match publisher.publish(image, &reference).await {
            Ok(result) => result,
            Err(e) => CommandResult::new(Host::local(), 1, "", e.user_message()),
        };

        let failed = !result.success();
        report.results.push(result);
        if failed {
            report.first_failure = Some(Host::local().id);
            return Err(ClusterError::artifact(reference, report));
        }
    }

    Ok(report)
}
