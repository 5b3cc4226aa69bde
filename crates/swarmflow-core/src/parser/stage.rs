//! ステージノードのパース

use super::{first_string, prop_string};
use crate::error::{CoreError, Result};
use crate::model::{Operation, Stage, StageAction, Target};
use kdl::KdlNode;

/// stage ノードをパース
///
/// kind= が指定されていれば組み込みステージ、なければ run / put の列。
pub fn parse_stage(node: &KdlNode) -> Result<Stage> {
    let name = first_string(node)
        .ok_or_else(|| CoreError::InvalidConfig("stage には名前が必要です".to_string()))?
        .to_string();

    let mut stage = match prop_string(node, "kind") {
        Some(kind) => Stage::builtin(name, StageAction::from_kind(kind)?),
        None => {
            let ops = parse_operations(node, &name)?;
            Stage::operations(name, Target::Cluster, ops)
        }
    };

    if let Some(target) = prop_string(node, "target") {
        stage.target = target.parse()?;
    }
    if let Some(policy) = prop_string(node, "policy") {
        stage.policy = policy.parse()?;
    }

    Ok(stage)
}

fn parse_operations(node: &KdlNode, stage_name: &str) -> Result<Vec<Operation>> {
    let mut ops = Vec::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "run" => {
                    let cmd = first_string(child).ok_or_else(|| {
                        CoreError::InvalidConfig(format!(
                            "stage '{}': run にはコマンドが必要です",
                            stage_name
                        ))
                    })?;
                    ops.push(Operation::command(cmd));
                }
                "put" => {
                    let local = prop_string(child, "local");
                    let remote = prop_string(child, "remote");
                    match (local, remote) {
                        (Some(local), Some(remote)) => ops.push(Operation::transfer(local, remote)),
                        _ => {
                            return Err(CoreError::InvalidConfig(format!(
                                "stage '{}': put には local と remote が必要です",
                                stage_name
                            )));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    if ops.is_empty() {
        return Err(CoreError::InvalidConfig(format!(
            "stage '{}' に run / put または kind がありません",
            stage_name
        )));
    }

    Ok(ops)
}
