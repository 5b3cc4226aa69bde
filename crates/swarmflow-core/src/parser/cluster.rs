//! cluster ノードのパース

use super::first_string;
use crate::error::{CoreError, Result};
use crate::model::ClusterSettings;
use kdl::KdlNode;
use std::path::PathBuf;

/// cluster ノードをパース
///
/// ```kdl
/// cluster {
///     size 4
///     clients 2
///     manager "10.10.1.1"
/// }
/// ```
pub fn parse_cluster(node: &KdlNode, settings: &mut ClusterSettings) -> Result<()> {
    let Some(children) = node.children() else {
        return Ok(());
    };

    for child in children.nodes() {
        let key = child.name().value();
        match key {
            "size" => settings.size = Some(non_negative(child, key)?),
            "clients" => settings.clients = Some(non_negative(child, key)?),
            "manager" => settings.manager = first_string(child).map(|s| s.to_string()),
            "prefix" => {
                if let Some(prefix) = first_string(child) {
                    settings.prefix = prefix.to_string();
                }
            }
            "user" => settings.user = first_string(child).map(|s| s.to_string()),
            "identity" => settings.identity = first_string(child).map(PathBuf::from),
            "timeout" => settings.timeout_secs = non_negative(child, key)?,
            "init-attempts" => {
                let attempts: u32 = non_negative(child, key)?;
                if attempts == 0 {
                    return Err(CoreError::InvalidConfig(
                        "init-attempts は1以上である必要があります".to_string(),
                    ));
                }
                settings.init_attempts = attempts;
            }
            _ => {}
        }
    }

    Ok(())
}

/// 0以上の整数値を取得（型に収まらない値はエラー）
fn non_negative<T: TryFrom<i128>>(node: &KdlNode, key: &str) -> Result<T> {
    let value = node
        .entries()
        .first()
        .and_then(|e| e.value().as_integer())
        .ok_or_else(|| CoreError::InvalidConfig(format!("{} には整数が必要です", key)))?;

    if value < 0 {
        return Err(CoreError::InvalidConfig(format!(
            "{} は0以上である必要があります: {}",
            key, value
        )));
    }

    T::try_from(value).map_err(|_| {
        CoreError::InvalidConfig(format!("{} の値が大きすぎます: {}", key, value))
    })
}
