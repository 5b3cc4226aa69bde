//! KDLパーサー
//!
//! swarm.kdl をパースします。
//! 各ノードタイプのパース処理はモジュールに分離されています。

mod artifact;
mod cluster;
mod stage;

use artifact::{parse_client_artifact, parse_image};
use cluster::parse_cluster;
use stage::parse_stage;

use crate::error::{CoreError, Result};
use crate::model::SwarmConfig;
use kdl::{KdlDocument, KdlNode};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// KDLファイルをパースしてSwarmConfigを生成
pub fn parse_swarm_file<P: AsRef<Path>>(path: P) -> Result<SwarmConfig> {
    let content = fs::read_to_string(path.as_ref())?;
    tracing::debug!(path = %path.as_ref().display(), "Parsing swarm file");
    parse_swarm(&content)
}

/// KDL文字列をパース
pub fn parse_swarm(content: &str) -> Result<SwarmConfig> {
    let doc: KdlDocument = content.parse()?;

    let mut config = SwarmConfig::default();
    let mut stage_names = HashSet::new();

    for node in doc.nodes() {
        match node.name().value() {
            "cluster" => {
                parse_cluster(node, &mut config.cluster)?;
            }
            "image" => {
                config.images.push(parse_image(node)?);
            }
            "client-artifact" => {
                config.client_artifact = Some(parse_client_artifact(node)?);
            }
            "stage" => {
                let stage = parse_stage(node)?;
                if !stage_names.insert(stage.name.clone()) {
                    return Err(CoreError::DuplicateStage(stage.name));
                }
                config.stages.push(stage);
            }
            _ => {
                // 不明なノードはスキップ
            }
        }
    }

    Ok(config)
}

/// 位置引数（名前なしエントリ）の文字列
fn string_args(node: &KdlNode) -> Vec<&str> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .collect()
}

/// 最初の位置引数の文字列
fn first_string(node: &KdlNode) -> Option<&str> {
    string_args(node).into_iter().next()
}

/// 名前付きプロパティの文字列
fn prop_string<'a>(node: &'a KdlNode, key: &str) -> Option<&'a str> {
    node.get(key).and_then(|v| v.as_string())
}

#[cfg(test)]
mod tests;
