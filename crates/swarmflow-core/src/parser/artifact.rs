//! image / client-artifact ノードのパース

use super::{first_string, prop_string, string_args};
use crate::error::{CoreError, Result};
use crate::model::{ClientArtifact, HelperProgram, ImageSpec};
use kdl::KdlNode;
use std::path::PathBuf;

/// image ノードをパース
pub fn parse_image(node: &KdlNode) -> Result<ImageSpec> {
    let name = first_string(node)
        .ok_or_else(|| CoreError::InvalidConfig("image には名前が必要です".to_string()))?
        .to_string();

    let mut context = None;
    let mut variant = None;
    let mut dockerfile = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "context" => context = first_string(child).map(PathBuf::from),
                "variant" => variant = first_string(child).map(|s| s.to_string()),
                "dockerfile" => dockerfile = first_string(child).map(PathBuf::from),
                _ => {}
            }
        }
    }

    let context = context.ok_or_else(|| {
        CoreError::InvalidConfig(format!("image '{}' に context が必要です", name))
    })?;

    Ok(ImageSpec {
        name,
        context,
        variant,
        dockerfile,
    })
}

/// client-artifact ノードをパース
pub fn parse_client_artifact(node: &KdlNode) -> Result<ClientArtifact> {
    let archive = first_string(node)
        .map(PathBuf::from)
        .ok_or_else(|| {
            CoreError::InvalidConfig("client-artifact にはアーカイブパスが必要です".to_string())
        })?;

    // 省略時はアーカイブ名から拡張子を除いたもの
    let default_root = archive
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("client")
        .to_string();
    let mut artifact = ClientArtifact::new(archive, default_root);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "remote" => artifact.remote = first_string(child).map(PathBuf::from),
                "root" => {
                    if let Some(root) = first_string(child) {
                        artifact.root = root.to_string();
                    }
                }
                "move" => {
                    artifact
                        .moves
                        .extend(string_args(child).into_iter().map(|s| s.to_string()));
                }
                "helper" => {
                    let source = prop_string(child, "source");
                    let output = prop_string(child, "output");
                    match (source, output) {
                        (Some(source), Some(output)) => {
                            artifact.helper = Some(HelperProgram {
                                source: source.to_string(),
                                output: output.to_string(),
                            });
                        }
                        _ => {
                            return Err(CoreError::InvalidConfig(
                                "helper には source と output が必要です".to_string(),
                            ));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Ok(artifact)
}
