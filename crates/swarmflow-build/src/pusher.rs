//! イメージプッシュ処理
//!
//! ビルドしたイメージをクラスタ内レジストリにプッシュします。

use crate::error::{BuildError, Result};
use bollard::Docker;
use futures_util::StreamExt;

/// イメージプッシュを実行するハンドラ
pub struct ImagePusher {
    docker: Docker,
}

impl ImagePusher {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// イメージをレジストリにプッシュ
    ///
    /// reference はレジストリ込みの完全なイメージ名
    /// （例: `127.0.0.1:5000/cpu_intensive:latest`）。
    pub async fn push(&self, reference: &str) -> Result<()> {
        let (image, tag) = split_image_tag(reference);
        validate_tag(&tag)?;

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> { tag: tag.clone() };

        tracing::info!("Pushing image: {}", reference);

        // クラスタ内レジストリは認証なし
        #[allow(deprecated)]
        let mut stream = self.docker.push_image(&image, Some(options), None);

        while let Some(result) = stream.next().await {
            let info = result.map_err(|e| BuildError::PushFailed {
                message: e.to_string(),
            })?;
            if let Some(err) = info.error {
                return Err(BuildError::PushFailed { message: err });
            }
            if let Some(status) = info.status {
                tracing::debug!("{} {}", status, info.progress.as_deref().unwrap_or(""));
            }
        }

        Ok(())
    }
}

/// タグのバリデーション
///
/// 128文字以下、英数字・ピリオド・ハイフン・アンダースコアのみ、
/// 先頭はピリオドまたはハイフン以外。
fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(BuildError::InvalidTag {
            tag: "(empty)".to_string(),
        });
    }

    if tag.len() > 128 {
        return Err(BuildError::InvalidTag {
            tag: format!("Tag too long ({} characters, max 128)", tag.len()),
        });
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(BuildError::InvalidTag {
            tag: tag.to_string(),
        });
    }

    if let Some(c) = tag
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-' && *c != '_')
    {
        return Err(BuildError::InvalidTag {
            tag: format!("Invalid character '{}' in tag: {}", c, tag),
        });
    }

    Ok(())
}

/// イメージ名とタグを分離
///
/// # Examples
/// - `127.0.0.1:5000/app:v1` -> `("127.0.0.1:5000/app", "v1")`
/// - `127.0.0.1:5000/app` -> `("127.0.0.1:5000/app", "latest")`
pub fn split_image_tag(image: &str) -> (String, String) {
    if let Some(pos) = image.rfind(':') {
        let potential_tag = &image[pos + 1..];
        let potential_image = &image[..pos];

        // レジストリのポートの後ろには必ず / が続く
        if !potential_tag.contains('/') {
            return (potential_image.to_string(), potential_tag.to_string());
        }
    }

    (image.to_string(), "latest".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmflow_core::{ImageSpec, RegistryAddress};

    #[test]
    fn test_split_image_tag_with_port_and_tag() {
        let (image, tag) = split_image_tag("127.0.0.1:5000/social-network-microservices:withLog_01");
        assert_eq!(image, "127.0.0.1:5000/social-network-microservices");
        assert_eq!(tag, "withLog_01");
    }

    #[test]
    fn test_split_image_tag_numeric_variant() {
        let reference = RegistryAddress::loopback()
            .image_reference(&ImageSpec::new("app", "ctx").with_variant("2"));
        let (image, tag) = split_image_tag(&reference);
        assert_eq!(image, "127.0.0.1:5000/app");
        assert_eq!(tag, "2");
    }

    #[test]
    fn test_split_image_tag_with_port_only() {
        let (image, tag) = split_image_tag("127.0.0.1:5000/cpu_intensive");
        assert_eq!(image, "127.0.0.1:5000/cpu_intensive");
        assert_eq!(tag, "latest");
    }

    #[test]
    fn test_validate_tag() {
        assert!(validate_tag("withLog_01").is_ok());
        assert!(validate_tag("").is_err());
        assert!(validate_tag("-dev").is_err());
        assert!(validate_tag("v1/2").is_err());
        assert!(validate_tag(&"a".repeat(129)).is_err());
    }
}
