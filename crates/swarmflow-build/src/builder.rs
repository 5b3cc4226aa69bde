use crate::error::{BuildError, Result};
use bollard::Docker;
use bollard::image::BuildImageOptions;
use bytes::Bytes;
use futures_util::stream::StreamExt;
use http_body_util::{Either, Full};

/// Docker API 経由のイメージビルド
pub struct ImageBuilder {
    docker: Docker,
}

impl ImageBuilder {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// コンテキストからイメージをビルドしてタグを付ける
    pub async fn build_image(&self, context_data: Vec<u8>, tag: &str) -> Result<()> {
        tracing::info!("Building image: {}", tag);

        let options = BuildImageOptions {
            dockerfile: "Dockerfile",
            t: tag,
            rm: true,      // 中間コンテナを削除
            forcerm: true, // ビルド失敗時も中間コンテナを削除
            ..Default::default()
        };

        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        while let Some(msg) = stream.next().await {
            handle_build_output(msg?)?;
        }

        tracing::info!("Successfully built: {}", tag);
        Ok(())
    }
}

/// ビルド出力の処理
fn handle_build_output(output: bollard::models::BuildInfo) -> Result<()> {
    if let Some(stream) = output.stream {
        let line = stream.trim_end();
        if !line.is_empty() {
            tracing::debug!("{}", line);
        }
    }

    if let Some(error) = output.error {
        return Err(BuildError::BuildFailed(error));
    }

    if let Some(error_detail) = output.error_detail {
        let error_msg = error_detail
            .message
            .unwrap_or_else(|| "Unknown build error".to_string());
        return Err(BuildError::BuildFailed(error_msg));
    }

    if let Some(status) = output.status {
        tracing::debug!("{}", status);
    }

    Ok(())
}
