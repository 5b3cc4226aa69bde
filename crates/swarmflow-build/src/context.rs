//! ビルドコンテキストの作成

use crate::error::{BuildError, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::{Path, PathBuf};
use swarmflow_core::ImageSpec;
use tar::Builder;

/// コンテキストサイズの警告しきい値
const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024;

pub struct ContextBuilder;

impl ContextBuilder {
    /// イメージ定義からビルドコンテキストを作成
    ///
    /// 相対パスは base_dir から解決する。
    pub fn for_image(base_dir: &Path, image: &ImageSpec) -> Result<Vec<u8>> {
        let context = resolve(base_dir, &image.context);
        if !context.is_dir() {
            return Err(BuildError::ContextNotFound(context));
        }

        let dockerfile = resolve(base_dir, &image.dockerfile_path());
        if !dockerfile.is_file() {
            return Err(BuildError::DockerfileNotFound(dockerfile));
        }

        Self::create_context(&context, &dockerfile)
    }

    /// ビルドコンテキストをtar.gzアーカイブとして作成
    ///
    /// Dockerfile はアーカイブ直下に `Dockerfile` として追加される。
    pub fn create_context(context_path: &Path, dockerfile_path: &Path) -> Result<Vec<u8>> {
        tracing::debug!("Creating build context from: {}", context_path.display());

        let dockerfile_content = std::fs::read(dockerfile_path)?;

        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            tar.append_dir_all(".", context_path)?;

            let mut header = tar::Header::new_gnu();
            header.set_path("Dockerfile")?;
            header.set_size(dockerfile_content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar.append(&header, &dockerfile_content[..])?;

            tar.into_inner()?.finish()?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        if archive_data.len() > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "ビルドコンテキストが大きすぎます（{}MB）。.dockerignore で不要なファイルを除外してください",
                archive_data.len() / 1024 / 1024
            );
        }

        Ok(archive_data)
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn unpack(archive: Vec<u8>) -> tempfile::TempDir {
        let extract_dir = tempdir().unwrap();
        let decoder = flate2::read::GzDecoder::new(std::io::Cursor::new(archive));
        tar::Archive::new(decoder).unpack(extract_dir.path()).unwrap();
        extract_dir
    }

    #[test]
    fn test_for_image_includes_sources_and_dockerfile() {
        let base = tempdir().unwrap();
        let ctx = base.path().join("internal_triggers/cpu");
        fs::create_dir_all(ctx.join("src")).unwrap();
        fs::write(ctx.join("src/spin.c"), "int main(){for(;;);}").unwrap();
        fs::write(ctx.join("Dockerfile"), "FROM alpine\nCOPY src /src").unwrap();

        let image = ImageSpec::new("cpu_intensive", "internal_triggers/cpu");
        let archive = ContextBuilder::for_image(base.path(), &image).unwrap();

        let extracted = unpack(archive);
        assert!(extracted.path().join("Dockerfile").exists());
        assert!(extracted.path().join("src/spin.c").exists());
    }

    #[test]
    fn test_for_image_custom_dockerfile() {
        let base = tempdir().unwrap();
        let ctx = base.path().join("socialNetwork");
        fs::create_dir_all(ctx.join("docker")).unwrap();
        fs::write(ctx.join("docker/Dockerfile.log"), "FROM ubuntu").unwrap();

        let mut image = ImageSpec::new("social-network-microservices", "socialNetwork");
        image.dockerfile = Some(PathBuf::from("docker/Dockerfile.log"));

        let extracted = unpack(ContextBuilder::for_image(base.path(), &image).unwrap());
        let content = fs::read_to_string(extracted.path().join("Dockerfile")).unwrap();
        assert_eq!(content, "FROM ubuntu");
    }

    #[test]
    fn test_for_image_missing_context() {
        let base = tempdir().unwrap();
        let image = ImageSpec::new("io_intensive", "internal_triggers/io");
        let result = ContextBuilder::for_image(base.path(), &image);
        assert!(matches!(result, Err(BuildError::ContextNotFound(_))));
    }

    #[test]
    fn test_for_image_missing_dockerfile() {
        let base = tempdir().unwrap();
        fs::create_dir_all(base.path().join("empty")).unwrap();
        let image = ImageSpec::new("empty", "empty");
        let result = ContextBuilder::for_image(base.path(), &image);
        assert!(matches!(result, Err(BuildError::DockerfileNotFound(_))));
    }
}
