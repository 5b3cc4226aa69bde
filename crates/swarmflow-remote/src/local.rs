//! オーケストレータ自身で実行するトランスポート

use crate::error::{RemoteError, Result};
use crate::ssh::to_command_result;
use crate::transport::Transport;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use swarmflow_config::expand_home;
use swarmflow_core::{CommandResult, Host};
use tokio::process::Command;

/// `sh -c` でローカル実行する
#[derive(Debug, Clone, Default)]
pub struct LocalTransport {
    workdir: Option<PathBuf>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 作業ディレクトリを指定（未指定ならカレントディレクトリ）
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        let path = expand_home(path);
        match &self.workdir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn exec(&self, host: &Host, command: &str) -> Result<CommandResult> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        tracing::debug!(host = %host, "sh -c {}", command);
        let output = cmd.output().await.map_err(|source| RemoteError::Spawn {
            program: "sh".to_string(),
            source,
        })?;
        to_command_result(host, output)
    }

    async fn put(&self, host: &Host, local: &Path, remote: &Path) -> Result<CommandResult> {
        let src = self.resolve(local);
        let dst = self.resolve(remote);

        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| RemoteError::Transfer {
                    path: parent.display().to_string(),
                    source,
                })?;
        }
        tokio::fs::copy(&src, &dst)
            .await
            .map_err(|source| RemoteError::Transfer {
                path: src.display().to_string(),
                source,
            })?;

        tracing::debug!(host = %host, "copied {} → {}", src.display(), dst.display());
        Ok(CommandResult::new(host.clone(), 0, "", ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exec_captures_output_and_status() {
        let transport = LocalTransport::new();
        let host = Host::local();

        let ok = transport.exec(&host, "echo hello").await.unwrap();
        assert!(ok.success());
        assert_eq!(ok.stdout.trim(), "hello");

        let failed = transport.exec(&host, "echo oops >&2; exit 3").await.unwrap();
        assert_eq!(failed.exit_status, 3);
        assert_eq!(failed.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn test_exec_in_workdir() {
        let dir = tempfile::tempdir().unwrap();
        let transport = LocalTransport::new().with_workdir(dir.path());
        let result = transport.exec(&Host::local(), "pwd").await.unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(
            PathBuf::from(result.stdout.trim()).canonicalize().unwrap(),
            expected
        );
    }

    #[tokio::test]
    async fn test_put_creates_destination_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("id_rsa");
        std::fs::write(&src, "key").unwrap();

        let transport = LocalTransport::new().with_workdir(dir.path());
        let result = transport
            .put(&Host::local(), &src, Path::new("nested/.ssh/id_rsa"))
            .await
            .unwrap();

        assert!(result.success());
        let copied = std::fs::read_to_string(dir.path().join("nested/.ssh/id_rsa")).unwrap();
        assert_eq!(copied, "key");
    }

    #[tokio::test]
    async fn test_put_missing_source_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let transport = LocalTransport::new().with_workdir(dir.path());
        let result = transport
            .put(&Host::local(), Path::new("missing.zip"), Path::new("out.zip"))
            .await;
        assert!(matches!(result, Err(RemoteError::Transfer { .. })));
    }
}
