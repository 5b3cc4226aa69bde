//! OpenSSH クライアント経由のトランスポート
//!
//! `ssh` / `scp` を子プロセスとして起動する。パスワード入力で
//! 止まらないよう常に BatchMode で接続する。

use crate::error::{RemoteError, Result};
use crate::shell::mkdir_parent_command;
use crate::transport::Transport;
use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use swarmflow_config::expand_home;
use swarmflow_core::{CommandResult, Host};
use tokio::process::Command;

/// SSH 接続オプション
#[derive(Debug, Clone)]
pub struct SshOptions {
    /// 接続確立のタイムアウト（秒）
    pub connect_timeout: u64,
    /// 未知のホスト鍵を受け入れるか
    pub accept_new_host_keys: bool,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            connect_timeout: 10,
            accept_new_host_keys: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SshTransport {
    options: SshOptions,
}

impl SshTransport {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }

    fn common_args(&self, host: &Host) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.options.connect_timeout),
        ];
        if self.options.accept_new_host_keys {
            args.push("-o".to_string());
            args.push("StrictHostKeyChecking=no".to_string());
        }
        if let Some(identity) = &host.identity {
            args.push("-i".to_string());
            args.push(expand_home(identity).to_string_lossy().into_owned());
        }
        args
    }

    async fn spawn(&self, program: &str, args: &[String]) -> Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd.output().await.map_err(|source| RemoteError::Spawn {
            program: program.to_string(),
            source,
        })
    }
}

/// 子プロセスの出力を CommandResult に変換
pub(crate) fn to_command_result(host: &Host, output: Output) -> Result<CommandResult> {
    let code = output.status.code().ok_or_else(|| RemoteError::Terminated {
        host: host.id.clone(),
    })?;
    Ok(CommandResult::new(
        host.clone(),
        code,
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    ))
}

/// ssh 自身が接続・認証に失敗したことを示す終了コード
const SSH_ERROR_STATUS: i32 = 255;

/// 接続段階の失敗を示す stderr の断片
const CONNECTION_ERRORS: [&str; 6] = [
    "Could not resolve hostname",
    "Connection refused",
    "Connection timed out",
    "Permission denied (",
    "Host key verification failed",
    "lost connection",
];

/// ssh/scp の出力を CommandResult に変換
///
/// 接続できなかった場合はリモートの終了コードではないので
/// `RemoteError::Unreachable` にする。
fn ssh_result(host: &Host, output: Output) -> Result<CommandResult> {
    let result = to_command_result(host, output)?;
    if !result.success() && is_connection_failure(&result) {
        let reason = result.stderr.trim().lines().next().unwrap_or("ssh").to_string();
        return Err(RemoteError::Unreachable {
            host: host.id.clone(),
            reason,
        });
    }
    Ok(result)
}

fn is_connection_failure(result: &CommandResult) -> bool {
    let stderr = result.stderr.trim_start();
    (result.exit_status == SSH_ERROR_STATUS && result.stdout.is_empty())
        || stderr.starts_with("ssh:")
        || CONNECTION_ERRORS.iter().any(|pattern| stderr.contains(pattern))
}

#[async_trait]
impl Transport for SshTransport {
    fn name(&self) -> &'static str {
        "ssh"
    }

    async fn exec(&self, host: &Host, command: &str) -> Result<CommandResult> {
        let mut args = self.common_args(host);
        args.push(host.ssh_target());
        args.push(command.to_string());

        tracing::debug!(host = %host, "ssh {}", command);
        let output = self.spawn("ssh", &args).await?;
        ssh_result(host, output)
    }

    async fn put(&self, host: &Host, local: &Path, remote: &Path) -> Result<CommandResult> {
        if let Some(mkdir) = mkdir_parent_command(remote) {
            let prepared = self.exec(host, &mkdir).await?;
            if !prepared.success() {
                return Ok(prepared);
            }
        }

        let mut args = self.common_args(host);
        args.push(expand_home(local).to_string_lossy().into_owned());
        args.push(format!("{}:{}", host.ssh_target(), remote.display()));

        tracing::debug!(host = %host, "scp {} → {}", local.display(), remote.display());
        let output = self.spawn("scp", &args).await?;
        ssh_result(host, output)
    }
}
