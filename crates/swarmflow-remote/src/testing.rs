//! テスト用のスクリプト化トランスポート
//!
//! 実ホストに接続せず、ホストとコマンドの部分一致で応答を返す。
//! 呼び出しはすべて記録される。

use crate::error::{RemoteError, Result};
use crate::transport::Transport;
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use swarmflow_core::{CommandResult, Host};

#[derive(Debug, Clone)]
enum Reply {
    Exit {
        status: i32,
        stdout: String,
        stderr: String,
    },
    Unreachable,
    Delay(Duration),
}

#[derive(Debug, Clone)]
struct Rule {
    host: Option<String>,
    pattern: String,
    reply: Reply,
}

impl Rule {
    fn matches(&self, host: &Host, command: &str) -> bool {
        self.host.as_ref().is_none_or(|h| *h == host.id) && command.contains(&self.pattern)
    }
}

/// 記録された呼び出し
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub host: String,
    /// コマンド文字列。転送は `put <local> <remote>` として記録
    pub command: String,
}

/// 応答をスクリプトできるトランスポート
///
/// 後から追加したルールが優先される。どのルールにも一致しない
/// 呼び出しは終了ステータス0・空出力で成功する。
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    rules: Vec<Rule>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn rule(mut self, host: Option<&str>, pattern: &str, reply: Reply) -> Self {
        self.rules.push(Rule {
            host: host.map(str::to_string),
            pattern: pattern.to_string(),
            reply,
        });
        self
    }

    /// 全ホストで、pattern を含むコマンドに stdout を返す
    pub fn reply(self, pattern: &str, stdout: &str) -> Self {
        self.rule(
            None,
            pattern,
            Reply::Exit {
                status: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        )
    }

    /// 指定ホストで、pattern を含むコマンドに stdout を返す
    pub fn reply_on(self, host: &str, pattern: &str, stdout: &str) -> Self {
        self.rule(
            Some(host),
            pattern,
            Reply::Exit {
                status: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        )
    }

    /// 全ホストで、pattern を含むコマンドを失敗させる
    pub fn fail(self, pattern: &str, status: i32, stderr: &str) -> Self {
        self.rule(
            None,
            pattern,
            Reply::Exit {
                status,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        )
    }

    /// 指定ホストで、pattern を含むコマンドを失敗させる
    pub fn fail_on(self, host: &str, pattern: &str, status: i32, stderr: &str) -> Self {
        self.rule(
            Some(host),
            pattern,
            Reply::Exit {
                status,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        )
    }

    /// 指定ホストへの接続をすべて失敗させる
    pub fn unreachable(self, host: &str) -> Self {
        self.rule(Some(host), "", Reply::Unreachable)
    }

    /// 指定ホストの応答を遅延させる（成功として返す）
    pub fn delay_on(self, host: &str, delay: Duration) -> Self {
        self.rule(Some(host), "", Reply::Delay(delay))
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 記録された全呼び出し（呼び出し順）
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock_calls().clone()
    }

    /// 指定ホストで実行されたコマンド
    pub fn commands_for(&self, host: &str) -> Vec<String> {
        self.lock_calls()
            .iter()
            .filter(|c| c.host == host)
            .map(|c| c.command.clone())
            .collect()
    }

    /// pattern を含むコマンドを実行したホスト
    pub fn hosts_running(&self, pattern: &str) -> Vec<String> {
        self.lock_calls()
            .iter()
            .filter(|c| c.command.contains(pattern))
            .map(|c| c.host.clone())
            .collect()
    }

    async fn respond(&self, host: &Host, command: String) -> Result<CommandResult> {
        self.lock_calls().push(RecordedCall {
            host: host.id.clone(),
            command: command.clone(),
        });

        let rule = self
            .rules
            .iter()
            .rev()
            .find(|r| r.matches(host, &command))
            .cloned();

        match rule.map(|r| r.reply) {
            None => Ok(CommandResult::new(host.clone(), 0, "", "")),
            Some(Reply::Exit {
                status,
                stdout,
                stderr,
            }) => Ok(CommandResult::new(host.clone(), status, stdout, stderr)),
            Some(Reply::Unreachable) => Err(RemoteError::Unreachable {
                host: host.id.clone(),
                reason: "Connection refused".to_string(),
            }),
            Some(Reply::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(CommandResult::new(host.clone(), 0, "", ""))
            }
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn exec(&self, host: &Host, command: &str) -> Result<CommandResult> {
        self.respond(host, command.to_string()).await
    }

    async fn put(&self, host: &Host, local: &Path, remote: &Path) -> Result<CommandResult> {
        self.respond(
            host,
            format!("put {} {}", local.display(), remote.display()),
        )
        .await
    }
}
