//! コマンド実行結果とグループ実行レポート

use super::{FailurePolicy, Host};
use serde::{Deserialize, Serialize};

/// トランスポート障害（到達不能・認証失敗・タイムアウト）を表す予約済み終了コード
pub const TRANSPORT_FAILURE_STATUS: i32 = -1;

/// 1ホスト × 1コマンドの実行結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub host: Host,
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn new(
        host: Host,
        exit_status: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            host,
            exit_status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// トランスポート障害として記録（stdout は常に空）
    pub fn transport_failure(host: Host, reason: impl Into<String>) -> Self {
        Self {
            host,
            exit_status: TRANSPORT_FAILURE_STATUS,
            stdout: String::new(),
            stderr: reason.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    pub fn is_transport_failure(&self) -> bool {
        self.exit_status == TRANSPORT_FAILURE_STATUS
    }

    /// stdout と stderr を連結した出力
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// グループ全体への1オペレーションの実行レポート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupExecutionReport {
    /// 対象グループ名
    pub group: String,

    /// 実行時の失敗ポリシー
    pub policy: FailurePolicy,

    /// ホストごとの結果（グループ内の順序）
    pub results: Vec<CommandResult>,

    /// 最初に失敗を報告したホスト（完了順）
    pub first_failure: Option<String>,
}

impl GroupExecutionReport {
    pub fn new(group: impl Into<String>, policy: FailurePolicy) -> Self {
        Self {
            group: group.into(),
            policy,
            results: Vec::new(),
            first_failure: None,
        }
    }

    /// 全ホストが終了コード0で完了したか
    pub fn aggregate_success(&self) -> bool {
        self.results.iter().all(CommandResult::success)
    }

    /// fail-fast ポリシーで失敗しており、ステージを中断すべきか
    pub fn is_fatal(&self) -> bool {
        self.policy == FailurePolicy::FailFast && !self.aggregate_success()
    }

    pub fn failures(&self) -> Vec<&CommandResult> {
        self.results.iter().filter(|r| !r.success()).collect()
    }

    pub fn result_for(&self, host_id: &str) -> Option<&CommandResult> {
        self.results.iter().find(|r| r.host.id == host_id)
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }
}
