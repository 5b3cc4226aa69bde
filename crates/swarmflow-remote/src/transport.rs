//! トランスポート抽象

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use swarmflow_core::{CommandResult, Host, Operation};

/// 単一ホストに対するコマンド実行とファイル転送
///
/// 非ゼロ終了は `Ok` の `CommandResult` として返す。
/// `Err` は接続・起動などトランスポート自体の失敗に限る。
#[async_trait]
pub trait Transport: Send + Sync {
    /// トランスポート名（ログ用）
    fn name(&self) -> &'static str;

    /// シェルコマンドを実行
    async fn exec(&self, host: &Host, command: &str) -> Result<CommandResult>;

    /// ファイルを転送（転送先ディレクトリは事前に作成する）
    async fn put(&self, host: &Host, local: &Path, remote: &Path) -> Result<CommandResult>;

    /// オペレーションを実行
    async fn run(&self, host: &Host, operation: &Operation) -> Result<CommandResult> {
        match operation {
            Operation::Command(cmd) => self.exec(host, cmd).await,
            Operation::Transfer { local, remote } => self.put(host, local, remote).await,
        }
    }
}
