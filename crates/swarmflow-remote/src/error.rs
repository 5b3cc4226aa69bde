//! リモート実行のエラー型
//!
//! これらはトランスポート層の失敗で、ファンアウトエンジンが
//! ホスト単位の `CommandResult::transport_failure` に変換する。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("{program} の起動に失敗しました: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{host} に到達できません: {reason}")]
    Unreachable { host: String, reason: String },

    #[error("{host} のプロセスがシグナルで終了しました")]
    Terminated { host: String },

    #[error("{secs}秒以内に完了しませんでした")]
    Timeout { secs: u64 },

    #[error("ファイル転送に失敗しました ({path}): {source}")]
    Transfer {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RemoteError>;
