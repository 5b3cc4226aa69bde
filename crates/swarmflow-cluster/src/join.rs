//! swarm init 出力からの参加コマンド抽出

use crate::error::{ClusterError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const JOIN_PATTERN: &str = r"docker swarm join --token .*:\d+";

/// ワーカーが使う参加資格情報
///
/// フォーメーション試行ごとに1回だけ作られ、次のリセットまで有効。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCredential {
    /// 出力から抜き出した参加コマンド全体
    pub command: String,
    pub token: String,
    /// マネージャーの host:port
    pub manager: String,
}

impl JoinCredential {
    /// ワーカーで実行するコマンド
    pub fn worker_command(&self) -> String {
        format!("sudo {}", self.command)
    }
}

impl fmt::Display for JoinCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)
    }
}

/// swarm init の出力から参加コマンドを抽出する
///
/// 最初に一致した `docker swarm join --token <token> <host>:<port>` を
/// そのまま返す。一致しなければ `JoinCommandNotFound`。
pub fn extract_join_command(output: &str) -> Result<JoinCredential> {
    let pattern = Regex::new(JOIN_PATTERN)?;
    let command = pattern
        .find(output)
        .map(|m| m.as_str().trim_end().to_string())
        .ok_or(ClusterError::JoinCommandNotFound)?;

    let mut words = command.split_whitespace().skip_while(|w| *w != "--token");
    let token = words.nth(1).unwrap_or_default().to_string();
    let manager = command
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .to_string();

    Ok(JoinCredential {
        command,
        token,
        manager,
    })
}
