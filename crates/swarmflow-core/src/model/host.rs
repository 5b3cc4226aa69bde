//! ホスト定義

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// オーケストレータ自身を表すホストID
pub const LOCAL_HOST_ID: &str = "localhost";

/// アドレス可能なリモートホスト
///
/// 一度構築したら変更しない。実行中に破棄されることもない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Host {
    /// インデックスベースの識別子（例: node-0）
    pub id: String,

    /// ネットワークアドレス（呼び出し側のネットワーク層で解決可能であること）
    pub address: String,

    /// SSHユーザー（省略時は ssh の既定値）
    #[serde(default)]
    pub user: Option<String>,

    /// SSH秘密鍵のパス（資格情報の参照）
    #[serde(default)]
    pub identity: Option<PathBuf>,
}

impl Host {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            user: None,
            identity: None,
        }
    }

    /// オーケストレータが動いているマシン自身
    pub fn local() -> Self {
        Self::new(LOCAL_HOST_ID, "127.0.0.1")
    }

    /// ssh/scp に渡す接続先（user@address 形式）
    pub fn ssh_target(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.address),
            None => self.address.clone(),
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_target() {
        let host = Host::new("node-1", "node-1");
        assert_eq!(host.ssh_target(), "node-1");

        let mut host = host;
        host.user = Some("ubuntu".to_string());
        assert_eq!(host.ssh_target(), "ubuntu@node-1");
    }

    #[test]
    fn test_local_host() {
        let local = Host::local();
        assert_eq!(local.id, LOCAL_HOST_ID);
        assert_eq!(local.ssh_target(), "127.0.0.1");
    }
}
