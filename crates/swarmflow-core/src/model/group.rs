//! ノードグループ定義

use super::Host;
use serde::{Deserialize, Serialize};
use std::fmt;

/// グループの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    /// マネージャー＋ワーカー（先頭ホストがマネージャー）
    Manager,
    /// ワーカーのみ
    Worker,
    /// 負荷生成クライアント
    Client,
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRole::Manager => write!(f, "manager"),
            GroupRole::Worker => write!(f, "worker"),
            GroupRole::Client => write!(f, "client"),
        }
    }
}

/// 同じ役割を持つホストの名前付き集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroup {
    pub name: String,
    pub role: GroupRole,
    hosts: Vec<Host>,
}

impl NodeGroup {
    pub fn new(name: impl Into<String>, role: GroupRole, hosts: Vec<Host>) -> Self {
        Self {
            name: name.into(),
            role,
            hosts,
        }
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// 先頭ホスト（クラスタグループではマネージャー）
    pub fn first(&self) -> Option<&Host> {
        self.hosts.first()
    }

    /// 先頭ホストだけからなるグループ
    pub fn head(&self) -> NodeGroup {
        NodeGroup::new(
            format!("{}[0]", self.name),
            self.role,
            self.hosts.iter().take(1).cloned().collect(),
        )
    }

    /// 先頭を除いたホストからなるワーカーグループ
    pub fn workers(&self) -> NodeGroup {
        NodeGroup::new(
            format!("{}-workers", self.name),
            GroupRole::Worker,
            self.hosts.iter().skip(1).cloned().collect(),
        )
    }
}
