//! ノードインベントリ
//!
//! インデックス付きホストの連続範囲を、クラスタグループ（サイズN）と
//! クライアントグループ（サイズM）に決定的に分割する。
//! ホストの発見は行わない。アドレスは呼び出し側で解決できる前提。

use crate::error::{CoreError, Result};
use crate::model::{GroupRole, Host, NodeGroup};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ホスト名の既定プレフィックス（node-0, node-1, ...）
pub const DEFAULT_HOST_PREFIX: &str = "node-";

/// クラスタグループ名
pub const CLUSTER_GROUP: &str = "swarm";

/// クライアントグループ名
pub const CLIENT_GROUP: &str = "clients";

/// 互いに素な2つのグループからなるインベントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    cluster: NodeGroup,
    clients: NodeGroup,
}

impl Inventory {
    pub fn builder() -> InventoryBuilder {
        InventoryBuilder::default()
    }

    /// マネージャー＋ワーカー
    pub fn cluster(&self) -> &NodeGroup {
        &self.cluster
    }

    pub fn clients(&self) -> &NodeGroup {
        &self.clients
    }

    /// マネージャー（クラスタグループの先頭）
    pub fn manager(&self) -> Option<&Host> {
        self.cluster.first()
    }

    pub fn workers(&self) -> NodeGroup {
        self.cluster.workers()
    }

    /// 全ホスト（クラスタ → クライアントの順）
    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.cluster.hosts().iter().chain(self.clients.hosts())
    }

    pub fn into_groups(self) -> (NodeGroup, NodeGroup) {
        (self.cluster, self.clients)
    }
}

/// インベントリのビルダー
#[derive(Debug, Clone)]
pub struct InventoryBuilder {
    prefix: String,
    user: Option<String>,
    identity: Option<PathBuf>,
}

impl Default for InventoryBuilder {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_HOST_PREFIX.to_string(),
            user: None,
            identity: None,
        }
    }
}

impl InventoryBuilder {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    pub fn identity(mut self, identity: Option<PathBuf>) -> Self {
        self.identity = identity;
        self
    }

    /// N台のクラスタとM台のクライアントに分割
    pub fn build(&self, cluster_size: usize, client_size: usize) -> Result<Inventory> {
        if cluster_size == 0 {
            return Err(CoreError::InvalidGroupSize {
                group: CLUSTER_GROUP.to_string(),
                count: 0,
            });
        }
        if client_size == 0 {
            return Err(CoreError::InvalidGroupSize {
                group: CLIENT_GROUP.to_string(),
                count: 0,
            });
        }
        if self.prefix.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "ホスト名のプレフィックスが空です".to_string(),
            ));
        }

        let cluster_hosts = (0..cluster_size).map(|idx| self.host(idx)).collect();
        let client_hosts = (cluster_size..cluster_size + client_size)
            .map(|idx| self.host(idx))
            .collect();

        tracing::debug!(cluster_size, client_size, prefix = %self.prefix, "Built inventory");

        Ok(Inventory {
            cluster: NodeGroup::new(CLUSTER_GROUP, GroupRole::Manager, cluster_hosts),
            clients: NodeGroup::new(CLIENT_GROUP, GroupRole::Client, client_hosts),
        })
    }

    fn host(&self, idx: usize) -> Host {
        let name = format!("{}{}", self.prefix, idx);
        let mut host = Host::new(name.clone(), name);
        host.user = self.user.clone();
        host.identity = self.identity.clone();
        host
    }
}

/// 既定の命名規則でインベントリを構築
pub fn build_inventory(cluster_size: usize, client_size: usize) -> Result<Inventory> {
    Inventory::builder().build(cluster_size, client_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_group_sizes_and_disjointness() {
        for (n, m) in [(1, 1), (4, 2), (7, 3), (16, 9)] {
            let inventory = build_inventory(n, m).unwrap();
            assert_eq!(inventory.cluster().len(), n);
            assert_eq!(inventory.clients().len(), m);

            let cluster: HashSet<_> = inventory.cluster().hosts().iter().map(|h| &h.id).collect();
            let clients: HashSet<_> = inventory.clients().hosts().iter().map(|h| &h.id).collect();
            assert!(cluster.is_disjoint(&clients));
            assert_eq!(inventory.hosts().count(), n + m);
        }
    }

    #[test]
    fn test_index_naming() {
        let inventory = build_inventory(4, 2).unwrap();
        let cluster: Vec<_> = inventory.cluster().hosts().iter().map(|h| h.id.as_str()).collect();
        let clients: Vec<_> = inventory.clients().hosts().iter().map(|h| h.id.as_str()).collect();
        assert_eq!(cluster, vec!["node-0", "node-1", "node-2", "node-3"]);
        assert_eq!(clients, vec!["node-4", "node-5"]);
        assert_eq!(inventory.manager().unwrap().id, "node-0");
        assert_eq!(inventory.workers().len(), 3);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(matches!(
            build_inventory(0, 2),
            Err(CoreError::InvalidGroupSize { .. })
        ));
        assert!(matches!(
            build_inventory(3, 0),
            Err(CoreError::InvalidGroupSize { .. })
        ));
    }

    #[test]
    fn test_builder_credentials() {
        let inventory = Inventory::builder()
            .prefix("cl-")
            .user(Some("ubuntu".to_string()))
            .identity(Some(PathBuf::from("/keys/id_rsa")))
            .build(2, 1)
            .unwrap();

        let host = &inventory.clients().hosts()[0];
        assert_eq!(host.id, "cl-2");
        assert_eq!(host.ssh_target(), "ubuntu@cl-2");
        assert_eq!(host.identity.as_deref(), Some(std::path::Path::new("/keys/id_rsa")));
    }
}
