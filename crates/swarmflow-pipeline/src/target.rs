//! ステージ対象のグループ解決

use swarmflow_core::{GroupRole, Host, Inventory, NodeGroup, Target};

/// ローカル実行用グループの名前
pub const LOCAL_GROUP: &str = "local";

/// ステージの対象をインベントリ上のグループに解決する
pub fn resolve_target(target: Target, inventory: &Inventory) -> NodeGroup {
    match target {
        Target::Cluster => inventory.cluster().clone(),
        Target::Workers => inventory.workers(),
        Target::Manager => inventory.cluster().head(),
        Target::Clients => inventory.clients().clone(),
        Target::FirstClient => inventory.clients().head(),
        Target::Local => NodeGroup::new(LOCAL_GROUP, GroupRole::Manager, vec![Host::local()]),
    }
}
