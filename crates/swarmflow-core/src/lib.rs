//! SwarmFlow Core
//!
//! ノードインベントリ、実行結果モデル、パイプライン定義、
//! および swarm.kdl パーサーを提供します。

pub mod error;
pub mod inventory;
pub mod model;
pub mod parser;

pub use error::{CoreError, Result};
pub use inventory::{
    CLIENT_GROUP, CLUSTER_GROUP, DEFAULT_HOST_PREFIX, Inventory, InventoryBuilder,
    build_inventory,
};
pub use model::*;
pub use parser::{parse_swarm, parse_swarm_file};
