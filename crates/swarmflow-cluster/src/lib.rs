//! SwarmFlow Cluster
//!
//! Docker Swarm のフォーメーション、クラスタ内レジストリ、
//! イメージとクライアントアーカイブの配布を扱います。

pub mod client;
pub mod error;
pub mod formation;
pub mod join;
pub mod registry;
pub mod scripts;

pub use client::{client_operations, distribute_client_artifact};
pub use error::{ClusterError, Result};
pub use formation::{ClusterFormation, FormationState};
pub use join::{JoinCredential, extract_join_command};
pub use registry::{distribute_images, start_registry};
