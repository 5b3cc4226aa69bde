//! モデル定義
//!
//! SwarmFlowで使用されるデータモデルを定義します。
//! 各モデルは機能ごとにモジュールに分離されています。

mod artifact;
mod group;
mod host;
mod report;
mod stage;
mod swarm;

// Re-exports
pub use artifact::*;
pub use group::*;
pub use host::*;
pub use report::*;
pub use stage::*;
pub use swarm::*;
