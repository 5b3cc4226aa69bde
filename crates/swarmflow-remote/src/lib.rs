//! SwarmFlow Remote
//!
//! ホストへのコマンド実行・ファイル転送のトランスポートと、
//! グループ全体への並行ファンアウトを提供します。

pub mod error;
pub mod fanout;
pub mod local;
pub mod shell;
pub mod ssh;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{RemoteError, Result};
pub use fanout::{run_on_group, run_operations};
pub use local::LocalTransport;
pub use shell::shell_escape;
pub use ssh::{SshOptions, SshTransport};
pub use transport::Transport;
