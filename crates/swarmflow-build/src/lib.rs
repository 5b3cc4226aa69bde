//! SwarmFlow Docker Image Build functionality
//!
//! ビルドコンテキストの作成、イメージのビルド、
//! クラスタ内レジストリへのプッシュを提供します。

pub mod builder;
pub mod context;
pub mod error;
pub mod publisher;
pub mod pusher;

pub use builder::ImageBuilder;
pub use context::ContextBuilder;
pub use error::{BuildError, Result};
pub use publisher::{DockerImagePublisher, ImagePublisher, ShellImagePublisher};
pub use pusher::{ImagePusher, split_image_tag};
