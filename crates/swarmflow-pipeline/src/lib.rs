//! SwarmFlow Pipeline
//!
//! 名前付きステージを宣言順に実行する fail-fast シーケンサーと、
//! 既定のブートストラップパイプラインを提供します。

pub mod defaults;
pub mod error;
pub mod logger;
pub mod run;
pub mod sequencer;
pub mod target;

pub use defaults::{default_client_artifact, default_images, default_pipeline};
pub use error::{PipelineError, Result};
pub use logger::{PipelineLogger, format_duration};
pub use run::{PipelineRun, RunStatus, StageOutcome, StageReport};
pub use sequencer::{SequencerContext, StageSequencer};
pub use target::{LOCAL_GROUP, resolve_target};
