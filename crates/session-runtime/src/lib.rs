//! Guided Session Runtime
//!
//! Runs one exercise session as a single tokio task. Pose frames,
//! lifecycle commands and the session's own phase timers are funneled
//! into that task, so the session state is only ever mutated by one
//! consumer, one input at a time.

mod runtime;
mod view;

pub mod settings;
pub mod telemetry;

pub use runtime::{PoseInput, SessionChannels, SessionHandle, SessionRuntime};
pub use settings::{LoggingConfig, RuntimeConfig};
pub use view::{SessionEvent, SessionView};

use exercise_session::SessionError;
use thiserror::Error;

/// Runtime error types
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Session is closed")]
    Closed,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Session task failed: {0}")]
    Task(String),
}
