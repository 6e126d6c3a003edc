//! Guided Exercise Session
//!
//! The core of the camera-driven breathing coach:
//! - Stage machine (calibration, sky reaches, chest openers)
//! - Hold-tick debouncing, repetition and harmony score accounting
//! - Timed 4-7-8 breathing schedule
//! - Feedback projection for the rendering layer
//!
//! Everything here is synchronous and timer-free. Delays are returned
//! as [`Schedule`] requests for the caller to arm.

pub mod breathing;
pub mod config;
pub mod feedback;
pub mod machine;
pub mod stage;
pub mod state;

pub use breathing::{BreathingSchedule, BreathingStep};
pub use self::config::{
    BreathingConfig, GestureStageConfig, SessionConfig, MAX_BREATHING_CYCLES, MAX_PHASE_MS,
    MAX_POINTS_PER_REP,
};
pub use feedback::{project, Feedback};
pub use machine::{Schedule, StageMachine, StepEvent, StepOutcome};
pub use stage::{BreathingPhase, ExerciseStage};
pub use state::{SessionState, SessionSummary};

use thiserror::Error;

/// Session error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Pose detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot {operation} while in {from}")]
    InvalidTransition {
        from: ExerciseStage,
        operation: &'static str,
    },
}
