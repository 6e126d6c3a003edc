//! Session state tracking

use crate::stage::{BreathingPhase, ExerciseStage};
use gesture_metrics::GestureMetrics;
use serde::{Deserialize, Serialize};

/// Shown until the first usable frame arrives, and after any invalid frame
pub const ALIGN_PROMPT: &str = "Align yourself in frame...";

/// Mutable state of one guided session.
///
/// Only [`crate::StageMachine`] mutates it; everything else reads it
/// through the accessors or the feedback projection.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub(crate) stage: ExerciseStage,

    /// Consecutive frames the current hold predicate has been satisfied
    pub(crate) hold_ticks: u32,

    /// Completed repetitions in the current stage
    pub(crate) reps: u32,

    /// Cumulative harmony score, never decreases
    pub(crate) score: u32,

    pub(crate) breathing_phase: BreathingPhase,

    /// Breathing cycles started (1-based once inhaling)
    pub(crate) cycle_count: u32,

    /// Position in the breathing schedule
    pub(crate) breathing_cursor: usize,

    /// Metrics of the last frame; `None` if it was unusable
    pub(crate) last_metrics: Option<GestureMetrics>,

    /// Stage to enter once the post-rep pause elapses
    pub(crate) pending_advance: Option<ExerciseStage>,

    /// The last frame committed a repetition
    pub(crate) rep_committed: bool,

    /// Detector failure reason; once set the session is frozen
    pub(crate) fault: Option<String>,

    /// Last projected feedback text
    pub(crate) feedback_text: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            stage: ExerciseStage::Calibration,
            hold_ticks: 0,
            reps: 0,
            score: 0,
            breathing_phase: BreathingPhase::Ready,
            cycle_count: 0,
            breathing_cursor: 0,
            last_metrics: None,
            pending_advance: None,
            rep_committed: false,
            fault: None,
            feedback_text: ALIGN_PROMPT.to_string(),
        }
    }
}

impl SessionState {
    /// Fresh session in calibration with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> ExerciseStage {
        self.stage
    }

    pub fn hold_ticks(&self) -> u32 {
        self.hold_ticks
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn breathing_phase(&self) -> BreathingPhase {
        self.breathing_phase
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn last_metrics(&self) -> Option<&GestureMetrics> {
        self.last_metrics.as_ref()
    }

    pub fn pending_advance(&self) -> Option<ExerciseStage> {
        self.pending_advance
    }

    pub fn rep_committed(&self) -> bool {
        self.rep_committed
    }

    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn feedback_text(&self) -> &str {
        &self.feedback_text
    }

    pub fn is_completed(&self) -> bool {
        self.stage == ExerciseStage::Completed
    }

    /// Whether frames or timers may still change this session
    pub fn is_active(&self) -> bool {
        self.fault.is_none() && !self.is_completed()
    }

    /// Totals for the completion notification
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            stages_completed: self.stage as u32,
            cycles: self.cycle_count,
        }
    }
}

/// Result delivered when a session completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Final harmony score
    pub score: u32,
    /// Number of stages left behind (4 for a finished session)
    pub stages_completed: u32,
    /// Breathing cycles performed
    pub cycles: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_in_calibration() {
        let state = SessionState::new();
        assert_eq!(state.stage(), ExerciseStage::Calibration);
        assert_eq!(state.hold_ticks(), 0);
        assert_eq!(state.reps(), 0);
        assert_eq!(state.score(), 0);
        assert_eq!(state.feedback_text(), ALIGN_PROMPT);
        assert!(state.is_active());
    }

    #[test]
    fn test_summary_counts_stages() {
        let mut state = SessionState::new();
        state.stage = ExerciseStage::Completed;
        state.score = 90;
        state.cycle_count = 3;

        let summary = state.summary();
        assert_eq!(summary.stages_completed, 4);
        assert_eq!(summary.score, 90);
        assert!(!state.is_active());
    }
}
