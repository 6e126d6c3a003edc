//! Feedback sink types

use exercise_session::{project, BreathingPhase, ExerciseStage, SessionConfig, SessionState, SessionSummary};
use serde::{Deserialize, Serialize};

/// Everything the rendering layer may see of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub stage: ExerciseStage,
    pub title: String,
    pub feedback_text: String,
    pub debug_snapshot: String,
    pub reps: u32,
    pub target_reps: u32,
    pub score: u32,
    /// Present only during the breathing stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breathing_phase: Option<BreathingPhase>,
    pub cycle_count: u32,
    pub target_cycles: u32,
    /// Detector failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl SessionView {
    /// Project a consistent snapshot of the state
    pub fn from_state(state: &SessionState, config: &SessionConfig) -> Self {
        let feedback = project(state, config);
        Self {
            stage: state.stage(),
            title: feedback.title,
            feedback_text: feedback.text,
            debug_snapshot: feedback.debug,
            reps: state.reps(),
            target_reps: config.target_reps,
            score: state.score(),
            breathing_phase: (state.stage() == ExerciseStage::Breathing)
                .then(|| state.breathing_phase()),
            cycle_count: state.cycle_count(),
            target_cycles: config.breathing.cycles,
            fault: state.fault().map(str::to_string),
        }
    }
}

/// Notifications published by a running session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    /// State changed; latest projection
    Updated(SessionView),
    /// Session reached completion (sent exactly once)
    Completed(SessionSummary),
    /// Pose detector failed; the session is frozen until restarted
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_of_new_session() {
        let view = SessionView::from_state(&SessionState::new(), &SessionConfig::default());
        assert_eq!(view.stage, ExerciseStage::Calibration);
        assert_eq!(view.title, "Start Session");
        assert_eq!(view.feedback_text, "Align yourself in frame...");
        assert_eq!(view.target_reps, 3);
        assert_eq!(view.breathing_phase, None);
    }

    #[test]
    fn test_view_json_shape() {
        let view = SessionView::from_state(&SessionState::new(), &SessionConfig::default());
        let json = serde_json::to_value(SessionEvent::Updated(view)).unwrap();

        assert_eq!(json["type"], "updated");
        assert_eq!(json["data"]["stage"], "calibration");
        assert_eq!(json["data"]["score"], 0);
        assert!(json["data"].get("breathing_phase").is_none());
        assert!(json["data"].get("fault").is_none());
    }

    #[test]
    fn test_completed_event_json() {
        let summary = SessionSummary {
            score: 90,
            stages_completed: 4,
            cycles: 3,
        };
        let json = serde_json::to_value(SessionEvent::Completed(summary)).unwrap();
        assert_eq!(json["type"], "completed");
        assert_eq!(json["data"]["score"], 90);
    }
}
