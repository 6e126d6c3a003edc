//! Feedback projection for the rendering layer

use crate::machine::hold_predicate;
use crate::stage::ExerciseStage;
use crate::state::{SessionState, ALIGN_PROMPT};
use crate::SessionConfig;
use serde::{Deserialize, Serialize};

/// User-facing feedback derived from a session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Stage title
    pub title: String,
    /// Instruction or encouragement
    pub text: String,
    /// One-line diagnostic string
    pub debug: String,
}

/// Project a state into feedback. Pure: the same state always yields
/// the same feedback, regardless of the frames that produced it.
pub fn project(state: &SessionState, config: &SessionConfig) -> Feedback {
    Feedback {
        title: state.stage.title().to_string(),
        text: feedback_text(state, config),
        debug: debug_snapshot(state, config),
    }
}

fn feedback_text(state: &SessionState, config: &SessionConfig) -> String {
    if let Some(reason) = &state.fault {
        return format!("Camera unavailable: {}", reason);
    }

    match state.stage {
        ExerciseStage::Breathing => return state.breathing_phase.instruction().to_string(),
        ExerciseStage::Completed => return "Session Complete".to_string(),
        _ => {}
    }

    if state.pending_advance.is_some() || state.reps >= config.target_reps {
        return match state.stage {
            ExerciseStage::ChestOpener => "All Done!",
            _ => "Great Job!",
        }
        .to_string();
    }

    let Some(metrics) = &state.last_metrics else {
        return ALIGN_PROMPT.to_string();
    };
    let Some(holding) = hold_predicate(config, state.stage, metrics) else {
        return ALIGN_PROMPT.to_string();
    };

    let just_committed = state.rep_committed;

    match state.stage {
        ExerciseStage::Calibration if holding => format!(
            "Perfect! Hold... {}/{}",
            state.hold_ticks, config.calibration_hold_ticks
        ),
        ExerciseStage::Calibration => "Raise hands above nose!".to_string(),
        ExerciseStage::SkyReach if just_committed => "Relax Down.".to_string(),
        ExerciseStage::SkyReach if holding => "Excellent Reach!".to_string(),
        ExerciseStage::SkyReach => format!("Reach Higher! ({}%)", metrics.arm_extension_pct),
        ExerciseStage::ChestOpener if just_committed => "Relax.".to_string(),
        ExerciseStage::ChestOpener if holding => "Feel the stretch...".to_string(),
        ExerciseStage::ChestOpener => {
            format!("Elbows Up & Open! ({}%)", metrics.wrist_spread_pct)
        }
        ExerciseStage::Breathing | ExerciseStage::Completed => ALIGN_PROMPT.to_string(),
    }
}

fn debug_snapshot(state: &SessionState, config: &SessionConfig) -> String {
    let metrics = state.last_metrics.unwrap_or_default();
    let snapshot = match state.stage {
        ExerciseStage::Calibration => format!(
            "State: {} | HandsUp: {} | Timer: {}",
            state.stage,
            metrics.hands_above_nose.unwrap_or(false),
            state.hold_ticks
        ),
        ExerciseStage::SkyReach => format!(
            "State: {} | Ext: {}% | Reps: {}",
            state.stage, metrics.arm_extension_pct, state.reps
        ),
        ExerciseStage::ChestOpener => format!(
            "State: {} | Open: {}% | Reps: {}",
            state.stage, metrics.wrist_spread_pct, state.reps
        ),
        ExerciseStage::Breathing => format!(
            "Phase: {} | Cycle: {}/{}",
            state.breathing_phase, state.cycle_count, config.breathing.cycles
        ),
        ExerciseStage::Completed => {
            format!("State: {} | Score: {}", state.stage, state.score)
        }
    };

    match &state.fault {
        Some(reason) => format!("{} | Fault: {}", snapshot, reason),
        None => snapshot,
    }
}
