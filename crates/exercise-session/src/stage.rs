//! Exercise stages and breathing phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the guided sequence. Transitions are forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseStage {
    #[default]
    Calibration,
    SkyReach,
    ChestOpener,
    Breathing,
    Completed,
}

impl ExerciseStage {
    /// The stage that follows this one, if any
    pub fn next(self) -> Option<ExerciseStage> {
        match self {
            ExerciseStage::Calibration => Some(ExerciseStage::SkyReach),
            ExerciseStage::SkyReach => Some(ExerciseStage::ChestOpener),
            ExerciseStage::ChestOpener => Some(ExerciseStage::Breathing),
            ExerciseStage::Breathing => Some(ExerciseStage::Completed),
            ExerciseStage::Completed => None,
        }
    }

    /// Stages driven by camera frames rather than timers
    pub fn is_frame_driven(self) -> bool {
        matches!(
            self,
            ExerciseStage::Calibration | ExerciseStage::SkyReach | ExerciseStage::ChestOpener
        )
    }

    /// Stages that count repetitions
    pub fn is_rep_counted(self) -> bool {
        matches!(self, ExerciseStage::SkyReach | ExerciseStage::ChestOpener)
    }

    /// Display title shown above the feedback text
    pub fn title(self) -> &'static str {
        match self {
            ExerciseStage::Calibration => "Start Session",
            ExerciseStage::SkyReach => "Sky Reaches",
            ExerciseStage::ChestOpener => "Chest Openers",
            ExerciseStage::Breathing => "4-7-8 Breathing",
            ExerciseStage::Completed => "Session Complete",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ExerciseStage::Calibration => "calibration",
            ExerciseStage::SkyReach => "sky_reach",
            ExerciseStage::ChestOpener => "chest_opener",
            ExerciseStage::Breathing => "breathing",
            ExerciseStage::Completed => "completed",
        }
    }
}

impl fmt::Display for ExerciseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of the timed breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathingPhase {
    #[default]
    Ready,
    Inhale,
    Hold,
    Exhale,
}

impl BreathingPhase {
    /// Instruction shown on entering the phase
    pub fn instruction(self) -> &'static str {
        match self {
            BreathingPhase::Ready => "Get comfortable for deep breathing...",
            BreathingPhase::Inhale => "Inhale deeply through nose...",
            BreathingPhase::Hold => "Hold your breath...",
            BreathingPhase::Exhale => "Exhale slowly through mouth...",
        }
    }
}

impl fmt::Display for BreathingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BreathingPhase::Ready => "ready",
            BreathingPhase::Inhale => "inhale",
            BreathingPhase::Hold => "hold",
            BreathingPhase::Exhale => "exhale",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_is_forward_only() {
        let mut stage = ExerciseStage::Calibration;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            stage = next;
            visited.push(stage);
        }
        assert_eq!(visited.len(), 5);
        assert_eq!(stage, ExerciseStage::Completed);
    }

    #[test]
    fn test_frame_driven_stages() {
        assert!(ExerciseStage::Calibration.is_frame_driven());
        assert!(ExerciseStage::ChestOpener.is_frame_driven());
        assert!(!ExerciseStage::Breathing.is_frame_driven());
        assert!(!ExerciseStage::Completed.is_frame_driven());
        assert!(!ExerciseStage::Calibration.is_rep_counted());
    }

    #[test]
    fn test_display() {
        assert_eq!(ExerciseStage::SkyReach.to_string(), "sky_reach");
        assert_eq!(BreathingPhase::Exhale.to_string(), "exhale");
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&ExerciseStage::ChestOpener).unwrap();
        assert_eq!(json, "\"chest_opener\"");

        let phase: BreathingPhase = serde_json::from_str("\"inhale\"").unwrap();
        assert_eq!(phase, BreathingPhase::Inhale);
    }
}
