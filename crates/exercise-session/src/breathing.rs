//! Timed 4-7-8 breathing schedule
//!
//! The sequence is precomputed from [`BreathingConfig`] so it can be
//! walked by any timer source: one `Ready` step, then `cycles` rounds
//! of inhale, hold and exhale.

use crate::config::{BreathingConfig, MAX_BREATHING_CYCLES};
use crate::stage::BreathingPhase;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One timed step of the breathing sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingStep {
    pub phase: BreathingPhase,
    /// 1-based cycle number (0 while getting ready)
    pub cycle: u32,
    pub duration: Duration,
}

/// Ordered list of breathing steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreathingSchedule {
    steps: Vec<BreathingStep>,
}

impl BreathingSchedule {
    /// Build the schedule for a configuration.
    ///
    /// Cycles beyond [`MAX_BREATHING_CYCLES`] are dropped.
    pub fn new(config: &BreathingConfig) -> Self {
        let cycles = config.cycles.min(MAX_BREATHING_CYCLES);
        let mut steps = Vec::with_capacity(1 + 3 * cycles as usize);
        steps.push(BreathingStep {
            phase: BreathingPhase::Ready,
            cycle: 0,
            duration: Duration::from_millis(config.ready_ms),
        });

        for cycle in 1..=cycles {
            for (phase, ms) in [
                (BreathingPhase::Inhale, config.inhale_ms),
                (BreathingPhase::Hold, config.hold_ms),
                (BreathingPhase::Exhale, config.exhale_ms),
            ] {
                steps.push(BreathingStep {
                    phase,
                    cycle,
                    duration: Duration::from_millis(ms),
                });
            }
        }

        Self { steps }
    }

    /// Step at a position, `None` once the sequence is exhausted
    pub fn get(&self, index: usize) -> Option<&BreathingStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BreathingStep> {
        self.steps.iter()
    }

    /// Wall-clock length of the whole sequence
    pub fn total_duration(&self) -> Duration {
        self.steps
            .iter()
            .fold(Duration::ZERO, |total, s| total.saturating_add(s.duration))
    }
}
