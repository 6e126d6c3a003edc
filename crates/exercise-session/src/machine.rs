//! Exercise stage state machine
//!
//! Frame-driven stages (calibration, sky reach, chest opener) advance
//! through [`StageMachine::step`]. Each frame that satisfies the stage's
//! hold predicate adds a hold tick; a failing frame resets the count.
//! Once the count exceeds the stage threshold the commit fires:
//! calibration latches into sky reach, gesture stages count a rep and
//! award points. After the last rep the machine asks the caller for a
//! pause ([`Schedule::Advance`]) before moving on, and the breathing
//! stage is walked one step per [`Schedule::BreathingPhase`] expiry.

use crate::breathing::BreathingSchedule;
use crate::feedback;
use crate::stage::ExerciseStage;
use crate::state::SessionState;
use crate::{SessionConfig, SessionError};
use gesture_metrics::{GestureExtractor, GestureMetrics};
use pose_landmarks::LandmarkFrame;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Timer the caller must arm after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Call [`StageMachine::complete_advance`] after this delay
    Advance(Duration),
    /// Call [`StageMachine::advance_breathing`] after this delay
    BreathingPhase(Duration),
}

/// What a single frame did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// Frame unusable or missing a landmark the stage needs; counters untouched
    Skipped,
    /// Session not accepting frames (timer-driven stage, pending advance, or fault)
    Ignored,
    /// Predicate held; current hold count
    Holding(u32),
    /// Predicate failed; hold count reset
    Released,
    /// Calibration latch fired
    Calibrated,
    /// A repetition was committed
    RepCommitted { reps: u32, score: u32 },
}

/// Result of [`StageMachine::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub event: StepEvent,
    pub schedule: Option<Schedule>,
}

impl StepOutcome {
    fn event(event: StepEvent) -> Self {
        Self {
            event,
            schedule: None,
        }
    }
}

/// Drives a [`SessionState`] through the guided sequence
#[derive(Debug, Clone)]
pub struct StageMachine {
    config: SessionConfig,
    extractor: GestureExtractor,
    breathing: BreathingSchedule,
}

impl StageMachine {
    /// Create a state machine with configuration
    pub fn new(config: SessionConfig) -> Self {
        Self {
            extractor: GestureExtractor::new(config.metrics.clone()),
            breathing: BreathingSchedule::new(&config.breathing),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn breathing_schedule(&self) -> &BreathingSchedule {
        &self.breathing
    }

    /// Feed one frame. `None` means the detector saw nobody or the
    /// frame failed normalization.
    pub fn step(&self, state: &mut SessionState, frame: Option<&LandmarkFrame>) -> StepOutcome {
        if !state.is_active() || !state.stage.is_frame_driven() {
            return StepOutcome::event(StepEvent::Ignored);
        }
        state.rep_committed = false;

        let Some(frame) = frame else {
            trace!("Invalid frame in {}", state.stage);
            state.last_metrics = None;
            self.refresh(state);
            return StepOutcome::event(StepEvent::Skipped);
        };

        let metrics = self.extractor.extract(frame);
        state.last_metrics = Some(metrics);

        // Rep target reached; wait out the pause without scoring.
        if state.pending_advance.is_some() {
            self.refresh(state);
            return StepOutcome::event(StepEvent::Ignored);
        }

        let outcome = match hold_predicate(&self.config, state.stage, &metrics) {
            None => StepOutcome::event(StepEvent::Skipped),
            Some(false) => {
                state.hold_ticks = 0;
                StepOutcome::event(StepEvent::Released)
            }
            Some(true) => {
                state.hold_ticks = state.hold_ticks.saturating_add(1);
                if state.hold_ticks > self.hold_threshold(state.stage) {
                    self.commit(state)
                } else {
                    StepOutcome::event(StepEvent::Holding(state.hold_ticks))
                }
            }
        };

        self.refresh(state);
        outcome
    }

    /// Leave calibration immediately, bypassing the hands-up latch
    pub fn skip_calibration(&self, state: &mut SessionState) -> Result<(), SessionError> {
        if let Some(reason) = &state.fault {
            return Err(SessionError::DetectorUnavailable(reason.clone()));
        }
        if state.stage != ExerciseStage::Calibration {
            return Err(SessionError::InvalidTransition {
                from: state.stage,
                operation: "skip calibration",
            });
        }

        info!("Calibration skipped");
        self.enter_stage(state, ExerciseStage::SkyReach);
        self.refresh(state);
        Ok(())
    }

    /// Apply the pending stage change once the post-rep pause elapsed.
    ///
    /// Returns the first breathing timer when the new stage is breathing.
    pub fn complete_advance(&self, state: &mut SessionState) -> Option<Schedule> {
        if state.fault.is_some() {
            return None;
        }
        let next = state.pending_advance.take()?;
        self.enter_stage(state, next);

        let schedule = if next == ExerciseStage::Breathing {
            self.start_breathing(state)
        } else {
            None
        };
        self.refresh(state);
        schedule
    }

    /// Move to the next breathing step after the current one elapsed.
    ///
    /// Returns the next timer, or `None` once the session completed.
    pub fn advance_breathing(&self, state: &mut SessionState) -> Option<Schedule> {
        if state.stage != ExerciseStage::Breathing || state.fault.is_some() {
            return None;
        }

        state.breathing_cursor += 1;
        let schedule = match self.breathing.get(state.breathing_cursor) {
            Some(step) => {
                debug!("Breathing phase {} (cycle {})", step.phase, step.cycle);
                state.breathing_phase = step.phase;
                state.cycle_count = step.cycle;
                Some(Schedule::BreathingPhase(step.duration))
            }
            None => {
                self.enter_stage(state, ExerciseStage::Completed);
                info!("Session complete with score {}", state.score);
                None
            }
        };
        self.refresh(state);
        schedule
    }

    /// Freeze the session after the pose detector failed
    pub fn fail_detector(&self, state: &mut SessionState, reason: impl Into<String>) {
        if state.fault.is_some() {
            return;
        }
        let reason = reason.into();
        warn!("Pose detector unavailable: {}", reason);
        state.fault = Some(reason);
        self.refresh(state);
    }

    fn commit(&self, state: &mut SessionState) -> StepOutcome {
        state.hold_ticks = 0;

        if state.stage == ExerciseStage::Calibration {
            info!("Calibration latch fired");
            self.enter_stage(state, ExerciseStage::SkyReach);
            return StepOutcome::event(StepEvent::Calibrated);
        }

        state.reps += 1;
        state.score = state.score.saturating_add(self.config.points_per_rep);
        state.rep_committed = true;
        debug!(
            "{} rep {}/{} committed, score {}",
            state.stage, state.reps, self.config.target_reps, state.score
        );

        let schedule = if state.reps >= self.config.target_reps {
            state.pending_advance = state.stage.next();
            Some(Schedule::Advance(self.config.advance_delay()))
        } else {
            None
        };

        StepOutcome {
            event: StepEvent::RepCommitted {
                reps: state.reps,
                score: state.score,
            },
            schedule,
        }
    }

    fn enter_stage(&self, state: &mut SessionState, next: ExerciseStage) {
        info!("Stage {} -> {}", state.stage, next);
        state.stage = next;
        state.reps = 0;
        state.hold_ticks = 0;
        state.pending_advance = None;
        state.rep_committed = false;
    }

    fn start_breathing(&self, state: &mut SessionState) -> Option<Schedule> {
        state.breathing_cursor = 0;
        let step = self.breathing.get(0)?;
        state.breathing_phase = step.phase;
        state.cycle_count = step.cycle;
        Some(Schedule::BreathingPhase(step.duration))
    }

    fn hold_threshold(&self, stage: ExerciseStage) -> u32 {
        match stage {
            ExerciseStage::Calibration => self.config.calibration_hold_ticks,
            ExerciseStage::SkyReach => self.config.sky_reach.hold_ticks,
            ExerciseStage::ChestOpener => self.config.chest_opener.hold_ticks,
            ExerciseStage::Breathing | ExerciseStage::Completed => u32::MAX,
        }
    }

    fn refresh(&self, state: &mut SessionState) {
        state.feedback_text = feedback::project(state, &self.config).text;
    }
}

/// Hold predicate for a stage; `None` when the frame lacks a landmark the
/// stage needs or the stage is not frame-driven
pub(crate) fn hold_predicate(
    config: &SessionConfig,
    stage: ExerciseStage,
    metrics: &GestureMetrics,
) -> Option<bool> {
    match stage {
        ExerciseStage::Calibration => metrics.hands_above_nose,
        ExerciseStage::SkyReach => Some(metrics.arm_extension_pct > config.sky_reach.threshold_pct),
        ExerciseStage::ChestOpener => metrics
            .elbow_symmetry_ok
            .map(|level| level && metrics.wrist_spread_pct > config.chest_opener.threshold_pct),
        ExerciseStage::Breathing | ExerciseStage::Completed => None,
    }
}
