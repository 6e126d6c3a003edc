//! Session configuration

use crate::SessionError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat};
use gesture_metrics::MetricConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for `points_per_rep`
pub const MAX_POINTS_PER_REP: u32 = 1_000;

/// Upper bound for `breathing.cycles`
pub const MAX_BREATHING_CYCLES: u32 = 20;

/// Upper bound for any single delay or breathing phase (10 minutes)
pub const MAX_PHASE_MS: u64 = 600_000;

/// Hold rule for a rep-counted gesture stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureStageConfig {
    /// Consecutive passing frames that must be exceeded to commit a rep
    pub hold_ticks: u32,
    /// Metric percentage that must be exceeded for a frame to pass
    pub threshold_pct: u8,
}

/// Timed breathing sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathingConfig {
    pub ready_ms: u64,
    pub inhale_ms: u64,
    pub hold_ms: u64,
    pub exhale_ms: u64,
    /// Number of inhale/hold/exhale cycles
    pub cycles: u32,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            ready_ms: 3000,
            inhale_ms: 4000,
            hold_ms: 7000,
            exhale_ms: 8000,
            cycles: 3,
        }
    }
}

/// Guided session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hands-above-nose frames that must be exceeded to leave calibration
    pub calibration_hold_ticks: u32,

    /// Sky reach: arm extension hold
    pub sky_reach: GestureStageConfig,

    /// Chest opener: level elbows plus wrist spread hold
    pub chest_opener: GestureStageConfig,

    /// Repetitions per gesture stage
    pub target_reps: u32,

    /// Harmony points per committed repetition
    pub points_per_rep: u32,

    /// Pause after the last rep before moving on (milliseconds)
    pub advance_delay_ms: u64,

    /// Metric calibration constants
    pub metrics: MetricConfig,

    /// Breathing timings
    pub breathing: BreathingConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            calibration_hold_ticks: 10,
            sky_reach: GestureStageConfig {
                hold_ticks: 40,
                threshold_pct: 80,
            },
            chest_opener: GestureStageConfig {
                hold_ticks: 40,
                threshold_pct: 60,
            },
            target_reps: 3,
            points_per_rep: 15,
            advance_delay_ms: 1000,
            metrics: MetricConfig::default(),
            breathing: BreathingConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parse configuration from an in-memory document
    pub fn parse(contents: &str, format: FileFormat) -> Result<Self, SessionError> {
        Self::build(Config::builder().add_source(File::from_str(contents, format)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, SessionError> {
        let config: SessionConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or short-circuit the session
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.calibration_hold_ticks == 0
            || self.sky_reach.hold_ticks == 0
            || self.chest_opener.hold_ticks == 0
        {
            return Err(SessionError::Config("hold_ticks must be greater than 0".into()));
        }
        if self.sky_reach.threshold_pct >= 100 || self.chest_opener.threshold_pct >= 100 {
            return Err(SessionError::Config("threshold_pct must be below 100".into()));
        }
        if self.target_reps == 0 {
            return Err(SessionError::Config("target_reps must be greater than 0".into()));
        }
        if self.points_per_rep > MAX_POINTS_PER_REP {
            return Err(SessionError::Config(format!(
                "points_per_rep must be at most {}",
                MAX_POINTS_PER_REP
            )));
        }
        if self.breathing.cycles == 0 || self.breathing.cycles > MAX_BREATHING_CYCLES {
            return Err(SessionError::Config(format!(
                "breathing.cycles must be between 1 and {}",
                MAX_BREATHING_CYCLES
            )));
        }

        let b = &self.breathing;
        let delays = [self.advance_delay_ms, b.ready_ms, b.inhale_ms, b.hold_ms, b.exhale_ms];
        if delays.iter().any(|&ms| ms > MAX_PHASE_MS) {
            return Err(SessionError::Config(format!(
                "delays and breathing phases must be at most {} ms",
                MAX_PHASE_MS
            )));
        }
        Ok(())
    }

    /// Pause before leaving a finished gesture stage
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}
