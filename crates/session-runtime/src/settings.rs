//! Runtime configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! file (TOML, JSON or YAML by extension), then `VISION_COACH__*`
//! environment variables, e.g. `VISION_COACH__SESSION__TARGET_REPS=5`.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use exercise_session::{SessionConfig, SessionError};
use pose_landmarks::NormalizerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "VISION_COACH";

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Session runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Channel sizes
    pub buffers: BufferConfig,
    /// Landmark extraction
    pub normalizer: NormalizerConfig,
    /// Stage thresholds and timings
    pub session: SessionConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// Channel capacities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Pending pose frames before the detector blocks
    pub frames: usize,
    /// Pending lifecycle commands
    pub commands: usize,
    /// Pending feedback events before updates are dropped
    pub events: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            frames: 64,
            commands: 8,
            events: 256,
        }
    }
}

impl RuntimeConfig {
    /// Load defaults, an optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, SessionError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading runtime config from {}", path.display());
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );
        Self::build(builder)
    }

    /// Parse configuration from an in-memory document
    pub fn parse(contents: &str, format: FileFormat) -> Result<Self, SessionError> {
        Self::build(Config::builder().add_source(File::from_str(contents, format)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, SessionError> {
        let config: RuntimeConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check buffer sizes and the session section
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.buffers.frames == 0 || self.buffers.commands == 0 || self.buffers.events == 0 {
            return Err(SessionError::Config("buffer sizes must be greater than 0".into()));
        }
        self.session.validate()
    }
}
