//! Logging setup

use crate::settings::LoggingConfig;
use crate::RuntimeError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global tracing subscriber.
///
/// Fails instead of panicking when the level is unknown or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), RuntimeError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| RuntimeError::Logging(format!("unknown level '{}'", config.level)))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.map_err(|e| RuntimeError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_is_rejected() {
        let config = LoggingConfig {
            level: "loud".into(),
            json: false,
        };
        assert!(matches!(init_logging(&config), Err(RuntimeError::Logging(_))));
    }

    #[test]
    fn test_second_install_fails() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        assert!(matches!(init_logging(&config), Err(RuntimeError::Logging(_))));
    }
}
