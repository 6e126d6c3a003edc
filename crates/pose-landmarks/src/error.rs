//! Frame Error Types

use thiserror::Error;

/// Reasons a detector frame cannot be used by the session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// A load-bearing landmark was not reported by the detector
    #[error("Missing required landmark: {0}")]
    MissingLandmark(&'static str),

    /// Landmark present but below the configured visibility floor
    #[error("{landmark} visibility {visibility:.2} is below minimum {min:.2}")]
    LowVisibility {
        landmark: &'static str,
        visibility: f32,
        min: f32,
    },
}
