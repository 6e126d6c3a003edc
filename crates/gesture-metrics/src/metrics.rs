//! Gesture metric computation

use pose_landmarks::{Keypoint, LandmarkFrame};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Wrist-over-shoulder displacement multiplier (full reach lands near 100%)
pub const EXTENSION_SCALE: f32 = 250.0;

/// Maximum |elbow.y - shoulder.y| for an elbow to count as level
pub const ELBOW_LEVEL_TOLERANCE: f32 = 0.15;

/// Horizontal wrist distance multiplier
pub const SPREAD_SCALE: f32 = 150.0;

/// Calibration constants, tuned for a head-and-shoulders framing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    pub extension_scale: f32,
    pub elbow_tolerance: f32,
    pub spread_scale: f32,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            extension_scale: EXTENSION_SCALE,
            elbow_tolerance: ELBOW_LEVEL_TOLERANCE,
            spread_scale: SPREAD_SCALE,
        }
    }
}

/// Derived per-frame values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GestureMetrics {
    /// Both wrists above the nose; `None` when the nose was not detected
    pub hands_above_nose: Option<bool>,
    /// Average upward wrist-over-shoulder reach (0-100)
    pub arm_extension_pct: u8,
    /// Both elbows level with their shoulders; `None` when an elbow was not detected
    pub elbow_symmetry_ok: Option<bool>,
    /// Horizontal distance between wrists (0-100)
    pub wrist_spread_pct: u8,
}

/// Metric extractor holding calibration constants
#[derive(Debug, Clone, Default)]
pub struct GestureExtractor {
    config: MetricConfig,
}

impl GestureExtractor {
    pub fn new(config: MetricConfig) -> Self {
        Self { config }
    }

    /// Compute metrics for one frame
    pub fn extract(&self, frame: &LandmarkFrame) -> GestureMetrics {
        // Image y grows downward, so "above" means a smaller y.
        let hands_above_nose = frame
            .nose
            .map(|nose| frame.left_wrist.y < nose.y && frame.right_wrist.y < nose.y);

        let left_reach = (frame.left_shoulder.y - frame.left_wrist.y).max(0.0);
        let right_reach = (frame.right_shoulder.y - frame.right_wrist.y).max(0.0);
        let arm_extension_pct = to_pct((left_reach + right_reach) / 2.0 * self.config.extension_scale);

        let elbow_symmetry_ok = match (frame.left_elbow, frame.right_elbow) {
            (Some(left), Some(right)) => Some(
                self.elbow_level(&left, &frame.left_shoulder)
                    && self.elbow_level(&right, &frame.right_shoulder),
            ),
            _ => None,
        };

        let wrist_spread_pct =
            to_pct((frame.left_wrist.x - frame.right_wrist.x).abs() * self.config.spread_scale);

        let metrics = GestureMetrics {
            hands_above_nose,
            arm_extension_pct,
            elbow_symmetry_ok,
            wrist_spread_pct,
        };
        trace!("Frame metrics: {:?}", metrics);
        metrics
    }

    fn elbow_level(&self, elbow: &Keypoint, shoulder: &Keypoint) -> bool {
        (elbow.y - shoulder.y).abs() < self.config.elbow_tolerance
    }
}

/// Compute metrics with the default calibration constants
pub fn extract_metrics(frame: &LandmarkFrame) -> GestureMetrics {
    GestureExtractor::default().extract(frame)
}

fn to_pct(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
