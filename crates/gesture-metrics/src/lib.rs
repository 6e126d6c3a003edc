//! Gesture Metric Extraction
//!
//! Turns one normalized landmark frame into the scalar metrics the
//! exercise stages test against. Stateless: no memory across frames.

mod metrics;

pub use metrics::{
    extract_metrics, GestureExtractor, GestureMetrics, MetricConfig, ELBOW_LEVEL_TOLERANCE,
    EXTENSION_SCALE, SPREAD_SCALE,
};
