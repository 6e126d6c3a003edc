//! Pose Landmarks
//!
//! Keypoint types produced by an external pose detector and the
//! per-frame normalizer that extracts the upper-body subset used by
//! the guided exercise session.

mod error;
mod landmark;
mod normalizer;

pub use error::FrameError;
pub use landmark::{Keypoint, Landmark, RawLandmarks, POSE_LANDMARK_COUNT};
pub use normalizer::{LandmarkFrame, Normalizer, NormalizerConfig};
