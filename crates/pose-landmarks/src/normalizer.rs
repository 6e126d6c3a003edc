//! Landmark Frame Normalization

use crate::error::FrameError;
use crate::landmark::{Keypoint, Landmark, RawLandmarks};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Normalizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Keypoints below this visibility are treated as absent (0 disables the check)
    pub min_visibility: f32,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_visibility: 0.0,
        }
    }
}

/// Upper-body subset of a detector frame.
///
/// Shoulders and wrists are always present. Nose and elbows are
/// best-effort and only consulted by the stages that need them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub nose: Option<Keypoint>,
    pub left_shoulder: Keypoint,
    pub right_shoulder: Keypoint,
    pub left_elbow: Option<Keypoint>,
    pub right_elbow: Option<Keypoint>,
    pub left_wrist: Keypoint,
    pub right_wrist: Keypoint,
}

/// Extracts [`LandmarkFrame`]s from raw detector output
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a new normalizer with given config
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Extract the required landmarks from one detector result.
    ///
    /// Fails if either shoulder or either wrist is missing or below the
    /// visibility floor. Never mutates anything.
    pub fn normalize(&self, raw: &RawLandmarks) -> Result<LandmarkFrame, FrameError> {
        let frame = LandmarkFrame {
            left_wrist: self.required(raw, Landmark::LeftWrist)?,
            right_wrist: self.required(raw, Landmark::RightWrist)?,
            left_shoulder: self.required(raw, Landmark::LeftShoulder)?,
            right_shoulder: self.required(raw, Landmark::RightShoulder)?,
            nose: self.optional(raw, Landmark::Nose),
            left_elbow: self.optional(raw, Landmark::LeftElbow),
            right_elbow: self.optional(raw, Landmark::RightElbow),
        };
        Ok(frame)
    }

    fn required(&self, raw: &RawLandmarks, landmark: Landmark) -> Result<Keypoint, FrameError> {
        let point = raw
            .landmark(landmark)
            .copied()
            .ok_or(FrameError::MissingLandmark(landmark.name()))?;

        if point.visibility < self.config.min_visibility {
            return Err(FrameError::LowVisibility {
                landmark: landmark.name(),
                visibility: point.visibility,
                min: self.config.min_visibility,
            });
        }
        Ok(point)
    }

    fn optional(&self, raw: &RawLandmarks, landmark: Landmark) -> Option<Keypoint> {
        let point = raw.landmark(landmark).copied()?;
        if point.visibility < self.config.min_visibility {
            trace!("Dropping {} (visibility {:.2})", landmark.name(), point.visibility);
            return None;
        }
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn full_body() -> RawLandmarks {
        Landmark::ALL
            .iter()
            .fold(RawLandmarks::empty(), |raw, &l| raw.with(l, Keypoint::new(0.5, 0.5)))
    }

    #[test]
    fn test_complete_frame_normalizes() {
        let frame = Normalizer::default().normalize(&full_body()).unwrap();
        assert!(frame.nose.is_some());
        assert!(frame.left_elbow.is_some());
        assert_eq!(frame.right_wrist, Keypoint::new(0.5, 0.5));
    }

    #[test]
    fn test_missing_wrist_is_invalid() {
        let raw = full_body().without(Landmark::LeftWrist);
        let err = Normalizer::default().normalize(&raw).unwrap_err();
        assert_eq!(err, FrameError::MissingLandmark("leftWrist"));
    }

    #[test]
    fn test_missing_optional_points_degrade() {
        let raw = full_body()
            .without(Landmark::Nose)
            .without(Landmark::RightElbow);
        let frame = Normalizer::default().normalize(&raw).unwrap();
        assert!(frame.nose.is_none());
        assert!(frame.right_elbow.is_none());
        assert!(frame.left_elbow.is_some());
    }

    #[test]
    fn test_visibility_floor() {
        let normalizer = Normalizer::new(NormalizerConfig { min_visibility: 0.5 });

        let raw = full_body().with(Landmark::RightShoulder, Keypoint::with_visibility(0.4, 0.6, 0.2));
        assert!(matches!(
            normalizer.normalize(&raw),
            Err(FrameError::LowVisibility { landmark: "rightShoulder", .. })
        ));

        let raw = full_body().with(Landmark::Nose, Keypoint::with_visibility(0.5, 0.3, 0.1));
        let frame = normalizer.normalize(&raw).unwrap();
        assert!(frame.nose.is_none());
    }

    #[test]
    fn test_empty_detection_is_invalid() {
        assert!(Normalizer::default().normalize(&RawLandmarks::default()).is_err());
    }

    proptest! {
        #[test]
        fn prop_any_missing_required_point_is_rejected(which in 0usize..4) {
            let required = [
                Landmark::LeftWrist,
                Landmark::RightWrist,
                Landmark::LeftShoulder,
                Landmark::RightShoulder,
            ];
            let raw = full_body().without(required[which]);
            prop_assert!(Normalizer::default().normalize(&raw).is_err());
        }
    }
}
