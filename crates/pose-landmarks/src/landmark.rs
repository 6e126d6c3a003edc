//! Keypoint and landmark index types

use serde::{Deserialize, Serialize};

/// Number of keypoints in a full-body pose detection
pub const POSE_LANDMARK_COUNT: usize = 33;

/// A single detected keypoint in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    /// Horizontal position (0 = left edge, 1 = right edge)
    pub x: f32,
    /// Vertical position (0 = top edge, 1 = bottom edge)
    pub y: f32,
    /// Detection confidence (0-1)
    pub visibility: f32,
}

impl Keypoint {
    /// Create a fully visible keypoint
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            visibility: 1.0,
        }
    }

    /// Create a keypoint with an explicit visibility score
    pub fn with_visibility(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }
}

/// Upper-body landmarks used by the exercise session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Landmark {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
}

impl Landmark {
    /// All landmarks the session reads, in detector index order
    pub const ALL: [Landmark; 7] = [
        Landmark::Nose,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
    ];

    /// Index in the 33-point pose topology
    pub fn index(self) -> usize {
        match self {
            Landmark::Nose => 0,
            Landmark::LeftShoulder => 11,
            Landmark::RightShoulder => 12,
            Landmark::LeftElbow => 13,
            Landmark::RightElbow => 14,
            Landmark::LeftWrist => 15,
            Landmark::RightWrist => 16,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Landmark::Nose => "nose",
            Landmark::LeftShoulder => "leftShoulder",
            Landmark::RightShoulder => "rightShoulder",
            Landmark::LeftElbow => "leftElbow",
            Landmark::RightElbow => "rightElbow",
            Landmark::LeftWrist => "leftWrist",
            Landmark::RightWrist => "rightWrist",
        }
    }
}

/// Raw detector output for one body, indexed by the pose topology.
///
/// Slots the detector did not fill are `None`; a short vector is
/// treated the same as trailing `None`s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLandmarks {
    points: Vec<Option<Keypoint>>,
}

impl RawLandmarks {
    /// Wrap a complete detector result
    pub fn from_points(points: Vec<Keypoint>) -> Self {
        Self {
            points: points.into_iter().map(Some).collect(),
        }
    }

    /// Empty result with every slot unfilled
    pub fn empty() -> Self {
        Self {
            points: vec![None; POSE_LANDMARK_COUNT],
        }
    }

    /// Set the keypoint for a landmark, growing the slot vector if needed
    pub fn set(&mut self, landmark: Landmark, point: Keypoint) {
        let idx = landmark.index();
        if self.points.len() <= idx {
            self.points.resize(idx + 1, None);
        }
        self.points[idx] = Some(point);
    }

    /// Clear the slot for a landmark
    pub fn remove(&mut self, landmark: Landmark) {
        if let Some(slot) = self.points.get_mut(landmark.index()) {
            *slot = None;
        }
    }

    /// Builder-style variant of [`RawLandmarks::set`]
    pub fn with(mut self, landmark: Landmark, point: Keypoint) -> Self {
        self.set(landmark, point);
        self
    }

    /// Builder-style variant of [`RawLandmarks::remove`]
    pub fn without(mut self, landmark: Landmark) -> Self {
        self.remove(landmark);
        self
    }

    /// Look up a keypoint by raw topology index
    pub fn get(&self, index: usize) -> Option<&Keypoint> {
        self.points.get(index).and_then(Option::as_ref)
    }

    /// Look up a keypoint by landmark
    pub fn landmark(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.get(landmark.index())
    }

    /// Number of filled slots
    pub fn detected_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_indices_follow_pose_topology() {
        assert_eq!(Landmark::Nose.index(), 0);
        assert_eq!(Landmark::LeftShoulder.index(), 11);
        assert_eq!(Landmark::RightWrist.index(), 16);
        assert!(Landmark::ALL.iter().all(|l| l.index() < POSE_LANDMARK_COUNT));
    }

    #[test]
    fn test_set_grows_short_vectors() {
        let mut raw = RawLandmarks::default();
        raw.set(Landmark::RightWrist, Keypoint::new(0.4, 0.2));

        assert_eq!(raw.landmark(Landmark::RightWrist), Some(&Keypoint::new(0.4, 0.2)));
        assert!(raw.landmark(Landmark::Nose).is_none());
        assert_eq!(raw.detected_count(), 1);
    }

    #[test]
    fn test_out_of_range_index_is_absent() {
        let raw = RawLandmarks::from_points(vec![Keypoint::new(0.5, 0.5)]);
        assert!(raw.get(0).is_some());
        assert!(raw.get(40).is_none());
    }
}
