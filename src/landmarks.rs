//! Landmark frames produced by the hand and face detectors.
//!
//! Coordinates are normalized to `[0, 1]` relative to the frame, with y
//! growing downwards. A frame is an immutable snapshot: it is produced once per
//! detection pass and only read by classification.

use crate::constants::NUM_HAND_LANDMARKS;
use serde::{Deserialize, Serialize};

/// A single tracked keypoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Point {
    /// Create a planar point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Which hand the detector believes a landmark set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Label used by the detector and in status output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

/// Landmarks of one detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub handedness: Handedness,
    pub points: Vec<Point>,
}

impl HandLandmarks {
    #[must_use]
    pub fn new(handedness: Handedness, points: Vec<Point>) -> Self {
        Self { handedness, points }
    }

    /// Landmark at `index`, if the detector produced it
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Whether the set has the full hand skeleton
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.points.len() >= NUM_HAND_LANDMARKS
    }
}

/// Landmarks of the detected face mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub points: Vec<Point>,
}

impl FaceLandmarks {
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Landmark at `index`, if the mesh contains it
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }
}

/// Everything detected in one video frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
    #[serde(default)]
    pub face: Option<FaceLandmarks>,
}

impl LandmarkFrame {
    /// A frame in which nothing was detected
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// First hand tagged with `side`; later duplicates are ignored
    #[must_use]
    pub fn hand(&self, side: Handedness) -> Option<&HandLandmarks> {
        self.hands.iter().find(|hand| hand.handedness == side)
    }
}
