//! Per-channel gesture classification.
//!
//! Every function here is pure: it reads a landmark set and the current
//! thresholds and returns a state. A channel whose landmarks are missing or
//! degenerate yields `None`, which the rest of the engine treats as passive.
//! Nothing in this module can fail a whole pass.

use crate::{
    config::Thresholds,
    constants::{
        FACE_CHIN, FACE_FOREHEAD, FACE_LEFT_EYE_LOWER, FACE_LEFT_EYE_UPPER, FACE_LOWER_LIP,
        FACE_RIGHT_EYE_LOWER, FACE_RIGHT_EYE_UPPER, FACE_UPPER_LIP, FINGER_TIP_JOINTS, INDEX_PIP,
        INDEX_TIP, MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP, MIN_EXTENDED_FINGERS, PINKY_PIP, PINKY_TIP,
        RING_PIP, RING_TIP, WRIST,
    },
    landmarks::{FaceLandmarks, HandLandmarks, Handedness, LandmarkFrame},
    utils::{angle_from_vertical, planar_distance, vertical_gap},
};

/// Mouth channel state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mouth {
    Open,
    Closed,
}

impl Mouth {
    /// Open iff the lip/face ratio strictly exceeds the threshold
    #[must_use]
    pub fn from_ratio(ratio: f64, threshold: f64) -> Self {
        if ratio > threshold {
            Self::Open
        } else {
            Self::Closed
        }
    }
}

/// Eye channel state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Blink,
    Open,
}

impl Eye {
    /// A smaller eyelid gap means a more closed eye
    #[must_use]
    pub fn from_gap(gap: f64, threshold: f64) -> Self {
        if gap < threshold {
            Self::Blink
        } else {
            Self::Open
        }
    }
}

/// Three-way tilt of a hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tilt {
    Left,
    Right,
    Center,
}

impl Tilt {
    /// Classify an angle against independent left and right thresholds (degrees)
    #[must_use]
    pub fn from_angle(angle: f64, left_threshold: f64, right_threshold: f64) -> Self {
        if angle < -left_threshold {
            Self::Left
        } else if angle > right_threshold {
            Self::Right
        } else {
            Self::Center
        }
    }
}

/// Measured tilt angle together with its classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltReading {
    pub angle: f64,
    pub direction: Tilt,
}

/// Rock sign (index and pinky up, middle and ring folded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rock {
    Active,
    Inactive,
}

/// Left-hand finger macro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spread {
    Spread,
    Closed,
    /// Fewer than three fingers extended
    Ineligible,
}

impl Spread {
    /// Whether the macro condition holds at all
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        !matches!(self, Self::Ineligible)
    }
}

/// Right-hand gas/brake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    Forward,
    Backward,
    Idle,
}

/// Face channels of one pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceReading {
    pub mouth: Option<Mouth>,
    pub eye: Option<Eye>,
}

/// Left-hand channels of one pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeftHandReading {
    pub tilt: Option<TiltReading>,
    pub rock: Option<Rock>,
    pub spread: Option<Spread>,
}

/// Right-hand channels of one pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RightHandReading {
    pub tilt: Option<TiltReading>,
    pub rock: Option<Rock>,
    pub throttle: Option<Throttle>,
}

/// All channel states for one pass; `None` marks an absent body part
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Classification {
    pub face: Option<FaceReading>,
    pub left: Option<LeftHandReading>,
    pub right: Option<RightHandReading>,
}

/// Ratio of lip opening to face height
#[must_use]
pub fn mouth_ratio(face: &FaceLandmarks) -> Option<f64> {
    let lips = vertical_gap(face.point(FACE_UPPER_LIP)?, face.point(FACE_LOWER_LIP)?);
    let face_height = vertical_gap(face.point(FACE_FOREHEAD)?, face.point(FACE_CHIN)?);
    (face_height > 0.0).then(|| lips / face_height)
}

#[must_use]
pub fn mouth(face: &FaceLandmarks, threshold: f64) -> Option<Mouth> {
    mouth_ratio(face).map(|ratio| Mouth::from_ratio(ratio, threshold))
}

/// Mean eyelid gap of both eyes
#[must_use]
pub fn eye_gap(face: &FaceLandmarks) -> Option<f64> {
    let left = vertical_gap(face.point(FACE_LEFT_EYE_UPPER)?, face.point(FACE_LEFT_EYE_LOWER)?);
    let right = vertical_gap(face.point(FACE_RIGHT_EYE_UPPER)?, face.point(FACE_RIGHT_EYE_LOWER)?);
    Some((left + right) / 2.0)
}

#[must_use]
pub fn eye(face: &FaceLandmarks, threshold: f64) -> Option<Eye> {
    eye_gap(face).map(|gap| Eye::from_gap(gap, threshold))
}

/// Hand tilt in degrees, positive when leaning right
#[must_use]
pub fn tilt_angle(hand: &HandLandmarks) -> Option<f64> {
    let angle = angle_from_vertical(hand.point(WRIST)?, hand.point(MIDDLE_MCP)?);
    angle.is_finite().then_some(angle)
}

#[must_use]
pub fn tilt(hand: &HandLandmarks, left_threshold: f64, right_threshold: f64) -> Option<TiltReading> {
    tilt_angle(hand).map(|angle| TiltReading {
        angle,
        direction: Tilt::from_angle(angle, left_threshold, right_threshold),
    })
}

fn above(hand: &HandLandmarks, tip: usize, joint: usize) -> Option<bool> {
    Some(hand.point(tip)?.y < hand.point(joint)?.y)
}

fn below(hand: &HandLandmarks, tip: usize, joint: usize) -> Option<bool> {
    Some(hand.point(tip)?.y > hand.point(joint)?.y)
}

#[must_use]
pub fn rock(hand: &HandLandmarks) -> Option<Rock> {
    let index_up = above(hand, INDEX_TIP, INDEX_PIP)?;
    let pinky_up = above(hand, PINKY_TIP, PINKY_PIP)?;
    let middle_down = below(hand, MIDDLE_TIP, MIDDLE_PIP)?;
    let ring_down = below(hand, RING_TIP, RING_PIP)?;

    if index_up && pinky_up && middle_down && ring_down {
        Some(Rock::Active)
    } else {
        Some(Rock::Inactive)
    }
}

/// Number of non-thumb fingers whose tip is above its middle joint
#[must_use]
pub fn extended_fingers(hand: &HandLandmarks) -> Option<usize> {
    FINGER_TIP_JOINTS.iter().try_fold(0, |count, &(tip, joint)| {
        above(hand, tip, joint).map(|up| count + usize::from(up))
    })
}

/// Distance between the index and middle fingertips
#[must_use]
pub fn fingertip_gap(hand: &HandLandmarks) -> Option<f64> {
    Some(planar_distance(hand.point(INDEX_TIP)?, hand.point(MIDDLE_TIP)?))
}

#[must_use]
pub fn spread(hand: &HandLandmarks, threshold: f64) -> Option<Spread> {
    if extended_fingers(hand)? < MIN_EXTENDED_FINGERS {
        return Some(Spread::Ineligible);
    }
    let gap = fingertip_gap(hand)?;
    Some(if gap > threshold { Spread::Spread } else { Spread::Closed })
}

#[must_use]
pub fn throttle(hand: &HandLandmarks, threshold: f64) -> Option<Throttle> {
    if extended_fingers(hand)? < MIN_EXTENDED_FINGERS {
        return Some(Throttle::Idle);
    }
    let gap = fingertip_gap(hand)?;
    Some(if gap > threshold { Throttle::Forward } else { Throttle::Backward })
}

#[must_use]
pub fn classify_face(face: &FaceLandmarks, thresholds: &Thresholds) -> FaceReading {
    FaceReading {
        mouth: mouth(face, thresholds.mouth),
        eye: eye(face, thresholds.eye),
    }
}

#[must_use]
pub fn classify_left_hand(hand: &HandLandmarks, thresholds: &Thresholds) -> LeftHandReading {
    LeftHandReading {
        tilt: tilt(hand, thresholds.left_tilt_left, thresholds.left_tilt_right),
        rock: rock(hand),
        spread: spread(hand, thresholds.left_spread),
    }
}

#[must_use]
pub fn classify_right_hand(hand: &HandLandmarks, thresholds: &Thresholds) -> RightHandReading {
    RightHandReading {
        tilt: tilt(hand, thresholds.right_tilt_left, thresholds.right_tilt_right),
        rock: rock(hand),
        throttle: throttle(hand, thresholds.right_gas_brake),
    }
}

/// Classify every channel of a frame
#[must_use]
pub fn classify(frame: &LandmarkFrame, thresholds: &Thresholds) -> Classification {
    Classification {
        face: frame.face.as_ref().map(|face| classify_face(face, thresholds)),
        left: frame
            .hand(Handedness::Left)
            .map(|hand| classify_left_hand(hand, thresholds)),
        right: frame
            .hand(Handedness::Right)
            .map(|hand| classify_right_hand(hand, thresholds)),
    }
}
