//! Latches for edge-triggered channels.
//!
//! An edge-triggered channel fires once when its condition turns true and
//! stays latched until the condition is observed false again, however many
//! frames the gesture is held. Tilt and gas/brake are level-triggered and
//! never pass through here.

use crate::classifier::{Classification, Eye, Mouth, Rock};
use log::debug;

const CHANNEL_COUNT: usize = 5;

/// Channels that fire one tap per gesture occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeChannel {
    Mouth,
    EyeBlink,
    LeftRock,
    RightRock,
    LeftHandMacro,
}

impl EdgeChannel {
    pub const ALL: [Self; CHANNEL_COUNT] = [
        Self::Mouth,
        Self::EyeBlink,
        Self::LeftRock,
        Self::RightRock,
        Self::LeftHandMacro,
    ];

    const fn index(self) -> usize {
        match self {
            Self::Mouth => 0,
            Self::EyeBlink => 1,
            Self::LeftRock => 2,
            Self::RightRock => 3,
            Self::LeftHandMacro => 4,
        }
    }
}

/// Which edge channels fire on this pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Triggers {
    pub mouth: bool,
    pub eye: bool,
    pub left_rock: bool,
    pub right_rock: bool,
    pub left_macro: bool,
}

/// One latch per edge-triggered channel
#[derive(Debug, Clone, Default)]
pub struct DebounceRegistry {
    latches: [bool; CHANNEL_COUNT],
}

impl DebounceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only on the first pass of a continuous true interval
    pub fn should_fire(&mut self, channel: EdgeChannel, condition: bool) -> bool {
        let latch = &mut self.latches[channel.index()];
        if !condition {
            *latch = false;
            return false;
        }
        if *latch {
            return false;
        }
        *latch = true;
        debug!("{:?} fired", channel);
        true
    }

    #[must_use]
    pub fn is_latched(&self, channel: EdgeChannel) -> bool {
        self.latches[channel.index()]
    }

    /// Clear every latch
    pub fn reset(&mut self) {
        self.latches = [false; CHANNEL_COUNT];
    }

    /// Feed one pass through every edge channel.
    ///
    /// An absent face or hand (or an unreadable channel) counts as a false
    /// condition, so its latch clears.
    pub fn evaluate(&mut self, classification: &Classification) -> Triggers {
        let face = classification.face;
        let left = classification.left;
        let right = classification.right;

        let mouth_open = face.and_then(|f| f.mouth) == Some(Mouth::Open);
        let blinking = face.and_then(|f| f.eye) == Some(Eye::Blink);
        let left_rock = left.and_then(|h| h.rock) == Some(Rock::Active);
        let right_rock = right.and_then(|h| h.rock) == Some(Rock::Active);
        let left_macro = left.and_then(|h| h.spread).is_some_and(|s| s.is_eligible());

        Triggers {
            mouth: self.should_fire(EdgeChannel::Mouth, mouth_open),
            eye: self.should_fire(EdgeChannel::EyeBlink, blinking),
            left_rock: self.should_fire(EdgeChannel::LeftRock, left_rock),
            right_rock: self.should_fire(EdgeChannel::RightRock, right_rock),
            left_macro: self.should_fire(EdgeChannel::LeftHandMacro, left_macro),
        }
    }
}
