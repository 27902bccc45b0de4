//! Human-readable per-channel status, for display only.

use crate::{
    classifier::{Classification, Eye, Mouth, Rock, Tilt, TiltReading},
    utils::safe_cast::f64_to_i32,
};
use std::fmt;

const PASSIVE: &str = "Passive";

/// Status line per channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudStatus {
    pub left_hand: String,
    pub right_hand: String,
    pub mouth: String,
    pub eye: String,
    pub left_rock: String,
    pub right_rock: String,
}

impl Default for HudStatus {
    fn default() -> Self {
        Self {
            left_hand: PASSIVE.to_string(),
            right_hand: PASSIVE.to_string(),
            mouth: PASSIVE.to_string(),
            eye: PASSIVE.to_string(),
            left_rock: PASSIVE.to_string(),
            right_rock: PASSIVE.to_string(),
        }
    }
}

fn tilt_text(reading: Option<TiltReading>) -> String {
    match reading {
        None => PASSIVE.to_string(),
        Some(TiltReading { direction: Tilt::Center, .. }) => "CENTER".to_string(),
        Some(TiltReading { angle, direction }) => {
            let degrees = f64_to_i32(angle).unwrap_or(0);
            let label = if direction == Tilt::Left { "LEFT" } else { "RIGHT" };
            format!("{label} ({degrees}°)")
        }
    }
}

fn rock_text(rock: Option<Rock>) -> String {
    match rock {
        Some(Rock::Active) => "YES".to_string(),
        Some(Rock::Inactive) => "No".to_string(),
        None => PASSIVE.to_string(),
    }
}

impl HudStatus {
    /// Status describing one pass
    #[must_use]
    pub fn from_classification(classification: &Classification) -> Self {
        let face = classification.face;
        let left = classification.left;
        let right = classification.right;

        Self {
            left_hand: tilt_text(left.and_then(|h| h.tilt)),
            right_hand: tilt_text(right.and_then(|h| h.tilt)),
            mouth: match face.and_then(|f| f.mouth) {
                Some(Mouth::Open) => "OPEN".to_string(),
                Some(Mouth::Closed) => "Closed".to_string(),
                None => PASSIVE.to_string(),
            },
            eye: match face.and_then(|f| f.eye) {
                Some(Eye::Blink) => "BLINK".to_string(),
                Some(Eye::Open) => "Open".to_string(),
                None => PASSIVE.to_string(),
            },
            left_rock: rock_text(left.and_then(|h| h.rock)),
            right_rock: rock_text(right.and_then(|h| h.rock)),
        }
    }

    /// Label/value pairs in display order
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("Left Hand", self.left_hand.as_str()),
            ("Right Hand", self.right_hand.as_str()),
            ("Mouth", self.mouth.as_str()),
            ("Eye", self.eye.as_str()),
            ("Left Rock", self.left_rock.as_str()),
            ("Right Rock", self.right_rock.as_str()),
        ]
    }

    /// Status lines followed by the held keys
    #[must_use]
    pub fn render(&self, active_keys: &[String]) -> String {
        let mut out = self.to_string();
        out.push_str(&format!("ACTIVE KEYS: {}", active_keys.join(" + ")));
        out
    }
}

impl fmt::Display for HudStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.entries() {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{FaceReading, LeftHandReading};

    #[test]
    fn test_default_is_passive() {
        let hud = HudStatus::from_classification(&Classification::default());
        assert_eq!(hud, HudStatus::default());
    }

    #[test]
    fn test_tilt_text_truncates_degrees() {
        let reading = TiltReading {
            angle: -25.7,
            direction: Tilt::Left,
        };
        assert_eq!(tilt_text(Some(reading)), "LEFT (-25°)");
        let reading = TiltReading {
            angle: 3.0,
            direction: Tilt::Center,
        };
        assert_eq!(tilt_text(Some(reading)), "CENTER");
    }

    #[test]
    fn test_render() {
        let classification = Classification {
            face: Some(FaceReading {
                mouth: Some(Mouth::Open),
                eye: Some(Eye::Open),
            }),
            left: Some(LeftHandReading {
                tilt: None,
                rock: Some(Rock::Active),
                spread: None,
            }),
            right: None,
        };
        let text = HudStatus::from_classification(&classification)
            .render(&["CTRL".to_string(), "W".to_string()]);
        assert!(text.contains("Mouth: OPEN\n"));
        assert!(text.contains("Left Rock: YES\n"));
        assert!(text.contains("Right Rock: Passive\n"));
        assert!(text.ends_with("ACTIVE KEYS: CTRL + W"));
    }
}
