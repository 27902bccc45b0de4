//! Constants used throughout the application

use std::time::Duration;

/// Number of landmarks in a hand set
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Hand landmark indices
pub const WRIST: usize = 0;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Fingertips paired with the joint they must rise above to count as extended
pub const FINGER_TIP_JOINTS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

/// Extended fingers needed before the spread macro or gas/brake engage
pub const MIN_EXTENDED_FINGERS: usize = 3;

/// Face mesh landmark indices
pub const FACE_FOREHEAD: usize = 10;
pub const FACE_UPPER_LIP: usize = 13;
pub const FACE_LOWER_LIP: usize = 14;
pub const FACE_CHIN: usize = 152;
pub const FACE_LEFT_EYE_UPPER: usize = 159;
pub const FACE_LEFT_EYE_LOWER: usize = 145;
pub const FACE_RIGHT_EYE_UPPER: usize = 386;
pub const FACE_RIGHT_EYE_LOWER: usize = 374;

/// Default thresholds
pub const DEFAULT_THRESHOLD_MOUTH: f64 = 0.20;
pub const DEFAULT_THRESHOLD_EYE: f64 = 0.02;
pub const DEFAULT_THRESHOLD_TILT: f64 = 20.0;
pub const DEFAULT_THRESHOLD_LEFT_SPREAD: f64 = 0.085;
pub const DEFAULT_THRESHOLD_RIGHT_GAS_BRAKE: f64 = 0.045;

/// Period of the frame producer loop
pub const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Period of the classification loop
pub const CLASSIFY_INTERVAL: Duration = Duration::from_millis(10);

/// Default pacing of recorded landmark playback
pub const DEFAULT_REPLAY_FPS: f64 = 30.0;

/// Default settings file name
pub const DEFAULT_SETTINGS_FILE: &str = "phantomcast_settings.json";

/// Key names released unconditionally when the engine stops
pub const SAFETY_SWEEP_KEYS: [&str; 16] = [
    "ctrl", "shift", "alt", "tab", "space", "end", "caps_lock", "w", "a", "s", "d", "e", "g", "f", "r", "'",
];
