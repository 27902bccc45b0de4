//! Configuration management: thresholds, key assignments and their persistence.
//!
//! Settings are a flat mapping of threshold and binding names, stored as JSON
//! (or YAML when the path ends in `.yaml`/`.yml`). They are compiled into a
//! [`Profile`] whose bindings are already parsed, and published through a
//! [`SharedProfile`] that the classification worker snapshots once per pass.

use crate::{
    constants::{
        DEFAULT_THRESHOLD_EYE, DEFAULT_THRESHOLD_LEFT_SPREAD, DEFAULT_THRESHOLD_MOUTH,
        DEFAULT_THRESHOLD_RIGHT_GAS_BRAKE, DEFAULT_THRESHOLD_TILT,
    },
    keys::{Key, KeySequence},
    Error, Result,
};
use log::{info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Channel sensitivities (ratios, normalized distances and degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Lip gap over face height above which the mouth is open
    #[serde(rename = "threshold_mouth")]
    pub mouth: f64,

    /// Mean eyelid gap below which the eyes count as blinking
    #[serde(rename = "threshold_eye")]
    pub eye: f64,

    /// Degrees the left hand must lean left
    #[serde(rename = "threshold_left_tilt_left")]
    pub left_tilt_left: f64,

    /// Degrees the left hand must lean right
    #[serde(rename = "threshold_left_tilt_right")]
    pub left_tilt_right: f64,

    /// Degrees the right hand must lean left
    #[serde(rename = "threshold_right_tilt_left")]
    pub right_tilt_left: f64,

    /// Degrees the right hand must lean right
    #[serde(rename = "threshold_right_tilt_right")]
    pub right_tilt_right: f64,

    /// Left index/middle fingertip gap that counts as spread
    #[serde(rename = "threshold_left_spread")]
    pub left_spread: f64,

    /// Right index/middle fingertip gap that selects forward over backward
    #[serde(rename = "threshold_right_gas_brake")]
    pub right_gas_brake: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            mouth: DEFAULT_THRESHOLD_MOUTH,
            eye: DEFAULT_THRESHOLD_EYE,
            left_tilt_left: DEFAULT_THRESHOLD_TILT,
            left_tilt_right: DEFAULT_THRESHOLD_TILT,
            right_tilt_left: DEFAULT_THRESHOLD_TILT,
            right_tilt_right: DEFAULT_THRESHOLD_TILT,
            left_spread: DEFAULT_THRESHOLD_LEFT_SPREAD,
            right_gas_brake: DEFAULT_THRESHOLD_RIGHT_GAS_BRAKE,
        }
    }
}

impl Thresholds {
    fn fields_mut(&mut self) -> [(&'static str, &mut f64); 8] {
        [
            ("threshold_mouth", &mut self.mouth),
            ("threshold_eye", &mut self.eye),
            ("threshold_left_tilt_left", &mut self.left_tilt_left),
            ("threshold_left_tilt_right", &mut self.left_tilt_right),
            ("threshold_right_tilt_left", &mut self.right_tilt_left),
            ("threshold_right_tilt_right", &mut self.right_tilt_right),
            ("threshold_left_spread", &mut self.left_spread),
            ("threshold_right_gas_brake", &mut self.right_gas_brake),
        ]
    }
}

/// Binding strings as the user typed them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyAssignments {
    #[serde(rename = "key_mouth")]
    pub mouth: String,
    #[serde(rename = "key_eye")]
    pub eye: String,
    #[serde(rename = "key_left_rock")]
    pub left_rock: String,
    #[serde(rename = "key_right_rock")]
    pub right_rock: String,
    #[serde(rename = "key_left_spread")]
    pub left_spread: String,
    #[serde(rename = "key_left_closed")]
    pub left_closed: String,
    #[serde(rename = "key_left_tilt_l")]
    pub left_tilt_left: String,
    #[serde(rename = "key_left_tilt_r")]
    pub left_tilt_right: String,
    #[serde(rename = "key_right_forward")]
    pub right_forward: String,
    #[serde(rename = "key_right_backward")]
    pub right_backward: String,
    #[serde(rename = "key_right_left")]
    pub right_left: String,
    #[serde(rename = "key_right_right")]
    pub right_right: String,
}

impl Default for KeyAssignments {
    fn default() -> Self {
        Self {
            mouth: "g, end".to_string(),
            eye: "g".to_string(),
            left_rock: "alt+caps_lock".to_string(),
            right_rock: "r".to_string(),
            left_spread: "'".to_string(),
            left_closed: "tab".to_string(),
            left_tilt_left: "ctrl+tab".to_string(),
            left_tilt_right: "e".to_string(),
            right_forward: "w".to_string(),
            right_backward: "s".to_string(),
            right_left: "a".to_string(),
            right_right: "d".to_string(),
        }
    }
}

impl KeyAssignments {
    fn fields_mut(&mut self) -> [(&'static str, &mut String); 12] {
        [
            ("key_mouth", &mut self.mouth),
            ("key_eye", &mut self.eye),
            ("key_left_rock", &mut self.left_rock),
            ("key_right_rock", &mut self.right_rock),
            ("key_left_spread", &mut self.left_spread),
            ("key_left_closed", &mut self.left_closed),
            ("key_left_tilt_l", &mut self.left_tilt_left),
            ("key_left_tilt_r", &mut self.left_tilt_right),
            ("key_right_forward", &mut self.right_forward),
            ("key_right_backward", &mut self.right_backward),
            ("key_right_left", &mut self.right_left),
            ("key_right_right", &mut self.right_right),
        ]
    }

    /// Parse every binding string
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyBinding` naming the first malformed assignment
    pub fn compile(&self) -> Result<Bindings> {
        let parse = |name: &str, value: &str| {
            value
                .parse::<KeySequence>()
                .map_err(|e| Error::KeyBinding(format!("{name}: {e}")))
        };

        Ok(Bindings {
            mouth: parse("key_mouth", &self.mouth)?,
            eye: parse("key_eye", &self.eye)?,
            left_rock: parse("key_left_rock", &self.left_rock)?,
            right_rock: parse("key_right_rock", &self.right_rock)?,
            left_spread: parse("key_left_spread", &self.left_spread)?,
            left_closed: parse("key_left_closed", &self.left_closed)?,
            left_tilt_left: parse("key_left_tilt_l", &self.left_tilt_left)?,
            left_tilt_right: parse("key_left_tilt_r", &self.left_tilt_right)?,
            right_forward: parse("key_right_forward", &self.right_forward)?,
            right_backward: parse("key_right_backward", &self.right_backward)?,
            right_left: parse("key_right_left", &self.right_left)?,
            right_right: parse("key_right_right", &self.right_right)?,
        })
    }
}

/// Parsed key bindings, one per logical action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bindings {
    pub mouth: KeySequence,
    pub eye: KeySequence,
    pub left_rock: KeySequence,
    pub right_rock: KeySequence,
    pub left_spread: KeySequence,
    pub left_closed: KeySequence,
    pub left_tilt_left: KeySequence,
    pub left_tilt_right: KeySequence,
    pub right_forward: KeySequence,
    pub right_backward: KeySequence,
    pub right_left: KeySequence,
    pub right_right: KeySequence,
}

impl Bindings {
    /// Every key any binding can press
    #[must_use]
    pub fn all_keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = [
            &self.mouth,
            &self.eye,
            &self.left_rock,
            &self.right_rock,
            &self.left_spread,
            &self.left_closed,
            &self.left_tilt_left,
            &self.left_tilt_right,
            &self.right_forward,
            &self.right_backward,
            &self.right_left,
            &self.right_right,
        ]
        .into_iter()
        .flat_map(KeySequence::keys)
        .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// User-adjustable settings, persisted as one flat object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(flatten)]
    pub thresholds: Thresholds,

    #[serde(flatten)]
    pub keys: KeyAssignments,
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

impl Settings {
    /// Load settings from a JSON or YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        if is_yaml(path) {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    /// Save settings to a JSON or YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };

        std::fs::write(path, content)?;
        info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Load settings, falling back to defaults instead of failing.
    ///
    /// A missing or unparsable file yields the built-in defaults. Individual
    /// thresholds or bindings that fail validation revert to their default.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(mut settings) => {
                settings.repair();
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Failed to load settings from {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Reset every invalid field to its default value
    fn repair(&mut self) {
        let defaults = Self::default();
        let mut default_thresholds = defaults.thresholds;
        let mut default_keys = defaults.keys;

        for ((name, value), (_, default)) in self
            .thresholds
            .fields_mut()
            .into_iter()
            .zip(default_thresholds.fields_mut())
        {
            if !value.is_finite() || *value < 0.0 {
                warn!("Invalid {} = {}, using default {}", name, value, default);
                *value = *default;
            }
        }

        for ((name, value), (_, default)) in self.keys.fields_mut().into_iter().zip(default_keys.fields_mut()) {
            if let Err(e) = value.parse::<KeySequence>() {
                warn!("Invalid {} = '{}' ({}), using default '{}'", name, value, e, default);
                *value = default.clone();
            }
        }
    }

    /// Validate thresholds and bindings
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for a negative or non-finite threshold, or
    /// `Error::KeyBinding` for an unparsable binding
    pub fn validate(&self) -> Result<()> {
        let mut thresholds = self.thresholds;
        for (name, value) in thresholds.fields_mut() {
            if !value.is_finite() || *value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be a finite, non-negative number, got {value}"
                )));
            }
        }
        self.keys.compile().map(|_| ())
    }

    /// Validate and parse into a ready-to-use profile
    ///
    /// # Errors
    ///
    /// Returns the first validation error
    pub fn compile(&self) -> Result<Profile> {
        self.validate()?;
        Ok(Profile {
            thresholds: self.thresholds,
            bindings: self.keys.compile()?,
            settings: self.clone(),
        })
    }

    /// Change one setting by its flat name, e.g. `threshold_mouth` or `key_eye`
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for unknown names or unparsable numbers, and
    /// the validation error if the new value is rejected
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();

        if let Some((_, slot)) = updated.thresholds.fields_mut().into_iter().find(|(n, _)| *n == name) {
            *slot = value
                .trim()
                .parse::<f64>()
                .map_err(|e| Error::Config(format!("{name}: {e}")))?;
        } else if let Some((_, slot)) = updated.keys.fields_mut().into_iter().find(|(n, _)| *n == name) {
            *slot = value.to_string();
        } else {
            return Err(Error::Config(format!("Unknown setting: {name}")));
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// Settings compiled for the engine
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub thresholds: Thresholds,
    pub bindings: Bindings,
    /// Source settings, kept for saving
    pub settings: Settings,
}

impl Default for Profile {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            thresholds: settings.thresholds,
            bindings: settings
                .keys
                .compile()
                .unwrap_or_default(),
            settings,
        }
    }
}

/// Profile shared between the configuration surface and the worker.
///
/// Readers take an `Arc` snapshot so one pass never sees a half-applied update.
#[derive(Debug, Clone, Default)]
pub struct SharedProfile {
    inner: Arc<RwLock<Arc<Profile>>>,
}

impl SharedProfile {
    #[must_use]
    pub fn new(profile: Profile) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(profile))),
        }
    }

    /// Compile and share `settings`
    ///
    /// # Errors
    ///
    /// Returns the validation error of `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(settings.compile()?))
    }

    /// Current profile
    #[must_use]
    pub fn snapshot(&self) -> Arc<Profile> {
        Arc::clone(&self.inner.read())
    }

    /// Replace the profile with compiled `settings`; the old profile stays in
    /// effect if they are invalid
    ///
    /// # Errors
    ///
    /// Returns the validation error of `settings`
    pub fn update(&self, settings: &Settings) -> Result<()> {
        let profile = Arc::new(settings.compile()?);
        *self.inner.write() = profile;
        Ok(())
    }

    /// Copy of the current settings
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.snapshot().settings.clone()
    }
}

/// Example configuration file content (YAML form)
pub const EXAMPLE_CONFIG: &str = r#"# PhantomCast settings

# Face sensitivity
threshold_mouth: 0.2
threshold_eye: 0.02

# Tilt thresholds (degrees)
threshold_left_tilt_left: 20.0
threshold_left_tilt_right: 20.0
threshold_right_tilt_left: 20.0
threshold_right_tilt_right: 20.0

# Hand gestures
threshold_left_spread: 0.085
threshold_right_gas_brake: 0.045

# Key assignments: comma separates taps, '+' joins a combination
key_mouth: "g, end"
key_eye: "g"
key_left_rock: "alt+caps_lock"
key_right_rock: "r"
key_left_spread: "'"
key_left_closed: "tab"
key_left_tilt_l: "ctrl+tab"
key_left_tilt_r: "e"
key_right_forward: "w"
key_right_backward: "s"
key_right_left: "a"
key_right_right: "d"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_compile() {
        let profile = Settings::default().compile().unwrap();
        assert_eq!(profile.bindings.mouth.combos().len(), 2);
        assert_eq!(profile.thresholds, Thresholds::default());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed: Settings = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn test_flat_json_names() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["threshold_mouth"], 0.2);
        assert_eq!(json["key_left_tilt_l"], "ctrl+tab");
    }

    #[test]
    fn test_unknown_and_missing_keys() {
        let json = r#"{"threshold_mouth": 0.3, "threshold_rock_sens": 0.05, "theme": "dark"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.thresholds.mouth, 0.3);
        assert_eq!(settings.thresholds.eye, DEFAULT_THRESHOLD_EYE);
        assert_eq!(settings.keys, KeyAssignments::default());
    }

    #[test]
    fn test_repair_resets_invalid_fields_only() {
        let mut settings = Settings::default();
        settings.thresholds.eye = -1.0;
        settings.thresholds.mouth = 0.35;
        settings.keys.eye = "ctrl+".to_string();
        settings.keys.mouth = "f".to_string();
        settings.repair();
        assert_eq!(settings.thresholds.eye, DEFAULT_THRESHOLD_EYE);
        assert_eq!(settings.thresholds.mouth, 0.35);
        assert_eq!(settings.keys.eye, "g");
        assert_eq!(settings.keys.mouth, "f");
    }

    #[test]
    fn test_set_field() {
        let mut settings = Settings::default();
        settings.set_field("threshold_left_spread", "0.1").unwrap();
        settings.set_field("key_right_rock", "shift+r").unwrap();
        assert_eq!(settings.thresholds.left_spread, 0.1);
        assert_eq!(settings.keys.right_rock, "shift+r");

        assert!(settings.set_field("threshold_bogus", "1").is_err());
        assert!(settings.set_field("threshold_eye", "abc").is_err());
        assert!(settings.set_field("key_eye", "nonsense").is_err());
        assert_eq!(settings.keys.eye, "g");
    }

    #[test]
    fn test_shared_profile_rejects_invalid_update() {
        let shared = SharedProfile::default();
        let mut settings = shared.settings();
        settings.keys.eye = "+".to_string();
        assert!(shared.update(&settings).is_err());
        assert_eq!(shared.settings().keys.eye, "g");

        settings.keys.eye = "space".to_string();
        shared.update(&settings).unwrap();
        assert!(shared.snapshot().bindings.eye.contains(Key::Space));
    }

    #[test]
    fn test_all_keys_deduplicated() {
        let keys = Profile::default().bindings.all_keys();
        assert!(keys.contains(&Key::Ctrl));
        assert!(keys.contains(&Key::Char('\'')));
        assert_eq!(keys.iter().filter(|k| **k == Key::Char('g')).count(), 1);
    }
}
