//! Key emission and the set of currently held keys.
//!
//! The [`KeyInjector`] trait is the boundary to whatever synthesizes input at
//! the OS level. Injection is best effort: [`KeyEmitter`] logs failures and
//! carries on with the next key, it never aborts a pass.

use crate::{
    constants::SAFETY_SWEEP_KEYS,
    keys::Key,
    resolver::KeyAction,
    Result,
};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Synthesizes key presses and releases
pub trait KeyInjector: Send {
    /// Press `key`; pressing an already held key is not an error
    fn press(&mut self, key: Key) -> Result<()>;

    /// Release `key`; releasing a key that is not held is not an error
    fn release(&mut self, key: Key) -> Result<()>;
}

impl KeyInjector for Box<dyn KeyInjector> {
    fn press(&mut self, key: Key) -> Result<()> {
        (**self).press(key)
    }

    fn release(&mut self, key: Key) -> Result<()> {
        (**self).release(key)
    }
}

/// Injector that only logs, for dry runs
#[derive(Debug, Default)]
pub struct LogInjector;

impl KeyInjector for LogInjector {
    fn press(&mut self, key: Key) -> Result<()> {
        info!("press {}", key);
        Ok(())
    }

    fn release(&mut self, key: Key) -> Result<()> {
        debug!("release {}", key);
        Ok(())
    }
}

/// A key event seen by a [`RecordingInjector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Press(Key),
    Release(Key),
}

/// Injector that records every call into a shared log
#[derive(Debug, Clone, Default)]
pub struct RecordingInjector {
    events: Arc<Mutex<Vec<KeyEvent>>>,
}

impl RecordingInjector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event so far
    #[must_use]
    pub fn events(&self) -> Vec<KeyEvent> {
        self.events.lock().clone()
    }

    /// Drain the log
    pub fn take(&self) -> Vec<KeyEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl KeyInjector for RecordingInjector {
    fn press(&mut self, key: Key) -> Result<()> {
        self.events.lock().push(KeyEvent::Press(key));
        Ok(())
    }

    fn release(&mut self, key: Key) -> Result<()> {
        self.events.lock().push(KeyEvent::Release(key));
        Ok(())
    }
}

/// Keys released unconditionally by the safety sweep
#[must_use]
pub fn safety_sweep_keys() -> Vec<Key> {
    SAFETY_SWEEP_KEYS
        .iter()
        .filter_map(|name| name.parse().ok())
        .collect()
}

/// Owns the injector and tracks which keys are held
pub struct KeyEmitter<I: KeyInjector> {
    injector: I,
    active: BTreeSet<Key>,
}

impl<I: KeyInjector> KeyEmitter<I> {
    #[must_use]
    pub fn new(injector: I) -> Self {
        Self {
            injector,
            active: BTreeSet::new(),
        }
    }

    /// Press `key`, marking it held if the injector accepted it
    pub fn press(&mut self, key: Key) {
        match self.injector.press(key) {
            Ok(()) => {
                if self.active.insert(key) {
                    debug!("{} down", key);
                }
            }
            Err(e) => warn!("Failed to press {}: {}", key, e),
        }
    }

    /// Release `key`. The injection is attempted even for keys not tracked as
    /// held, and the key leaves the held set whatever the outcome.
    pub fn release(&mut self, key: Key) {
        if let Err(e) = self.injector.release(key) {
            warn!("Failed to release {}: {}", key, e);
        }
        if self.active.remove(&key) {
            debug!("{} up", key);
        }
    }

    pub fn apply(&mut self, actions: &[KeyAction]) {
        for action in actions {
            if action.pressed {
                self.press(action.key);
            } else {
                self.release(action.key);
            }
        }
    }

    /// Release the fixed safety set, every held key and `extra`, then clear
    /// the held set
    pub fn release_all(&mut self, extra: &[Key]) {
        let mut keys: BTreeSet<Key> = safety_sweep_keys().into_iter().collect();
        keys.extend(self.active.iter().copied());
        keys.extend(extra.iter().copied());

        for key in keys {
            if let Err(e) = self.injector.release(key) {
                warn!("Failed to release {} during safety sweep: {}", key, e);
            }
        }
        self.active.clear();
    }

    #[must_use]
    pub fn is_active(&self, key: Key) -> bool {
        self.active.contains(&key)
    }

    /// Held keys in canonical order
    #[must_use]
    pub fn active_keys(&self) -> Vec<Key> {
        self.active.iter().copied().collect()
    }

    /// Display names of held keys
    #[must_use]
    pub fn active_names(&self) -> Vec<String> {
        self.active.iter().map(|key| key.canonical_name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct FailingInjector {
        fail_on: Key,
        calls: usize,
    }

    impl KeyInjector for FailingInjector {
        fn press(&mut self, key: Key) -> Result<()> {
            self.calls += 1;
            if key == self.fail_on {
                Err(Error::Injection(format!("cannot press {key}")))
            } else {
                Ok(())
            }
        }

        fn release(&mut self, key: Key) -> Result<()> {
            self.calls += 1;
            if key == self.fail_on {
                Err(Error::Injection(format!("cannot release {key}")))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_press_is_idempotent() {
        let recorder = RecordingInjector::new();
        let mut emitter = KeyEmitter::new(recorder.clone());
        emitter.press(Key::Char('w'));
        emitter.press(Key::Char('w'));
        assert_eq!(emitter.active_keys(), vec![Key::Char('w')]);
        assert_eq!(recorder.events().len(), 2);
    }

    #[test]
    fn test_release_of_unpressed_key_is_still_attempted() {
        let recorder = RecordingInjector::new();
        let mut emitter = KeyEmitter::new(recorder.clone());
        emitter.release(Key::Char('s'));
        assert_eq!(recorder.events(), vec![KeyEvent::Release(Key::Char('s'))]);
        assert!(emitter.active_keys().is_empty());
    }

    #[test]
    fn test_failures_are_swallowed() {
        let mut emitter = KeyEmitter::new(FailingInjector {
            fail_on: Key::Ctrl,
            calls: 0,
        });
        emitter.apply(&[
            KeyAction::press(Key::Ctrl),
            KeyAction::press(Key::Tab),
            KeyAction::release(Key::Char('x')),
        ]);
        assert_eq!(emitter.injector.calls, 3);
        assert!(!emitter.is_active(Key::Ctrl));
        assert!(emitter.is_active(Key::Tab));
    }

    #[test]
    fn test_failed_release_still_clears_tracking() {
        let mut emitter = KeyEmitter::new(FailingInjector {
            fail_on: Key::Alt,
            calls: 0,
        });
        emitter.active.insert(Key::Alt);
        emitter.release(Key::Alt);
        assert!(!emitter.is_active(Key::Alt));
    }

    #[test]
    fn test_release_all_covers_safety_set_and_extras() {
        let recorder = RecordingInjector::new();
        let mut emitter = KeyEmitter::new(recorder.clone());
        emitter.press(Key::Enter);
        recorder.take();

        emitter.release_all(&[Key::Esc]);

        let released: Vec<Key> = recorder
            .events()
            .into_iter()
            .filter_map(|e| match e {
                KeyEvent::Release(k) => Some(k),
                KeyEvent::Press(_) => None,
            })
            .collect();
        for key in safety_sweep_keys() {
            assert!(released.contains(&key), "{key} not released");
        }
        assert!(released.contains(&Key::Enter));
        assert!(released.contains(&Key::Esc));
        assert!(emitter.active_keys().is_empty());
    }

    #[test]
    fn test_active_names() {
        let mut emitter = KeyEmitter::new(RecordingInjector::new());
        emitter.press(Key::Char('w'));
        emitter.press(Key::Ctrl);
        assert_eq!(emitter.active_names(), vec!["CTRL".to_string(), "W".to_string()]);
    }

    #[test]
    fn test_safety_sweep_keys_all_parse() {
        assert_eq!(safety_sweep_keys().len(), SAFETY_SWEEP_KEYS.len());
    }
}
