//! Gesture engine: one classification and emission pass per frame.

use crate::{
    classifier::classify,
    config::SharedProfile,
    debounce::DebounceRegistry,
    emitter::{KeyEmitter, KeyInjector},
    hud::HudStatus,
    keys::Key,
    landmarks::LandmarkFrame,
    resolver::{resolve, KeyAction},
};
use log::{debug, info};

/// Whether passes are being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
}

/// Orchestrates classification, debouncing, resolution and emission
pub struct GestureEngine<I: KeyInjector> {
    state: EngineState,
    profile: SharedProfile,
    debounce: DebounceRegistry,
    emitter: KeyEmitter<I>,
    hud: HudStatus,
}

impl<I: KeyInjector> GestureEngine<I> {
    /// Create a stopped engine
    #[must_use]
    pub fn new(injector: I, profile: SharedProfile) -> Self {
        Self {
            state: EngineState::Stopped,
            profile,
            debounce: DebounceRegistry::new(),
            emitter: KeyEmitter::new(injector),
            hud: HudStatus::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn start(&mut self) {
        if self.state == EngineState::Stopped {
            info!("Gesture engine started");
            self.state = EngineState::Running;
        }
    }

    /// Stop and release every key that could be held.
    ///
    /// The sweep runs even if the engine was already stopped.
    pub fn stop(&mut self) {
        if self.state == EngineState::Running {
            info!("Gesture engine stopped");
        }
        self.state = EngineState::Stopped;

        let bound: Vec<Key> = self.profile.snapshot().bindings.all_keys();
        self.emitter.release_all(&bound);
        self.debounce.reset();
        self.hud = HudStatus::default();
    }

    /// Flip between running and stopped, returning the new state
    pub fn toggle(&mut self) -> EngineState {
        match self.state {
            EngineState::Stopped => self.start(),
            EngineState::Running => self.stop(),
        }
        self.state
    }

    /// Run one pass over `frame` and return the actions emitted.
    ///
    /// Does nothing while stopped.
    pub fn process(&mut self, frame: &LandmarkFrame) -> Vec<KeyAction> {
        if self.state != EngineState::Running {
            return Vec::new();
        }

        let profile = self.profile.snapshot();
        let classification = classify(frame, &profile.thresholds);
        let triggers = self.debounce.evaluate(&classification);
        let actions = resolve(&classification, &triggers, &profile.bindings);

        self.emitter.apply(&actions);

        let hud = HudStatus::from_classification(&classification);
        if hud != self.hud {
            debug!("Status changed: {:?}", hud);
            self.hud = hud;
        }

        actions
    }

    #[must_use]
    pub fn hud(&self) -> &HudStatus {
        &self.hud
    }

    #[must_use]
    pub fn active_keys(&self) -> Vec<Key> {
        self.emitter.active_keys()
    }

    #[must_use]
    pub fn active_names(&self) -> Vec<String> {
        self.emitter.active_names()
    }

    #[must_use]
    pub fn profile(&self) -> &SharedProfile {
        &self.profile
    }
}
