//! End-to-end engine passes over synthetic landmark frames


use phantomcast::{
    classifier::classify,
    config::{SharedProfile, Thresholds},
    emitter::{KeyEvent, RecordingInjector},
    engine::{EngineState, GestureEngine},
    hud::HudStatus,
    keys::Key,
    landmarks::{Handedness, LandmarkFrame},
};
use test_helpers::*;

fn running_engine() -> (GestureEngine<RecordingInjector>, RecordingInjector) {
    let injector = RecordingInjector::new();
    let mut engine = GestureEngine::new(injector.clone(), SharedProfile::default());
    engine.start();
    (engine, injector)
}

fn presses(events: &[KeyEvent], key: Key) -> usize {
    events.iter().filter(|e| **e == KeyEvent::Press(key)).count()
}

const A: Key = Key::Char('a');
const D: Key = Key::Char('d');
const W: Key = Key::Char('w');
const S: Key = Key::Char('s');
const E: Key = Key::Char('e');
const G: Key = Key::Char('g');

#[test]
fn test_stopped_engine_emits_nothing() {
    let injector = RecordingInjector::new();
    let mut engine = GestureEngine::new(injector.clone(), SharedProfile::default());
    let actions = engine.process(&hands(vec![tilted(open_hand(Handedness::Right, WIDE), -35.0)]));
    assert!(actions.is_empty());
    assert!(injector.events().is_empty());
    assert_eq!(engine.state(), EngineState::Stopped);
}

#[test]
fn test_right_hand_steering_and_gas() {
    let (mut engine, _injector) = running_engine();

    engine.process(&hands(vec![tilted(open_hand(Handedness::Right, WIDE), -35.0)]));
    let held = engine.active_keys();
    assert!(held.contains(&A));
    assert!(held.contains(&W));
    assert!(!held.contains(&D));
    assert!(!held.contains(&S));

    engine.process(&hands(vec![tilted(open_hand(Handedness::Right, NARROW), 35.0)]));
    let held = engine.active_keys();
    assert!(held.contains(&D));
    assert!(held.contains(&S));
    assert!(!held.contains(&A));
    assert!(!held.contains(&W));
}

#[test]
fn test_tilt_keys_never_held_together() {
    let (mut engine, _injector) = running_engine();

    for degrees in [-40.0, -10.0, 30.0, -30.0, 0.0, 50.0, -50.0] {
        engine.process(&hands(vec![
            tilted(open_hand(Handedness::Left, 0.06), degrees),
            tilted(fist(Handedness::Right), degrees),
        ]));
        let held = engine.active_keys();
        assert!(!(held.contains(&A) && held.contains(&D)), "at {degrees} degrees");
        assert!(!(held.contains(&Key::Tab) && held.contains(&E)), "at {degrees} degrees");
    }
}

#[test]
fn test_centered_hand_releases_tilt_keys() {
    let (mut engine, _injector) = running_engine();

    engine.process(&hands(vec![tilted(fist(Handedness::Right), 35.0)]));
    assert!(engine.active_keys().contains(&D));

    engine.process(&hands(vec![fist(Handedness::Right)]));
    assert!(engine.active_keys().is_empty());
}

#[test]
fn test_lost_hand_releases_its_keys() {
    let (mut engine, _injector) = running_engine();

    engine.process(&hands(vec![
        tilted(open_hand(Handedness::Left, 0.06), -35.0),
        tilted(open_hand(Handedness::Right, WIDE), 35.0),
    ]));
    assert!(engine.active_keys().contains(&Key::Ctrl));
    assert!(engine.active_keys().contains(&W));

    engine.process(&LandmarkFrame::empty());
    assert!(engine.active_keys().is_empty());
}

#[test]
fn test_repeated_frame_is_idempotent() {
    let (mut engine, _injector) = running_engine();
    let steady = hands(vec![tilted(open_hand(Handedness::Right, WIDE), -35.0)]);

    let thresholds = Thresholds::default();
    assert_eq!(classify(&steady, &thresholds), classify(&steady, &thresholds));

    let first_actions = engine.process(&steady);
    let first = engine.active_keys();
    for _ in 0..2 {
        assert_eq!(engine.process(&steady), first_actions);
        assert_eq!(engine.active_keys(), first);
    }
}

#[test]
fn test_closed_macro_keeps_tilt_keys_held() {
    let (mut engine, injector) = running_engine();
    let tilted_closed = hands(vec![tilted(open_hand(Handedness::Left, 0.04), -35.0)]);

    engine.process(&tilted_closed);
    let held = engine.active_keys();
    assert!(held.contains(&Key::Ctrl));
    assert!(held.contains(&Key::Tab));

    // Later passes only re-assert the hold, no extra Tab taps
    let taps_before = injector.events().iter().filter(|e| **e == KeyEvent::Release(Key::Tab)).count();
    engine.process(&tilted_closed);
    engine.process(&tilted_closed);
    let taps_after = injector.events().iter().filter(|e| **e == KeyEvent::Release(Key::Tab)).count();
    assert_eq!(taps_before, taps_after);
    assert!(engine.active_keys().contains(&Key::Tab));
}

#[test]
fn test_mouth_taps_once_per_opening() {
    let (mut engine, injector) = running_engine();

    for _ in 0..4 {
        engine.process(&frame(vec![], Some(open_mouth())));
    }
    assert_eq!(presses(&injector.events(), G), 1);
    assert_eq!(presses(&injector.events(), Key::End), 1);

    engine.process(&frame(vec![], Some(neutral_face())));
    engine.process(&frame(vec![], Some(open_mouth())));
    assert_eq!(presses(&injector.events(), G), 2);

    // Taps are never left held
    assert!(engine.active_keys().is_empty());
}

#[test]
fn test_face_loss_rearms_mouth() {
    let (mut engine, injector) = running_engine();

    engine.process(&frame(vec![], Some(open_mouth())));
    engine.process(&LandmarkFrame::empty());
    engine.process(&frame(vec![], Some(open_mouth())));
    assert_eq!(presses(&injector.events(), G), 2);
}

#[test]
fn test_blink_and_mouth_are_independent() {
    let (mut engine, injector) = running_engine();

    engine.process(&frame(vec![], Some(blinking_face())));
    engine.process(&frame(vec![], Some(face(0.18, 0.005))));
    engine.process(&frame(vec![], Some(face(0.18, 0.005))));

    let events = injector.events();
    // One tap from the blink, one from the mouth
    assert_eq!(presses(&events, G), 2);
    assert_eq!(presses(&events, Key::End), 1);
}

#[test]
fn test_rock_sign_fires_per_occurrence() {
    let (mut engine, injector) = running_engine();

    for _ in 0..3 {
        engine.process(&hands(vec![rock_hand(Handedness::Left)]));
    }
    assert_eq!(presses(&injector.events(), Key::CapsLock), 1);
    assert_eq!(presses(&injector.events(), Key::Alt), 1);

    engine.process(&hands(vec![open_hand(Handedness::Left, 0.06)]));
    engine.process(&hands(vec![rock_hand(Handedness::Left)]));
    assert_eq!(presses(&injector.events(), Key::CapsLock), 2);
    assert!(!engine.active_keys().contains(&Key::CapsLock));
}

#[test]
fn test_right_rock_taps_r() {
    let (mut engine, injector) = running_engine();
    engine.process(&hands(vec![rock_hand(Handedness::Right)]));
    engine.process(&hands(vec![rock_hand(Handedness::Right)]));
    assert_eq!(presses(&injector.events(), Key::Char('r')), 1);
}

#[test]
fn test_spread_macro_fires_on_eligibility() {
    let (mut engine, injector) = running_engine();

    engine.process(&hands(vec![open_hand(Handedness::Left, WIDE)]));
    assert_eq!(presses(&injector.events(), Key::Char('\'')), 1);

    // Still eligible, so switching to closed does not re-fire
    engine.process(&hands(vec![open_hand(Handedness::Left, 0.04)]));
    assert_eq!(presses(&injector.events(), Key::Tab), 0);

    engine.process(&hands(vec![fist(Handedness::Left)]));
    engine.process(&hands(vec![open_hand(Handedness::Left, 0.04)]));
    assert_eq!(presses(&injector.events(), Key::Tab), 1);
}

#[test]
fn test_stop_releases_everything() {
    let (mut engine, injector) = running_engine();

    engine.process(&hands(vec![
        tilted(open_hand(Handedness::Left, 0.06), -35.0),
        tilted(open_hand(Handedness::Right, WIDE), -35.0),
    ]));
    assert!(!engine.active_keys().is_empty());
    injector.take();

    engine.stop();
    assert!(engine.active_keys().is_empty());
    assert_eq!(engine.state(), EngineState::Stopped);

    let events = injector.events();
    for key in [Key::Ctrl, Key::Tab, A, W, S, D, E, G, Key::Alt, Key::CapsLock, Key::End, Key::Char('\'')] {
        assert!(events.contains(&KeyEvent::Release(key)), "{key} not released");
    }
    assert!(events.iter().all(|e| matches!(e, KeyEvent::Release(_))));
}

#[test]
fn test_stop_rearms_latches() {
    let (mut engine, injector) = running_engine();

    engine.process(&frame(vec![], Some(open_mouth())));
    engine.toggle();
    engine.toggle();
    engine.process(&frame(vec![], Some(open_mouth())));
    assert_eq!(presses(&injector.events(), G), 2);
}

#[test]
fn test_hud_tracks_channels() {
    let (mut engine, _injector) = running_engine();

    engine.process(&frame(
        vec![tilted(open_hand(Handedness::Right, WIDE), 35.0)],
        Some(open_mouth()),
    ));
    let rendered = engine.hud().render(&engine.active_names());
    assert!(rendered.contains("Mouth: OPEN"));
    assert!(rendered.ends_with("ACTIVE KEYS: D + W"));

    engine.stop();
    assert_eq!(engine.hud(), &HudStatus::default());
}
