//! Translate channel states into key press/release instructions.

use crate::{
    classifier::{Classification, Spread, Throttle, Tilt},
    config::Bindings,
    debounce::Triggers,
    keys::{Key, KeySequence},
};
use std::collections::BTreeSet;

/// One press or release to hand to the key emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAction {
    pub key: Key,
    pub pressed: bool,
}

impl KeyAction {
    #[must_use]
    pub const fn press(key: Key) -> Self {
        Self { key, pressed: true }
    }

    #[must_use]
    pub const fn release(key: Key) -> Self {
        Self { key, pressed: false }
    }
}

/// Press and immediately release every combination, left to right
#[must_use]
pub fn tap(sequence: &KeySequence) -> Vec<KeyAction> {
    let mut actions = Vec::new();
    for combo in sequence.combos() {
        actions.extend(combo.keys().iter().copied().map(KeyAction::press));
        actions.extend(combo.keys().iter().rev().copied().map(KeyAction::release));
    }
    actions
}

/// Press every key of the binding and leave it held
#[must_use]
pub fn hold(sequence: &KeySequence) -> Vec<KeyAction> {
    sequence.keys().map(KeyAction::press).collect()
}

/// Release every key of the binding, last pressed first
#[must_use]
pub fn release(sequence: &KeySequence) -> Vec<KeyAction> {
    let keys: Vec<Key> = sequence.keys().collect();
    keys.into_iter().rev().map(KeyAction::release).collect()
}

/// Resolve one mutually exclusive group.
///
/// Keys of the losing bindings are released first, except those the winner
/// also uses, then the winner is pressed. With no winner every key is released.
#[must_use]
pub fn exclusive(winner: Option<&KeySequence>, losers: &[&KeySequence]) -> Vec<KeyAction> {
    let mut actions: Vec<KeyAction> = losers
        .iter()
        .flat_map(|loser| release(loser))
        .filter(|action| winner.map_or(true, |w| !w.contains(action.key)))
        .collect();
    if let Some(winner) = winner {
        actions.extend(hold(winner));
    }
    actions
}

fn three_way<'a>(
    first: &'a KeySequence,
    second: &'a KeySequence,
    choice: Option<bool>,
) -> Vec<KeyAction> {
    match choice {
        Some(true) => exclusive(Some(first), &[second]),
        Some(false) => exclusive(Some(second), &[first]),
        None => exclusive(None, &[first, second]),
    }
}

fn tilt_group(tilt: Option<Tilt>, left: &KeySequence, right: &KeySequence) -> Vec<KeyAction> {
    let choice = match tilt {
        Some(Tilt::Left) => Some(true),
        Some(Tilt::Right) => Some(false),
        Some(Tilt::Center) | None => None,
    };
    three_way(left, right, choice)
}

fn throttle_group(throttle: Option<Throttle>, forward: &KeySequence, backward: &KeySequence) -> Vec<KeyAction> {
    let choice = match throttle {
        Some(Throttle::Forward) => Some(true),
        Some(Throttle::Backward) => Some(false),
        Some(Throttle::Idle) | None => None,
    };
    three_way(forward, backward, choice)
}

fn without_held_releases(group: Vec<KeyAction>, held: &BTreeSet<Key>) -> Vec<KeyAction> {
    group
        .into_iter()
        .filter(|action| action.pressed || !held.contains(&action.key))
        .collect()
}

/// Every action for one pass.
///
/// Level-triggered groups are re-asserted on every pass. An absent hand
/// resolves exactly like a centered, idle one, so nothing it held stays down.
///
/// Demands are merged into one held set: a group never releases a key that
/// another group holds this pass, and a held key that a tap released is
/// pressed again at the end.
#[must_use]
pub fn resolve(classification: &Classification, triggers: &Triggers, bindings: &Bindings) -> Vec<KeyAction> {
    let left = classification.left;
    let right = classification.right;

    let left_tilt = tilt_group(
        left.and_then(|h| h.tilt).map(|t| t.direction),
        &bindings.left_tilt_left,
        &bindings.left_tilt_right,
    );
    let right_tilt = tilt_group(
        right.and_then(|h| h.tilt).map(|t| t.direction),
        &bindings.right_left,
        &bindings.right_right,
    );
    let throttle = throttle_group(
        right.and_then(|h| h.throttle),
        &bindings.right_forward,
        &bindings.right_backward,
    );

    let held: BTreeSet<Key> = [&left_tilt, &right_tilt, &throttle]
        .into_iter()
        .flatten()
        .filter(|action| action.pressed)
        .map(|action| action.key)
        .collect();

    let mut actions = Vec::new();

    if triggers.mouth {
        actions.extend(tap(&bindings.mouth));
    }
    if triggers.eye {
        actions.extend(tap(&bindings.eye));
    }

    actions.extend(without_held_releases(left_tilt, &held));
    if triggers.left_rock {
        actions.extend(tap(&bindings.left_rock));
    }
    if triggers.left_macro {
        match left.and_then(|h| h.spread) {
            Some(Spread::Spread) => actions.extend(tap(&bindings.left_spread)),
            Some(Spread::Closed) => actions.extend(tap(&bindings.left_closed)),
            Some(Spread::Ineligible) | None => {}
        }
    }

    actions.extend(without_held_releases(right_tilt, &held));
    if triggers.right_rock {
        actions.extend(tap(&bindings.right_rock));
    }
    actions.extend(without_held_releases(throttle, &held));

    for &key in &held {
        let last = actions.iter().rev().find(|action| action.key == key);
        if last.is_some_and(|action| !action.pressed) {
            actions.push(KeyAction::press(key));
        }
    }

    actions
}
