//! Key events to per-frame lane masks.

pub mod bindings;

pub use self::bindings::KeyBindings;

use self::bindings::normalize_key;

use crate::models::engine::{ActionKey, Lane};
use crate::models::settings::KeybindSettings;
use std::collections::HashMap;

/// Tracks which bound keys are held and which lanes went down since the
/// last frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub bindings: KeyBindings,
    /// Held keys and the lane each one drives.
    held: HashMap<String, Lane>,
    pressed: ActionKey,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashMap::new(),
            pressed: ActionKey::empty(),
        }
    }

    pub fn from_settings(settings: &KeybindSettings) -> Self {
        Self::new(KeyBindings::from_settings(settings))
    }

    /// Registers a key press. Auto-repeat of an already held key is ignored.
    /// Returns the lane the key drives, if bound.
    pub fn key_down(&mut self, key: &str) -> Option<Lane> {
        let lane = self.bindings.resolve(key)?;
        if self.held.insert(normalize_key(key), lane).is_none() {
            self.pressed |= lane.key();
        }
        Some(lane)
    }

    /// Registers a key release.
    pub fn key_up(&mut self, key: &str) -> Option<Lane> {
        self.held.remove(&normalize_key(key))
    }

    /// Lanes with at least one bound key held.
    pub fn down(&self) -> ActionKey {
        self.held
            .values()
            .fold(ActionKey::empty(), |acc, lane| acc | lane.key())
    }

    /// Returns `(pressed, down)` for the frame and starts a new one.
    ///
    /// A key pressed and released within the same frame still shows up in
    /// `pressed`.
    pub fn frame(&mut self) -> (ActionKey, ActionKey) {
        let pressed = std::mem::take(&mut self.pressed);
        (pressed, self.down())
    }

    /// Forgets every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
        self.pressed = ActionKey::empty();
    }
}
