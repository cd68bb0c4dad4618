//! Keys the maze reacts to, and per-frame keyboard state.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every frame the key
//!   is physically down. Movement reads this, so holding a direction keeps the
//!   player sliding cell after cell.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   frame the transition happened. Cleared by `end_frame()`, which the driver
//!   calls after the frame's update has consumed them. The action key reads
//!   this, so one physical press toggles a switch exactly once.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
    Space,
    Enter,
    Escape,
}

impl Key {
    pub const ALL: &'static [Key] = &[
        Key::ArrowUp,
        Key::ArrowDown,
        Key::ArrowLeft,
        Key::ArrowRight,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::Space,
        Key::Enter,
        Key::Escape,
    ];
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// True if any key in `keys` is held. Used for multi-key bindings.
    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.is_held(*key))
    }

    pub fn any_just_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.is_just_pressed(*key))
    }

    /// True if any key at all went down this frame.
    pub fn has_any_just_pressed(&self) -> bool {
        !self.just_pressed.is_empty()
    }

    /// Currently held keys in a stable order.
    pub fn held_keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.held.iter().copied().collect();
        keys.sort();
        keys
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
