//! Keyboard layouts, held-key state and joystick conversion.
//!
//! Key names follow DOM `KeyboardEvent.key` strings (`"w"`, `"ArrowUp"`,
//! `" "`, `"Escape"`). Layout only changes which letters drive movement;
//! arrows, interact and escape are shared.

use serde::{Deserialize, Serialize};

use crate::constants::interaction::JOYSTICK_DEAD_ZONE;
use crate::geometry::Vec3;
use crate::movement::MoveInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardLayout {
    #[default]
    Qwerty,
    Azerty,
}

/// Logical control bound to one or more keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Interact,
    Escape,
    Map,
}

struct KeyMap {
    forward: &'static [&'static str],
    backward: &'static [&'static str],
    left: &'static [&'static str],
    right: &'static [&'static str],
}

const QWERTY: KeyMap = KeyMap {
    forward: &["w", "W", "ArrowUp"],
    backward: &["s", "S", "ArrowDown"],
    left: &["a", "A", "ArrowLeft"],
    right: &["d", "D", "ArrowRight"],
};

const AZERTY: KeyMap = KeyMap {
    forward: &["z", "Z", "ArrowUp"],
    backward: &["s", "S", "ArrowDown"],
    left: &["q", "Q", "ArrowLeft"],
    right: &["d", "D", "ArrowRight"],
};

const INTERACT_KEYS: &[&str] = &["e", "E", " "];
const ESCAPE_KEYS: &[&str] = &["Escape"];
const MAP_KEYS: &[&str] = &["m", "M"];

impl KeyboardLayout {
    fn key_map(&self) -> &'static KeyMap {
        match self {
            KeyboardLayout::Qwerty => &QWERTY,
            KeyboardLayout::Azerty => &AZERTY,
        }
    }

    /// Action bound to `key` under this layout, if any.
    pub fn action_for(&self, key: &str) -> Option<Action> {
        let map = self.key_map();
        if map.forward.contains(&key) {
            Some(Action::Forward)
        } else if map.backward.contains(&key) {
            Some(Action::Backward)
        } else if map.left.contains(&key) {
            Some(Action::Left)
        } else if map.right.contains(&key) {
            Some(Action::Right)
        } else if INTERACT_KEYS.contains(&key) {
            Some(Action::Interact)
        } else if ESCAPE_KEYS.contains(&key) {
            Some(Action::Escape)
        } else if MAP_KEYS.contains(&key) {
            Some(Action::Map)
        } else {
            None
        }
    }
}

/// Which actions are currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub interact: bool,
    pub escape: bool,
    pub map: bool,
}

impl KeyboardState {
    fn slot(&mut self, action: Action) -> &mut bool {
        match action {
            Action::Forward => &mut self.forward,
            Action::Backward => &mut self.backward,
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Interact => &mut self.interact,
            Action::Escape => &mut self.escape,
            Action::Map => &mut self.map,
        }
    }

    /// Returns the action the key mapped to.
    pub fn key_down(&mut self, layout: KeyboardLayout, key: &str) -> Option<Action> {
        let action = layout.action_for(key)?;
        *self.slot(action) = true;
        Some(action)
    }

    pub fn key_up(&mut self, layout: KeyboardLayout, key: &str) -> Option<Action> {
        let action = layout.action_for(key)?;
        *self.slot(action) = false;
        Some(action)
    }

    /// Release everything (window lost focus).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn move_input(&self, joystick: Option<Vec3>) -> MoveInput {
        MoveInput {
            forward: self.forward,
            backward: self.backward,
            left: self.left,
            right: self.right,
            joystick,
        }
    }
}

/// Convert a raw joystick reading (`x` right, `y` up, both in [-1, 1]) to
/// a ground-plane direction. Readings inside the dead zone yield `None`,
/// handing control back to the keyboard.
pub fn joystick_direction(x: f32, y: f32) -> Option<Vec3> {
    if x.abs() < JOYSTICK_DEAD_ZONE && y.abs() < JOYSTICK_DEAD_ZONE {
        return None;
    }
    Some(Vec3::new(x, 0.0, -y))
}
