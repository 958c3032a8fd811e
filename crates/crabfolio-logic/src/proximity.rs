//! Proximity index: which interactive group the crab is standing next to.
//!
//! Each group is a named cluster of mesh positions. A group's distance is
//! the XZ distance to its closest member; the group with the smallest
//! distance wins, provided it is within the activation radius.
//!
//! [`InteractTrigger`] turns the held interact key into discrete
//! activations (rising edge, with a per-hold "already activated" guard).

use serde::{Deserialize, Serialize};

use crate::constants::interaction;
use crate::geometry::Vec3;

/// Interaction tuning shared by the session engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub activation_radius: f32,
    pub unlock_poll_seconds: f32,
    pub idle_seconds: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            activation_radius: interaction::ACTIVATION_RADIUS,
            unlock_poll_seconds: interaction::UNLOCK_POLL_SECONDS,
            idle_seconds: interaction::IDLE_SECONDS,
        }
    }
}

/// A named cluster of mesh positions sharing one interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveGroup {
    pub key: String,
    pub members: Vec<Vec3>,
    /// Disabled groups are invisible to selection (e.g. a locked door).
    pub enabled: bool,
}

impl InteractiveGroup {
    pub fn new(key: impl Into<String>, members: Vec<Vec3>) -> Self {
        Self {
            key: key.into(),
            members,
            enabled: true,
        }
    }

    /// XZ distance from `origin` to the closest member; `None` if empty.
    pub fn distance_from(&self, origin: Vec3) -> Option<f32> {
        self.members
            .iter()
            .map(|m| origin.distance_xz(m))
            .fold(None, |best, d| match best {
                Some(b) if b <= d => Some(b),
                _ => Some(d),
            })
    }
}

/// The group chosen by [`ProximityIndex::nearest`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub key: String,
    pub distance: f32,
}

/// Static catalog of interactive groups plus the activation radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityIndex {
    groups: Vec<InteractiveGroup>,
    activation_radius: f32,
}

impl ProximityIndex {
    pub fn new(groups: Vec<InteractiveGroup>, activation_radius: f32) -> Self {
        Self {
            groups,
            activation_radius,
        }
    }

    pub fn with_default_radius(groups: Vec<InteractiveGroup>) -> Self {
        Self::new(groups, interaction::ACTIVATION_RADIUS)
    }

    /// Nearest enabled group within the activation radius.
    ///
    /// Ties keep the group listed first. A group exactly at the radius is
    /// still selected.
    pub fn nearest(&self, origin: Vec3) -> Option<Selection> {
        let mut best: Option<(&InteractiveGroup, f32)> = None;
        for group in self.groups.iter().filter(|g| g.enabled) {
            let Some(d) = group.distance_from(origin) else {
                continue;
            };
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((group, d));
            }
        }
        match best {
            Some((group, distance)) if distance <= self.activation_radius => Some(Selection {
                key: group.key.clone(),
                distance,
            }),
            _ => None,
        }
    }

    /// Enable or disable a group. Returns false if no group has that key.
    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> bool {
        match self.groups.iter_mut().find(|g| g.key == key) {
            Some(g) => {
                g.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn group(&self, key: &str) -> Option<&InteractiveGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn groups(&self) -> &[InteractiveGroup] {
        &self.groups
    }

    pub fn activation_radius(&self) -> f32 {
        self.activation_radius
    }
}

/// Emissive emphasis applied to a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub color: u32,
    pub intensity: f32,
}

impl Highlight {
    pub const NONE: Self = Self {
        color: 0x000000,
        intensity: 0.0,
    };

    pub const SELECTED: Self = Self {
        color: interaction::HIGHLIGHT_COLOR,
        intensity: interaction::HIGHLIGHT_INTENSITY,
    };

    pub fn is_active(&self) -> bool {
        self.intensity > 0.0
    }

    /// Emphasis for a member of `group_key` given the current selection.
    pub fn for_group(group_key: &str, selected: Option<&str>) -> Self {
        if selected == Some(group_key) {
            Self::SELECTED
        } else {
            Self::NONE
        }
    }
}

impl Default for Highlight {
    fn default() -> Self {
        Self::NONE
    }
}

/// Edge detector for the interact key.
///
/// - A press (released → pressed) over a selected group fires it.
/// - While the key stays held, the activated group does not fire again,
///   but moving onto a *different* group fires that one.
/// - Releasing clears the guard, so release → press over the same group
///   fires again.
#[derive(Debug, Clone, Default)]
pub struct InteractTrigger {
    was_pressed: bool,
    last_activated: Option<String>,
}

impl InteractTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this tick's key state and selection; returns the group to activate.
    pub fn update(&mut self, pressed: bool, selected: Option<&str>) -> Option<String> {
        let mut fired = None;
        if pressed {
            if let Some(key) = selected {
                let rising = !self.was_pressed;
                let moved_on = self.last_activated.as_deref().is_some_and(|last| last != key);
                if rising || moved_on {
                    fired = Some(key.to_string());
                    self.last_activated = Some(key.to_string());
                }
            }
        } else {
            self.last_activated = None;
        }
        self.was_pressed = pressed;
        fired
    }

    pub fn last_activated(&self) -> Option<&str> {
        self.last_activated.as_deref()
    }
}
