//! Unlock evaluator: cosmetic accessories and the conditions that grant them.
//!
//! Every accessory has exactly one [`UnlockCondition`]:
//! - `DiscoverAll`: granted once the discovery set is at least as large as the catalog
//! - `External`: granted directly by a collaborator (terminal easter egg,
//!   identity-query counter); the evaluator never computes it
//!
//! The registry is a ratchet: an unlocked accessory stays unlocked.
//! [`UnlockPoller`] drives the periodic re-check that backs up the
//! check-on-discovery path.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::interaction::UNLOCK_POLL_SECONDS;
use crate::discovery::DiscoverySet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessoryId {
    HatPokemon,
    HatCrisis,
}

impl AccessoryId {
    pub const ALL: [AccessoryId; 2] = [AccessoryId::HatPokemon, AccessoryId::HatCrisis];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessoryId::HatPokemon => "hat-pokemon",
            AccessoryId::HatCrisis => "hat-crisis",
        }
    }

    pub fn def(&self) -> &'static AccessoryDef {
        match self {
            AccessoryId::HatPokemon => &HAT_POKEMON,
            AccessoryId::HatCrisis => &HAT_CRISIS,
        }
    }
}

impl fmt::Display for AccessoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessoryId {
    type Err = UnlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessoryId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnlockError::UnknownAccessory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockCondition {
    DiscoverAll,
    External,
}

/// Where the accessory sits on the crab's head bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: f32,
}

/// Static description of one accessory, resolved at definition time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccessoryDef {
    pub id: AccessoryId,
    pub asset: &'static str,
    pub condition: UnlockCondition,
    pub placement: Placement,
    /// Hex color applied to every material of the asset.
    pub color_override: Option<&'static str>,
    /// Translation key of the unlock hint.
    pub description_key: &'static str,
}

const HEAD_PLACEMENT: Placement = Placement {
    position: [0.0, 0.1, -0.39],
    rotation: [-2.5, 2.75, 0.0],
    scale: 1.8,
};

static HAT_POKEMON: AccessoryDef = AccessoryDef {
    id: AccessoryId::HatPokemon,
    asset: "/models/hat_pokemon.glb",
    condition: UnlockCondition::DiscoverAll,
    placement: HEAD_PLACEMENT,
    color_override: None,
    description_key: "accessories.hatPokemon",
};

static HAT_CRISIS: AccessoryDef = AccessoryDef {
    id: AccessoryId::HatCrisis,
    asset: "/models/hat_crisis.glb",
    condition: UnlockCondition::External,
    placement: Placement {
        position: [-0.03, 0.0, -0.39],
        rotation: [0.9, 0.14, -0.08],
        scale: 0.5,
    },
    color_override: Some("#800020"),
    description_key: "accessories.hatCrisis",
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnlockError {
    #[error("unknown accessory '{0}'")]
    UnknownAccessory(String),
    #[error("accessory '{0}' is still locked")]
    Locked(AccessoryId),
}

/// `{current, required}` towards one accessory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnlockProgress {
    pub current: usize,
    pub required: usize,
}

impl UnlockProgress {
    pub fn percentage(&self) -> f32 {
        if self.required == 0 {
            return 100.0;
        }
        (self.current as f32 / self.required as f32 * 100.0).min(100.0)
    }
}

/// Unlocked accessories plus the one currently worn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRegistry {
    unlocked: BTreeSet<AccessoryId>,
    equipped: Option<AccessoryId>,
}

impl UnlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate every computed condition. Returns the accessories granted by
    /// this call (empty when nothing changed).
    pub fn check_all(&mut self, discovery: &DiscoverySet, catalog_size: usize) -> Vec<AccessoryId> {
        let mut granted = Vec::new();
        for id in AccessoryId::ALL {
            if self.is_unlocked(id) {
                continue;
            }
            let met = match id.def().condition {
                UnlockCondition::DiscoverAll => discovery.size() >= catalog_size,
                UnlockCondition::External => false,
            };
            if met && self.grant(id) {
                granted.push(id);
            }
        }
        granted
    }

    /// Grant directly. Returns false if it was already unlocked.
    pub fn grant(&mut self, id: AccessoryId) -> bool {
        self.unlocked.insert(id)
    }

    pub fn is_unlocked(&self, id: AccessoryId) -> bool {
        self.unlocked.contains(&id)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = AccessoryId> + '_ {
        self.unlocked.iter().copied()
    }

    pub fn progress(&self, id: AccessoryId, discovery: &DiscoverySet, catalog_size: usize) -> UnlockProgress {
        match id.def().condition {
            UnlockCondition::DiscoverAll => UnlockProgress {
                current: discovery.size(),
                required: catalog_size,
            },
            UnlockCondition::External => UnlockProgress {
                current: usize::from(self.is_unlocked(id)),
                required: 1,
            },
        }
    }

    /// Wear an unlocked accessory, or take it off with `None`.
    pub fn equip(&mut self, id: Option<AccessoryId>) -> Result<(), UnlockError> {
        if let Some(id) = id {
            if !self.is_unlocked(id) {
                return Err(UnlockError::Locked(id));
            }
        }
        self.equipped = id;
        Ok(())
    }

    pub fn equipped(&self) -> Option<AccessoryId> {
        self.equipped
    }
}

/// Fixed-interval timer for the safety-net unlock poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockPoller {
    interval: f32,
    elapsed: f32,
}

impl UnlockPoller {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt`; true when a poll is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}

impl Default for UnlockPoller {
    fn default() -> Self {
        Self::new(UNLOCK_POLL_SECONDS)
    }
}
