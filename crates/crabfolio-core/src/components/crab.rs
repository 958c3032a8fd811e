//! The player's crab.

use crabfolio_logic::unlocks::AccessoryId;

/// Marker for the crab entity. Its [`CrabSnapshot`](super::CrabSnapshot)
/// is overwritten once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crab;

/// Accessory currently worn on the crab's head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WornAccessory(pub Option<AccessoryId>);
