//! Component definitions for the session world.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod crab;
mod scene;

pub use crab::*;
pub use scene::*;

pub use crabfolio_logic::movement::CrabSnapshot;
pub use crabfolio_logic::proximity::Highlight;
