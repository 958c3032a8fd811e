//! Crabfolio Core - session engine for the crab portfolio office
//!
//! Drives one player session: the crab walks around a static office scene,
//! interactive objects light up as it approaches, and interactions feed the
//! discovery, unlock and door progressions from `crabfolio-logic`.
//!
//! # Architecture
//!
//! The scene lives in a `hecs` world:
//! - **Entities**: interactive meshes, obstacles, the crab
//! - **Components**: pure data (MeshName, WorldPosition, GroupMember, Highlight, ...)
//! - **Systems**: highlight pass, group collection, snapshot publishing
//!
//! # Example
//!
//! ```rust,no_run
//! use crabfolio_core::prelude::*;
//!
//! let mut engine = SessionEngine::office().expect("office scene");
//! engine.key_down("w");
//!
//! loop {
//!     let report = engine.tick(1.0 / 60.0); // 60 FPS
//!     if let Some(interaction) = report.activated {
//!         println!("{} -> {}", interaction.group, interaction.action.as_str());
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod persistence;
pub mod scene;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{Interaction, SessionEngine, SessionEvent, TickReport};
    pub use crate::scene::{InteractionAction, SceneConfig};
}
