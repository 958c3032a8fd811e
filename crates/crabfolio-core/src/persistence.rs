//! Save/Load functionality for persisting session progress
//!
//! Uses bincode for a compact binary snapshot of the progression state.
//! Scene data and the crab's transform are not saved; a save is tied to a
//! scene through its password count.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crabfolio_logic::discovery::DiscoverySet;
use crabfolio_logic::easter_eggs::{IdentityQueryCounter, KonamiTracker, MugCounter};
use crabfolio_logic::unlocks::UnlockRegistry;

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the session's progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSave {
    /// Save format version
    pub version: u32,
    pub scene_name: String,
    /// Door password count of the scene this was saved against
    pub password_count: usize,
    pub discovery: DiscoverySet,
    /// Unlocked accessories and the equipped one
    pub unlocks: UnlockRegistry,
    pub door_stage: usize,
    pub mail_count: u32,
    pub keypad_granted: bool,
    pub lamp_on: bool,
    pub main_lights_on: bool,
    pub konami: KonamiTracker,
    pub whoami: IdentityQueryCounter,
    pub mugs: MugCounter,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Encode(#[from] bincode::Error),
    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("save does not match this scene: expected {expected}, found {found}")]
    SceneMismatch { expected: usize, found: usize },
    #[error("saved door stage {stage} is past the last stage ({total})")]
    InvalidStage { stage: usize, total: usize },
}

/// Write a progress snapshot
pub fn save_progress<W: Write>(writer: W, save: &ProgressSave) -> Result<(), SaveError> {
    bincode::serialize_into(writer, save)?;
    Ok(())
}

/// Read a progress snapshot, rejecting other format versions
pub fn load_progress<R: Read>(reader: R) -> Result<ProgressSave, SaveError> {
    let save: ProgressSave = bincode::deserialize_from(reader)?;
    if save.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save.version,
        });
    }
    Ok(save)
}
