//! Scene configuration: bounds, obstacles, interactive meshes, secrets.
//!
//! Scenes are JSON documents. The office scene ships embedded in the crate;
//! other scenes can be loaded from disk. A scene is validated once and is
//! immutable afterwards.

use std::collections::HashSet;
use std::path::Path;

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crabfolio_logic::geometry::{collides, is_within_bounds, Aabb, BoundsRect, Vec3};
use crabfolio_logic::movement::{CrabSnapshot, MovementConfig};
use crabfolio_logic::proximity::{Highlight, InteractionConfig};

use crate::components::{Crab, GroupMember, MeshName, ObstacleBox, WorldPosition, WornAccessory};

const OFFICE_SCENE_JSON: &str = include_str!("../data/office_scene.json");

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scene JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scene has no door passwords")]
    EmptyPasswords,
    #[error("mesh '{mesh}' references unknown group '{group}'")]
    UnknownGroup { mesh: String, group: String },
    #[error("scene bounds are inverted")]
    InvalidBounds,
    #[error("group '{0}' is defined twice")]
    DuplicateGroup(String),
    #[error("crab start {0:?} is outside the bounds or inside an obstacle")]
    BlockedStart(Vec3),
}

/// What happens when a group is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionAction {
    /// Open the retro terminal.
    Terminal,
    /// Drink a coffee (feeds the mug counter).
    Coffee,
    ToggleLamp,
    OpenCv,
    ToggleMainLights,
    /// Open an info panel (posters).
    OpenPanel,
    OpenKeypad,
    /// Walk through the door.
    Endgame,
    /// Highlight only.
    Inspect,
}

impl InteractionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionAction::Terminal => "terminal",
            InteractionAction::Coffee => "coffee",
            InteractionAction::ToggleLamp => "toggle_lamp",
            InteractionAction::OpenCv => "open_cv",
            InteractionAction::ToggleMainLights => "toggle_main_lights",
            InteractionAction::OpenPanel => "open_panel",
            InteractionAction::OpenKeypad => "open_keypad",
            InteractionAction::Endgame => "endgame",
            InteractionAction::Inspect => "inspect",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleDef {
    pub name: String,
    pub min: Vec3,
    pub max: Vec3,
}

impl ObstacleDef {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDef {
    pub key: String,
    pub action: InteractionAction,
    /// Discovery id recorded when the group is activated.
    #[serde(default)]
    pub discovers: Option<String>,
    /// Hidden from selection until the security keypad is solved.
    #[serde(default)]
    pub requires_keypad: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDef {
    pub name: String,
    pub group: String,
    pub position: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    pub name: String,
    pub bounds: BoundsRect,
    pub crab_start: Vec3,
    pub obstacles: Vec<ObstacleDef>,
    /// Selection ties resolve in this order.
    pub groups: Vec<GroupDef>,
    pub meshes: Vec<MeshDef>,
    pub catalog: Vec<String>,
    pub door_passwords: Vec<String>,
    pub keypad_code: String,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
}

impl SceneConfig {
    /// The built-in office scene.
    pub fn office() -> Result<Self, SceneError> {
        Self::from_json(OFFICE_SCENE_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let scene: SceneConfig = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if !self.bounds.is_valid() {
            return Err(SceneError::InvalidBounds);
        }
        if self.door_passwords.is_empty() {
            return Err(SceneError::EmptyPasswords);
        }
        let mut keys = HashSet::new();
        for group in &self.groups {
            if !keys.insert(group.key.as_str()) {
                return Err(SceneError::DuplicateGroup(group.key.clone()));
            }
        }
        if let Some(mesh) = self.meshes.iter().find(|m| !keys.contains(m.group.as_str())) {
            return Err(SceneError::UnknownGroup {
                mesh: mesh.name.clone(),
                group: mesh.group.clone(),
            });
        }
        let obstacles = self.obstacle_boxes();
        let m = &self.movement;
        if !is_within_bounds(self.crab_start, &self.bounds)
            || collides(
                self.crab_start,
                &obstacles,
                m.collision_radius,
                m.crab_height,
                m.collision_margin,
            )
        {
            return Err(SceneError::BlockedStart(self.crab_start));
        }
        Ok(())
    }

    pub fn obstacle_boxes(&self) -> Vec<Aabb> {
        self.obstacles.iter().map(ObstacleDef::aabb).collect()
    }

    pub fn group(&self, key: &str) -> Option<&GroupDef> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn catalog_ids(&self) -> Vec<&str> {
        self.catalog.iter().map(String::as_str).collect()
    }
}

/// Populate `world` with the scene's meshes and obstacles plus the crab.
/// Returns the crab entity.
pub fn spawn_scene(world: &mut World, scene: &SceneConfig) -> Entity {
    for obstacle in &scene.obstacles {
        world.spawn((MeshName(obstacle.name.clone()), ObstacleBox(obstacle.aabb())));
    }
    for mesh in &scene.meshes {
        world.spawn((
            MeshName(mesh.name.clone()),
            WorldPosition(mesh.position),
            GroupMember {
                group: mesh.group.clone(),
            },
            Highlight::NONE,
        ));
    }
    world.spawn((
        Crab,
        CrabSnapshot {
            position: scene.crab_start,
            ..CrabSnapshot::default()
        },
        WornAccessory(None),
    ))
}
