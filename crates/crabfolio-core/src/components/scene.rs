//! Static scene entities: interactive meshes and obstacles.

use crabfolio_logic::geometry::{Aabb, Vec3};

/// Mesh name as exported from the scene file (e.g. "MugHandle").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshName(pub String);

/// World-space mesh position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPosition(pub Vec3);

/// Membership of a mesh in an interactive group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub group: String,
}

/// Static collision volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleBox(pub Aabb);
