//! Highlight system - emissive emphasis on the selected group.

use hecs::{Entity, World};

use crate::components::{CrabSnapshot, GroupMember, Highlight, MeshName};

/// Reset every interactive mesh, then light up the members of `selected`.
pub fn highlight_system(world: &mut World, selected: Option<&str>) {
    for (_, (member, highlight)) in world.query_mut::<(&GroupMember, &mut Highlight)>() {
        *highlight = Highlight::for_group(&member.group, selected);
    }
}

/// Current emphasis of the mesh called `name`.
pub fn mesh_highlight(world: &World, name: &str) -> Option<Highlight> {
    world
        .query::<(&MeshName, &Highlight)>()
        .iter()
        .find(|(_, (mesh, _))| mesh.0 == name)
        .map(|(_, (_, highlight))| *highlight)
}

/// Overwrite the crab's published snapshot.
pub fn publish_snapshot(world: &mut World, crab: Entity, snapshot: CrabSnapshot) {
    match world.get::<&mut CrabSnapshot>(crab) {
        Ok(mut published) => *published = snapshot,
        Err(e) => log::warn!("crab entity has no snapshot: {e}"),
    }
}
