//! Interactive group collection from mesh entities.

use std::collections::HashMap;

use hecs::World;

use crabfolio_logic::geometry::Vec3;
use crabfolio_logic::proximity::InteractiveGroup;

use crate::components::{GroupMember, WorldPosition};
use crate::scene::GroupDef;

/// Build proximity groups from the world's mesh entities, in `defs` order.
/// Groups flagged `requires_keypad` start disabled unless `keypad_granted`.
pub fn collect_groups(world: &World, defs: &[GroupDef], keypad_granted: bool) -> Vec<InteractiveGroup> {
    let mut members: HashMap<&str, Vec<Vec3>> = HashMap::new();
    let mut query = world.query::<(&GroupMember, &WorldPosition)>();
    for (_, (member, position)) in query.iter() {
        members.entry(member.group.as_str()).or_default().push(position.0);
    }

    defs.iter()
        .map(|def| {
            let mut group = InteractiveGroup::new(
                def.key.clone(),
                members.remove(def.key.as_str()).unwrap_or_default(),
            );
            group.enabled = !def.requires_keypad || keypad_granted;
            group
        })
        .collect()
}
