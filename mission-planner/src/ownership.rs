use std::collections::HashMap;

use mission_planner_model::EntityId;

/// Maps widget-side decoration ids (leg labels, direction arrows, name tags,
/// endpoint dots) to the mission entity that owns them. When an entity dies,
/// every decoration it owns dies with it.
#[derive(Debug, Default)]
pub struct Ownership {
    owner_of: HashMap<u32, EntityId>,
}

impl Ownership {
    /// Later claims win; the widget reuses ids after redraws.
    pub fn claim(&mut self, visual: u32, owner: EntityId) {
        self.owner_of.insert(visual, owner);
    }

    pub fn owner(&self, visual: u32) -> Option<EntityId> {
        self.owner_of.get(&visual).copied()
    }

    /// Remove and return every visual owned by `owner`, sorted for a stable
    /// deletion order.
    pub fn release_owned(&mut self, owner: EntityId) -> Vec<u32> {
        let mut released: Vec<u32> = self
            .owner_of
            .iter()
            .filter(|(_, candidate)| **candidate == owner)
            .map(|(visual, _)| *visual)
            .collect();
        released.sort_unstable();
        for visual in &released {
            self.owner_of.remove(visual);
        }
        released
    }

    pub fn clear(&mut self) {
        self.owner_of.clear();
    }
}
