//! World - entity directory for the simulation

use ahash::AHashMap;

use crate::core::types::{EntityId, Vec2};
use crate::stimulus::EntityDirectory;

/// Every located entity: villagers, props, stimulus sources
#[derive(Debug, Default)]
pub struct World {
    positions: AHashMap<EntityId, Vec2>,
    names: AHashMap<EntityId, String>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, name: impl Into<String>, position: Vec2) -> EntityId {
        let id = EntityId::new();
        self.positions.insert(id, position);
        self.names.insert(id, name.into());
        id
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        self.names.remove(&id);
        self.positions.remove(&id).is_some()
    }

    /// Move an existing entity. Unknown ids are ignored.
    pub fn set_position(&mut self, id: EntityId, position: Vec2) -> bool {
        match self.positions.get_mut(&id) {
            Some(slot) => {
                *slot = position;
                true
            }
            None => false,
        }
    }

    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.positions.len()
    }
}

impl EntityDirectory for World {
    fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.position(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_lookup() {
        let mut world = World::new();
        let id = world.spawn("Wolf", Vec2::new(1.0, 2.0));
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.name(id), Some("Wolf"));
        assert_eq!(world.position_of(id), Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_set_position_ignores_unknown() {
        let mut world = World::new();
        assert!(!world.set_position(EntityId::new(), Vec2::default()));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_remove() {
        let mut world = World::new();
        let id = world.spawn("Bell", Vec2::default());
        assert!(world.remove(id));
        assert!(!world.contains(id));
        assert!(world.position_of(id).is_none());
        assert!(!world.remove(id));
    }
}
