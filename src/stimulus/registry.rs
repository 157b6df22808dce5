//! Emitter registry - the per-simulation list of active stimuli

use ahash::AHashMap;

use crate::core::types::{EntityId, Vec2};
use crate::stimulus::emitter::{Emitter, EmitterId, StimulusKind};

/// Resolves entity ids to their current location (used for dynamic emitters)
pub trait EntityDirectory {
    fn position_of(&self, id: EntityId) -> Option<Vec2>;
}

impl EntityDirectory for AHashMap<EntityId, Vec2> {
    fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.get(&id).copied()
    }
}

/// Registry of active emitters, kept in creation order
#[derive(Debug, Default)]
pub struct EmitterList {
    emitters: Vec<Emitter>,
    next_id: u64,
}

impl EmitterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stimulus and return its id
    ///
    /// `duration <= 0` means the emitter lives until deleted.
    pub fn add_emitter(
        &mut self,
        kind: StimulusKind,
        source: EntityId,
        position: Vec2,
        radius: f32,
        duration: i32,
        dynamic_source: bool,
    ) -> EmitterId {
        self.next_id += 1;
        let id = EmitterId(self.next_id);

        self.emitters.push(Emitter {
            id,
            kind,
            source,
            position,
            radius,
            duration,
            remaining: duration,
            dynamic_source,
        });

        tracing::debug!(emitter = id.0, ?kind, %source, radius, duration, "emitter added");
        id
    }

    pub fn delete_emitter(&mut self, id: EmitterId) -> bool {
        let before = self.emitters.len();
        self.emitters.retain(|e| e.id != id);
        self.emitters.len() != before
    }

    pub fn clear_emitters(&mut self) {
        self.emitters.clear();
    }

    pub fn get_emitter(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EmitterId) -> bool {
        self.get_emitter(id).is_some()
    }

    pub fn count(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Emitter> {
        self.emitters.iter()
    }

    /// Advance every emitter by `elapsed` ticks
    ///
    /// Timed emitters count down and are removed once remaining <= 0; they
    /// never track a source. Untimed dynamic emitters follow their source, and
    /// if the source cannot be resolved the emitter is pinned where it last
    /// was. Returns the ids of emitters removed by expiry.
    pub fn update_emitters(
        &mut self,
        elapsed: u32,
        directory: &dyn EntityDirectory,
    ) -> Vec<EmitterId> {
        let elapsed = i32::try_from(elapsed).unwrap_or(i32::MAX);
        let mut expired = Vec::new();

        self.emitters.retain_mut(|emitter| {
            if emitter.is_timed() {
                emitter.remaining = emitter.remaining.saturating_sub(elapsed);
                if emitter.remaining <= 0 {
                    tracing::debug!(emitter = emitter.id.0, kind = ?emitter.kind, "emitter expired");
                    expired.push(emitter.id);
                    return false;
                }
                // Timed emitters stay where they were raised
                return true;
            }

            if emitter.dynamic_source {
                match directory.position_of(emitter.source) {
                    Some(position) => emitter.position = position,
                    None => {
                        tracing::warn!(
                            emitter = emitter.id.0,
                            source = %emitter.source,
                            "emitter source not found, pinning at last known position"
                        );
                        emitter.dynamic_source = false;
                    }
                }
            }

            true
        });

        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn empty_directory() -> AHashMap<EntityId, Vec2> {
        AHashMap::new()
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut list = EmitterList::new();
        let source = EntityId::new();
        let a = list.add_emitter(StimulusKind::Sound, source, Vec2::default(), 5.0, 0, false);
        let b = list.add_emitter(StimulusKind::Sound, source, Vec2::default(), 5.0, 0, false);
        list.delete_emitter(b);
        let c = list.add_emitter(StimulusKind::Sound, source, Vec2::default(), 5.0, 0, false);
        assert!(a < b && b < c);
        assert_eq!(list.count(), 2);
    }

    #[test]
    fn test_duration_ten_expires_on_third_step_of_four() {
        let mut list = EmitterList::new();
        let id = list.add_emitter(
            StimulusKind::Danger,
            EntityId::new(),
            Vec2::default(),
            10.0,
            10,
            false,
        );
        let dir = empty_directory();

        assert!(list.update_emitters(4, &dir).is_empty());
        assert_eq!(list.get_emitter(id).unwrap().remaining, 6);

        assert!(list.update_emitters(4, &dir).is_empty());
        assert_eq!(list.get_emitter(id).unwrap().remaining, 2);

        assert_eq!(list.update_emitters(4, &dir), vec![id]);
        assert!(list.get_emitter(id).is_none());
        assert_eq!(list.count(), 0);
    }

    #[test]
    fn test_infinite_emitter_survives_updates() {
        let mut list = EmitterList::new();
        let id = list.add_emitter(StimulusKind::Food, EntityId::new(), Vec2::default(), 3.0, 0, false);
        let dir = empty_directory();
        for _ in 0..100 {
            list.update_emitters(7, &dir);
        }
        assert!(list.contains(id));
    }

    #[test]
    fn test_dynamic_emitter_follows_source() {
        let mut list = EmitterList::new();
        let wolf = EntityId::new();
        let id = list.add_emitter(StimulusKind::Danger, wolf, Vec2::new(0.0, 0.0), 8.0, 0, true);

        let mut dir = empty_directory();
        dir.insert(wolf, Vec2::new(4.0, 2.0));
        list.update_emitters(1, &dir);

        let emitter = list.get_emitter(id).unwrap();
        assert_eq!(emitter.position, Vec2::new(4.0, 2.0));
        assert!(emitter.dynamic_source);
    }

    #[test]
    fn test_timed_dynamic_emitter_does_not_track_source() {
        let mut list = EmitterList::new();
        let bell = EntityId::new();
        let id = list.add_emitter(StimulusKind::Alarm, bell, Vec2::new(0.0, 0.0), 5.0, 10, true);

        let mut dir = empty_directory();
        dir.insert(bell, Vec2::new(9.0, 9.0));
        assert!(list.update_emitters(1, &dir).is_empty());

        let emitter = list.get_emitter(id).unwrap();
        assert_eq!(emitter.position, Vec2::new(0.0, 0.0));
        assert!(emitter.dynamic_source);
        assert_eq!(emitter.remaining, 9);

        // Unresolvable source does not unpin it either
        list.update_emitters(1, &empty_directory());
        assert!(list.get_emitter(id).unwrap().dynamic_source);
    }

    #[test]
    fn test_unresolved_dynamic_source_is_pinned() {
        let mut list = EmitterList::new();
        let ghost = EntityId::new();
        let start = Vec2::new(7.0, -3.0);
        let id = list.add_emitter(StimulusKind::Sound, ghost, start, 8.0, 0, true);

        list.update_emitters(1, &empty_directory());

        let emitter = list.get_emitter(id).unwrap();
        assert!(!emitter.dynamic_source);
        assert_eq!(emitter.position, start);

        // Stays pinned even if the id shows up later
        let mut dir = empty_directory();
        dir.insert(ghost, Vec2::new(100.0, 100.0));
        list.update_emitters(1, &dir);
        assert_eq!(list.get_emitter(id).unwrap().position, start);
    }

    #[test]
    fn test_removal_keeps_order_of_survivors() {
        let mut list = EmitterList::new();
        let source = EntityId::new();
        let short = list.add_emitter(StimulusKind::Sound, source, Vec2::default(), 1.0, 1, false);
        let long_a = list.add_emitter(StimulusKind::Sound, source, Vec2::default(), 1.0, 5, false);
        let short_b = list.add_emitter(StimulusKind::Sound, source, Vec2::default(), 1.0, 1, false);
        let long_b = list.add_emitter(StimulusKind::Sound, source, Vec2::default(), 1.0, 0, false);

        let expired = list.update_emitters(1, &empty_directory());
        assert_eq!(expired, vec![short, short_b]);

        let remaining: Vec<_> = list.iter().map(|e| e.id).collect();
        assert_eq!(remaining, vec![long_a, long_b]);
    }

    #[test]
    fn test_clear_emitters() {
        let mut list = EmitterList::new();
        list.add_emitter(StimulusKind::Smell, EntityId::new(), Vec2::default(), 1.0, 0, false);
        list.clear_emitters();
        assert!(list.is_empty());
        assert!(!list.delete_emitter(EmitterId(1)));
    }

    proptest! {
        #[test]
        fn prop_timed_emitter_removed_exactly_when_budget_spent(
            duration in 1i32..200,
            steps in proptest::collection::vec(1u32..20, 1..40),
        ) {
            let mut list = EmitterList::new();
            let id = list.add_emitter(StimulusKind::Sound, EntityId::new(), Vec2::default(), 1.0, duration, false);
            let dir = empty_directory();

            let mut spent: i64 = 0;
            for step in steps {
                let was_alive = list.contains(id);
                let expired = list.update_emitters(step, &dir);
                if !was_alive {
                    prop_assert!(expired.is_empty());
                    continue;
                }
                spent += i64::from(step);
                let should_expire = spent >= i64::from(duration);
                prop_assert_eq!(expired.contains(&id), should_expire);
                prop_assert_eq!(list.contains(id), !should_expire);
                if !should_expire {
                    let remaining = list.get_emitter(id).unwrap().remaining;
                    prop_assert_eq!(i64::from(remaining), i64::from(duration) - spent);
                }
            }
        }
    }
}
