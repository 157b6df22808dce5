//! Events - transient notifications posted by world actions
//!
//! An event is constructed, posted, delivered at most once, and discarded.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::{EngineError, Result};
use crate::core::types::{EntityId, Tick, Vec2};
use crate::events::context::EventContext;
use crate::stimulus::StimulusKind;

/// Reserved delivery timeout. Declared for future use, nothing enforces it.
pub const EVENT_TIMEOUT_TICKS: Tick = 600;

/// Unique identifier for events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier for an event bus owned by an [`EventContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusId(pub u32);

impl BusId {
    /// The bus events resolve to when they carry none
    pub const DEFAULT: BusId = BusId(0);
}

/// What happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    /// Something in the world started broadcasting a perceivable signal
    Stimulus {
        kind: StimulusKind,
        source: EntityId,
        position: Vec2,
        radius: f32,
        /// Lifetime in ticks, <= 0 means until deleted
        duration: i32,
        /// Follow the source as it moves
        dynamic: bool,
    },
    /// An entity left the world
    EntityRemoved { entity: EntityId },
    /// Free-form notification for collaborators
    Custom { tag: String },
}

#[derive(Debug, Clone)]
pub struct Event {
    id: EventId,
    payload: EventPayload,
    timestamp: Tick,
    dispatched: bool,
    bus: Option<BusId>,
}

impl Event {
    pub fn new(payload: EventPayload, timestamp: Tick) -> Self {
        Self {
            id: EventId::new(),
            payload,
            timestamp,
            dispatched: false,
            bus: None,
        }
    }

    /// Route this event to a specific bus instead of the default one
    pub fn on_bus(mut self, bus: BusId) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn timestamp(&self) -> Tick {
        self.timestamp
    }

    /// Ticks elapsed since the event was created
    pub fn age(&self, now: Tick) -> Tick {
        now.saturating_sub(self.timestamp)
    }

    pub fn bus(&self) -> Option<BusId> {
        self.bus
    }

    pub fn is_dispatched(&self) -> bool {
        self.dispatched
    }

    /// Mark as dispatched. Returns false if it already was.
    pub fn dispatch(&mut self) -> bool {
        if self.dispatched {
            return false;
        }
        self.dispatched = true;
        true
    }

    /// Undo hook for events. Not supported; always returns false.
    pub fn rollback(&mut self) -> bool {
        tracing::trace!(event = ?self.id, "rollback requested but events are not reversible");
        false
    }

    /// Deliver through the owning bus, or the context's default bus if none is set
    ///
    /// Returns whether listeners were invoked (false when already dispatched).
    pub fn post(&mut self, ctx: &EventContext) -> Result<bool> {
        let bus_id = self.bus.unwrap_or(BusId::DEFAULT);
        let bus = ctx.bus(bus_id).ok_or(EngineError::UnknownBus(bus_id))?;
        Ok(bus.notify(self, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(tag: &str) -> EventPayload {
        EventPayload::Custom { tag: tag.into() }
    }

    #[test]
    fn test_dispatch_is_one_shot() {
        let mut event = Event::new(custom("door"), 5);
        assert!(!event.is_dispatched());
        assert!(event.dispatch());
        assert!(event.is_dispatched());
        assert!(!event.dispatch());
    }

    #[test]
    fn test_age_saturates() {
        let event = Event::new(custom("bell"), 10);
        assert_eq!(event.timestamp(), 10);
        assert_eq!(event.age(25), 15);
        assert_eq!(event.age(3), 0);
    }

    #[test]
    fn test_rollback_is_inactive() {
        let mut event = Event::new(custom("bell"), 0);
        event.dispatch();
        assert!(!event.rollback());
        assert!(event.is_dispatched());
    }

    #[test]
    fn test_on_bus_sets_owner() {
        let event = Event::new(custom("x"), 0);
        assert_eq!(event.bus(), None);
        let event = event.on_bus(BusId(3));
        assert_eq!(event.bus(), Some(BusId(3)));
    }

    #[test]
    fn test_post_to_unknown_bus_fails() {
        let ctx = EventContext::new();
        let mut event = Event::new(custom("lost"), 0).on_bus(BusId(42));
        let result = event.post(&ctx);
        assert!(matches!(result, Err(EngineError::UnknownBus(BusId(42)))));
        assert!(!event.is_dispatched());
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = Event::new(custom("a"), 0);
        let b = Event::new(custom("a"), 0);
        assert_ne!(a.id(), b.id());
    }
}
