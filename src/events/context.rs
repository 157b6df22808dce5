//! Event context - the buses and deferred queue for one simulation
//!
//! Constructed explicitly and passed by reference, so independent simulations
//! (and tests) never share delivery state.

use std::rc::Rc;
use std::sync::Arc;

use ahash::AHashMap;

use crate::core::error::{EngineError, Result};
use crate::core::types::Tick;
use crate::events::bus::{EventListener, EventManager};
use crate::events::event::{BusId, Event, EventPayload};
use crate::events::scheduled::ScheduledEventManager;

pub struct EventContext {
    default_bus: EventManager,
    extra_buses: AHashMap<BusId, EventManager>,
    next_bus: u32,
    scheduler: Arc<ScheduledEventManager>,
    now: Tick,
}

impl EventContext {
    pub fn new() -> Self {
        Self {
            default_bus: EventManager::new(BusId::DEFAULT),
            extra_buses: AHashMap::new(),
            next_bus: 1,
            scheduler: Arc::new(ScheduledEventManager::new()),
            now: 0,
        }
    }

    /// Create an additional bus that events can target with [`Event::on_bus`]
    pub fn add_bus(&mut self) -> BusId {
        let id = BusId(self.next_bus);
        self.next_bus += 1;
        self.extra_buses.insert(id, EventManager::new(id));
        id
    }

    pub fn default_bus(&self) -> &EventManager {
        &self.default_bus
    }

    pub fn bus(&self, id: BusId) -> Option<&EventManager> {
        if id == BusId::DEFAULT {
            Some(&self.default_bus)
        } else {
            self.extra_buses.get(&id)
        }
    }

    /// Subscribe to the default bus
    pub fn subscribe(&self, listener: Rc<dyn EventListener>) -> bool {
        self.default_bus.subscribe(listener)
    }

    /// Subscribe to a specific bus
    pub fn subscribe_to(&self, bus: BusId, listener: Rc<dyn EventListener>) -> Result<bool> {
        let bus = self.bus(bus).ok_or(EngineError::UnknownBus(bus))?;
        Ok(bus.subscribe(listener))
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    /// Move the event clock forward (never backward)
    pub fn advance_to(&mut self, tick: Tick) {
        self.now = self.now.max(tick);
    }

    /// Build an event stamped with the current tick
    pub fn create_event(&self, payload: EventPayload) -> Event {
        Event::new(payload, self.now)
    }

    /// Deliver synchronously
    pub fn post(&self, event: &mut Event) -> Result<bool> {
        event.post(self)
    }

    /// Build and deliver synchronously
    pub fn emit(&self, payload: EventPayload) -> Result<bool> {
        let mut event = self.create_event(payload);
        event.post(self)
    }

    /// Queue for delivery on the next `update`
    pub fn schedule(&self, event: Event) {
        self.scheduler.add_event(event);
    }

    /// Handle for producers that outlive a borrow of the context, possibly on other threads
    pub fn scheduler(&self) -> Arc<ScheduledEventManager> {
        Arc::clone(&self.scheduler)
    }

    /// Drain the deferred queue. Call exactly once per tick.
    pub fn update(&self) -> usize {
        self.scheduler.update(self)
    }

    /// Session teardown: drop all subscribers and anything still queued
    pub fn reset(&self) {
        self.default_bus.reset();
        for bus in self.extra_buses.values() {
            bus.reset();
        }
        self.scheduler.clear();
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self::new()
    }
}
