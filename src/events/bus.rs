//! Synchronous publish/subscribe bus
//!
//! Listeners register once and every event is delivered at most once.
//! Delivery iterates a snapshot of the subscriber list, so listeners may
//! subscribe or unsubscribe while an event is in flight without affecting it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::context::EventContext;
use crate::events::event::{BusId, Event};

/// Something that reacts to events on a bus
pub trait EventListener {
    fn on_event(&self, event: &Event, ctx: &EventContext);

    /// Name used in log lines and duplicate-type detection
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Listener identity is the allocation, not the type
fn listener_addr<L: EventListener + ?Sized>(listener: &Rc<L>) -> *const () {
    Rc::as_ptr(listener) as *const ()
}

pub struct EventManager {
    id: BusId,
    listeners: RefCell<Vec<Rc<dyn EventListener>>>,
}

impl EventManager {
    pub fn new(id: BusId) -> Self {
        Self {
            id,
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn id(&self) -> BusId {
        self.id
    }

    /// Register a listener. Re-subscribing the same instance is a logged no-op.
    ///
    /// Returns whether the listener was added.
    pub fn subscribe(&self, listener: Rc<dyn EventListener>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let addr = listener_addr(&listener);

        if listeners.iter().any(|l| listener_addr(l) == addr) {
            tracing::warn!(
                bus = self.id.0,
                listener = listener.name(),
                "listener already subscribed, ignoring"
            );
            return false;
        }

        // Allowed, but usually a wiring mistake (double registration at startup)
        if listeners.iter().any(|l| l.name() == listener.name()) {
            tracing::warn!(
                bus = self.id.0,
                listener = listener.name(),
                "another instance of this listener type is already subscribed"
            );
        }

        tracing::debug!(bus = self.id.0, listener = listener.name(), "listener subscribed");
        listeners.push(listener);
        true
    }

    /// Remove a listener. Returns whether it was subscribed.
    pub fn unsubscribe<L: EventListener + ?Sized>(&self, listener: &Rc<L>) -> bool {
        let addr = listener_addr(listener);
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| listener_addr(l) != addr);
        listeners.len() != before
    }

    pub fn has_listener<L: EventListener + ?Sized>(&self, listener: &Rc<L>) -> bool {
        let addr = listener_addr(listener);
        self.listeners
            .borrow()
            .iter()
            .any(|l| listener_addr(l) == addr)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver an event to every current subscriber
    ///
    /// No-op (returns false) if the event was already dispatched.
    pub fn notify(&self, event: &mut Event, ctx: &EventContext) -> bool {
        if !event.dispatch() {
            tracing::debug!(bus = self.id.0, event = ?event.id(), "event already dispatched");
            return false;
        }

        let snapshot: Vec<Rc<dyn EventListener>> = self.listeners.borrow().clone();
        for listener in &snapshot {
            listener.on_event(event, ctx);
        }
        true
    }

    /// Drop every subscriber (session teardown)
    pub fn reset(&self) {
        self.listeners.borrow_mut().clear();
    }
}
