//! Deferred event queue, drained once per tick
//!
//! Decouples "event happened" from "event delivered". Producers may live on
//! any thread; draining is serialized. Events queued while a drain is running
//! (typically by a listener reacting to a drained event) wait for the next
//! `update`, which bounds recursive delivery to one queue depth per tick.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::events::context::EventContext;
use crate::events::event::Event;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking listener must not wedge the queue for everyone else
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct ScheduledEventManager {
    queue: Mutex<Vec<Event>>,
    drain_lock: Mutex<()>,
    drainer: Mutex<Option<ThreadId>>,
    delivered_total: AtomicUsize,
}

/// Clears the drainer marker even if a listener panics mid-drain
struct DrainerGuard<'a> {
    drainer: &'a Mutex<Option<ThreadId>>,
}

impl Drop for DrainerGuard<'_> {
    fn drop(&mut self) {
        *lock(self.drainer) = None;
    }
}

impl ScheduledEventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the back of the queue (unbounded)
    pub fn add_event(&self, event: Event) {
        lock(&self.queue).push(event);
    }

    /// Events waiting for the next `update`
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Events delivered over the manager's lifetime
    pub fn delivered_total(&self) -> usize {
        self.delivered_total.load(Ordering::Relaxed)
    }

    /// Discard everything queued
    pub fn clear(&self) {
        lock(&self.queue).clear();
    }

    /// Post every queued event in FIFO order, then leave the queue empty
    ///
    /// Returns the number of events delivered. A re-entrant call from inside
    /// a drain (same thread) is ignored; calls from other threads wait.
    pub fn update(&self, ctx: &EventContext) -> usize {
        let me = thread::current().id();
        if *lock(&self.drainer) == Some(me) {
            tracing::debug!("scheduled events already draining on this thread, skipping");
            return 0;
        }

        let _serial = lock(&self.drain_lock);
        *lock(&self.drainer) = Some(me);
        let _guard = DrainerGuard { drainer: &self.drainer };

        // Swap the batch out so listeners can enqueue freely during delivery
        let batch = std::mem::take(&mut *lock(&self.queue));
        let mut delivered = 0;

        for mut event in batch {
            match event.post(ctx) {
                Ok(true) => delivered += 1,
                Ok(false) => {
                    tracing::debug!(event = ?event.id(), "scheduled event was already dispatched");
                }
                Err(e) => {
                    tracing::warn!(event = ?event.id(), error = %e, "dropping undeliverable scheduled event");
                }
            }
        }

        self.delivered_total.fetch_add(delivered, Ordering::Relaxed);
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::bus::EventListener;
    use crate::events::event::{BusId, EventPayload};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn tagged(tag: &str) -> Event {
        Event::new(EventPayload::Custom { tag: tag.into() }, 0)
    }

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<String>>,
    }

    impl EventListener for Recorder {
        fn on_event(&self, event: &Event, _ctx: &EventContext) {
            if let EventPayload::Custom { tag } = event.payload() {
                self.seen.borrow_mut().push(tag.clone());
            }
        }
    }

    /// Tries to drain again from inside a drain
    struct Reentrant {
        inner_result: RefCell<Option<usize>>,
    }

    impl EventListener for Reentrant {
        fn on_event(&self, _event: &Event, ctx: &EventContext) {
            ctx.schedule(tagged("queued-during-drain"));
            *self.inner_result.borrow_mut() = Some(ctx.update());
        }
    }

    #[test]
    fn test_update_drains_in_fifo_order() {
        let ctx = EventContext::new();
        let recorder = Rc::new(Recorder::default());
        ctx.subscribe(recorder.clone());

        ctx.schedule(tagged("a"));
        ctx.schedule(tagged("b"));
        ctx.schedule(tagged("c"));
        assert_eq!(ctx.scheduler().pending(), 3);
        assert!(recorder.seen.borrow().is_empty());

        assert_eq!(ctx.update(), 3);
        assert_eq!(*recorder.seen.borrow(), vec!["a", "b", "c"]);
        assert_eq!(ctx.scheduler().pending(), 0);
        assert_eq!(ctx.scheduler().delivered_total(), 3);
    }

    #[test]
    fn test_reentrant_update_is_noop() {
        let ctx = EventContext::new();
        let reentrant = Rc::new(Reentrant {
            inner_result: RefCell::new(None),
        });
        ctx.subscribe(reentrant.clone());

        ctx.schedule(tagged("first"));
        assert_eq!(ctx.update(), 1);
        assert_eq!(*reentrant.inner_result.borrow(), Some(0));
        assert_eq!(ctx.scheduler().pending(), 1);
    }

    #[test]
    fn test_undeliverable_event_does_not_stop_drain() {
        let ctx = EventContext::new();
        let recorder = Rc::new(Recorder::default());
        ctx.subscribe(recorder.clone());

        ctx.schedule(tagged("lost").on_bus(BusId(9)));
        ctx.schedule(tagged("kept"));

        assert_eq!(ctx.update(), 1);
        assert_eq!(*recorder.seen.borrow(), vec!["kept"]);
    }

    #[test]
    fn test_producers_on_other_threads() {
        let ctx = EventContext::new();
        let recorder = Rc::new(Recorder::default());
        ctx.subscribe(recorder.clone());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let scheduler = ctx.scheduler();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        scheduler.add_event(tagged(&format!("{}-{}", i, j)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ctx.update(), 40);
        assert_eq!(recorder.seen.borrow().len(), 40);
    }

    #[test]
    fn test_already_dispatched_event_not_redelivered() {
        let ctx = EventContext::new();
        let recorder = Rc::new(Recorder::default());
        ctx.subscribe(recorder.clone());

        let mut event = tagged("once");
        event.dispatch();
        ctx.schedule(event);

        assert_eq!(ctx.update(), 0);
        assert!(recorder.seen.borrow().is_empty());
    }

    #[test]
    fn test_clear_discards_pending() {
        let scheduler = Arc::new(ScheduledEventManager::new());
        scheduler.add_event(tagged("x"));
        scheduler.clear();
        assert_eq!(scheduler.pending(), 0);
    }
}
