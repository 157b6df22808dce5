//! Bus subscriber that turns world events into registry and directory changes

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{Event, EventContext, EventListener, EventPayload};
use crate::simulation::world::World;
use crate::stimulus::EmitterList;

pub struct StimulusListener {
    emitters: Rc<RefCell<EmitterList>>,
    world: Rc<RefCell<World>>,
}

impl StimulusListener {
    pub fn new(emitters: Rc<RefCell<EmitterList>>, world: Rc<RefCell<World>>) -> Self {
        Self { emitters, world }
    }
}

impl EventListener for StimulusListener {
    fn on_event(&self, event: &Event, _ctx: &EventContext) {
        match event.payload() {
            EventPayload::Stimulus {
                kind,
                source,
                position,
                radius,
                duration,
                dynamic,
            } => match self.emitters.try_borrow_mut() {
                Ok(mut emitters) => {
                    emitters.add_emitter(*kind, *source, *position, *radius, *duration, *dynamic);
                }
                Err(_) => {
                    tracing::warn!(event = ?event.id(), "emitter registry busy, stimulus dropped");
                }
            },
            EventPayload::EntityRemoved { entity } => match self.world.try_borrow_mut() {
                Ok(mut world) => {
                    world.remove(*entity);
                }
                Err(_) => {
                    tracing::warn!(event = ?event.id(), %entity, "world busy, removal dropped");
                }
            },
            EventPayload::Custom { tag } => {
                tracing::debug!(tag = %tag, "custom event");
            }
        }
    }

    fn name(&self) -> &str {
        "StimulusListener"
    }
}
