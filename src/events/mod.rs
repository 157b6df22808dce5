pub mod bus;
pub mod context;
pub mod event;
pub mod scheduled;

pub use bus::{EventListener, EventManager};
pub use context::EventContext;
pub use event::{BusId, Event, EventId, EventPayload, EVENT_TIMEOUT_TICKS};
pub use scheduled::ScheduledEventManager;
