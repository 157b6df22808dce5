pub mod emitter;
pub mod registry;

pub use emitter::{Emitter, EmitterId, StimulusKind};
pub use registry::{EmitterList, EntityDirectory};
