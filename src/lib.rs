//! Arc Sentinel - perception-driven agent decision engine
//!
//! World actions post events on a bus, subscribers raise timed stimulus
//! emitters, and every agent's brain scans those emitters once per tick to
//! spawn, score and execute goals.

pub mod brain;
pub mod core;
pub mod events;
pub mod simulation;
pub mod stimulus;
