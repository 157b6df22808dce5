pub mod agent;
pub mod controller;
pub mod fault;
pub mod goal;
pub mod goals;
pub mod table;

pub use agent::Agent;
pub use controller::{Brain, ThinkReport};
pub use fault::{Fault, Phase, PhaseFault};
pub use goal::{Goal, GoalDuration, GoalId, GoalKind};
pub use goals::GoalSet;
pub use table::{GoalBehavior, GoalTable};
