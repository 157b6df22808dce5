//! Decision-phase faults
//!
//! A fault aborts only the phase it happened in. The brain records it with
//! the agent's concrete type and the phase name, then moves on.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use thiserror::Error;

use crate::brain::goal::{GoalId, GoalKind};
use crate::core::types::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    PrepareGoals,
    Perceive,
    Evaluate,
    Execute,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::PrepareGoals => "PrepareGoals",
            Phase::Perceive => "Perceive",
            Phase::Evaluate => "Evaluate",
            Phase::Execute => "Execute",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Fault {
    #[error("{hook} failed: {message}")]
    Hook { hook: &'static str, message: String },

    #[error("goal {goal:?} ({kind:?}) produced a NaN score")]
    InvalidScore { goal: GoalId, kind: GoalKind },

    #[error("goal {0:?} no longer exists")]
    MissingGoal(GoalId),

    #[error("no behavior registered for {0:?}")]
    NoBehavior(GoalKind),

    #[error("panicked: {0}")]
    Panicked(String),
}

impl Fault {
    pub fn hook(hook: &'static str, message: impl Into<String>) -> Self {
        Fault::Hook {
            hook,
            message: message.into(),
        }
    }
}

/// A fault together with where it happened
#[derive(Debug, Clone)]
pub struct PhaseFault {
    pub agent: EntityId,
    pub agent_type: &'static str,
    pub phase: Phase,
    pub fault: Fault,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run a collaborator hook, turning a panic into [`Fault::Panicked`]
pub fn isolate<T>(body: impl FnOnce() -> Result<T, Fault>) -> Result<T, Fault> {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(result) => result,
        Err(payload) => Err(Fault::Panicked(panic_message(payload.as_ref()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolate_passes_through_ok_and_err() {
        assert_eq!(isolate(|| Ok::<_, Fault>(3)), Ok(3));
        let err = isolate(|| Err::<(), _>(Fault::hook("score", "boom")));
        assert_eq!(err, Err(Fault::hook("score", "boom")));
    }

    #[test]
    fn test_isolate_catches_panic() {
        let result: Result<(), Fault> = isolate(|| panic!("kaboom"));
        assert_eq!(result, Err(Fault::Panicked("kaboom".into())));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::PrepareGoals.to_string(), "PrepareGoals");
        assert_eq!(Phase::Execute.to_string(), "Execute");
    }
}
