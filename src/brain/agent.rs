//! The collaborator side of a brain
//!
//! A brain owns the decision cycle; the agent supplies everything
//! domain-specific: which standing goals exist, how goals are built, scored
//! and executed, and whether a stimulus is actually noticed.

use crate::brain::fault::Fault;
use crate::brain::goal::{Goal, GoalKind};
use crate::brain::goals::GoalSet;
use crate::core::types::{EntityId, Vec2};
use crate::stimulus::Emitter;

pub trait Agent {
    fn agent_id(&self) -> EntityId;

    fn position(&self) -> Vec2;

    /// Concrete type name, used when logging phase faults
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Synthesize standing goals before perception runs
    fn prepare_goals(&mut self, goals: &mut GoalSet) -> Result<(), Fault> {
        let _ = goals;
        Ok(())
    }

    fn create_goal(&mut self, kind: GoalKind) -> Result<Goal, Fault>;

    /// Line of sight, stealth and the like
    fn is_aware_of(&self, emitter: &Emitter) -> Result<bool, Fault> {
        let _ = emitter;
        Ok(true)
    }

    /// React to a newly perceived stimulus, normally by adding a goal bound to it
    fn prepare_emitter(&mut self, emitter: &Emitter, goals: &mut GoalSet) -> Result<(), Fault>;

    /// Utility of a goal this tick
    fn evaluate_goal(&self, goal: &Goal) -> Result<f32, Fault>;

    /// Carry out one tick of a goal; set `goal.complete` when done
    fn execute_goal(&mut self, goal: &mut Goal) -> Result<(), Fault>;

    /// Called when a goal is released (expired, completed or removed)
    fn goal_released(&mut self, goal: &Goal) {
        let _ = goal;
    }
}
