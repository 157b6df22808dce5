//! Goal behavior table
//!
//! Goals are plain data; what a goal kind *does* lives here as a pair of
//! free functions (score, execute) keyed by [`GoalKind`]. `C` is whatever
//! state the agent exposes to its behaviors.

use ahash::AHashMap;

use crate::brain::fault::Fault;
use crate::brain::goal::{Goal, GoalKind};

pub type ScoreFn<C> = fn(&Goal, &C) -> Result<f32, Fault>;
pub type ExecuteFn<C> = fn(&mut Goal, &mut C) -> Result<(), Fault>;

pub struct GoalBehavior<C> {
    pub score: ScoreFn<C>,
    pub execute: ExecuteFn<C>,
}

// Manual impls: fn pointers are Copy whatever `C` is
impl<C> Clone for GoalBehavior<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for GoalBehavior<C> {}

pub struct GoalTable<C> {
    behaviors: AHashMap<GoalKind, GoalBehavior<C>>,
}

impl<C> GoalTable<C> {
    pub fn new() -> Self {
        Self {
            behaviors: AHashMap::new(),
        }
    }

    /// Register (or replace) the behavior for a kind
    pub fn register(&mut self, kind: GoalKind, score: ScoreFn<C>, execute: ExecuteFn<C>) -> &mut Self {
        self.behaviors.insert(kind, GoalBehavior { score, execute });
        self
    }

    pub fn get(&self, kind: GoalKind) -> Option<GoalBehavior<C>> {
        self.behaviors.get(&kind).copied()
    }

    pub fn handles(&self, kind: GoalKind) -> bool {
        self.behaviors.contains_key(&kind)
    }

    pub fn score(&self, goal: &Goal, state: &C) -> Result<f32, Fault> {
        let behavior = self.get(goal.kind).ok_or(Fault::NoBehavior(goal.kind))?;
        (behavior.score)(goal, state)
    }

    pub fn execute(&self, goal: &mut Goal, state: &mut C) -> Result<(), Fault> {
        let behavior = self.get(goal.kind).ok_or(Fault::NoBehavior(goal.kind))?;
        (behavior.execute)(goal, state)
    }
}

impl<C> Default for GoalTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tally {
        runs: u32,
    }

    fn score_two(_goal: &Goal, _state: &Tally) -> Result<f32, Fault> {
        Ok(2.0)
    }

    fn bump(goal: &mut Goal, state: &mut Tally) -> Result<(), Fault> {
        state.runs += 1;
        goal.mark_complete();
        Ok(())
    }

    #[test]
    fn test_dispatch_by_kind() {
        let mut table: GoalTable<Tally> = GoalTable::new();
        table.register(GoalKind::Forage, score_two, bump);

        let mut state = Tally::default();
        let mut goal = Goal::new(GoalKind::Forage);
        assert_eq!(table.score(&goal, &state), Ok(2.0));
        table.execute(&mut goal, &mut state).unwrap();
        assert_eq!(state.runs, 1);
        assert!(goal.is_complete());
    }

    #[test]
    fn test_unregistered_kind_is_fault() {
        let table: GoalTable<Tally> = GoalTable::new();
        let goal = Goal::new(GoalKind::Flee);
        assert_eq!(
            table.score(&goal, &Tally::default()),
            Err(Fault::NoBehavior(GoalKind::Flee))
        );
        assert!(!table.handles(GoalKind::Flee));
    }
}
