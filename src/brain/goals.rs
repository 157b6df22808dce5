//! Insertion-ordered goal collection owned by a brain

use crate::brain::fault::Fault;
use crate::brain::goal::{Goal, GoalId, GoalKind};
use crate::stimulus::EmitterId;

#[derive(Debug, Default)]
pub struct GoalSet {
    goals: Vec<Goal>,
    next_id: u64,
}

impl GoalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a goal and return the id it was given
    pub fn push(&mut self, mut goal: Goal) -> GoalId {
        self.next_id += 1;
        let id = GoalId(self.next_id);
        goal.assign_id(id);
        self.goals.push(goal);
        id
    }

    /// Return the existing goal of `kind`, or build one with `factory`
    ///
    /// The factory runs at most once and only when no goal of that kind exists.
    pub fn define_goal<F>(&mut self, kind: GoalKind, factory: F) -> Result<GoalId, Fault>
    where
        F: FnOnce(GoalKind) -> Result<Goal, Fault>,
    {
        if let Some(existing) = self.find_by_kind(kind) {
            return Ok(existing.id());
        }

        let mut goal = factory(kind)?;
        goal.kind = kind;
        Ok(self.push(goal))
    }

    pub fn find_by_kind(&self, kind: GoalKind) -> Option<&Goal> {
        self.goals.iter().find(|g| g.kind == kind)
    }

    pub fn find_by_emitter(&self, emitter: EmitterId) -> Option<&Goal> {
        self.goals.iter().find(|g| g.emitter == Some(emitter))
    }

    pub fn get(&self, id: GoalId) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id() == id)
    }

    pub fn get_mut(&mut self, id: GoalId) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id() == id)
    }

    /// Goal at a position in insertion order
    pub fn at(&self, index: usize) -> Option<&Goal> {
        self.goals.get(index)
    }

    /// Remove a goal, keeping the order of the rest
    pub fn take(&mut self, id: GoalId) -> Option<Goal> {
        let index = self.goals.iter().position(|g| g.id() == id)?;
        Some(self.goals.remove(index))
    }

    /// Remove every goal, returning them in insertion order
    pub fn drain(&mut self) -> Vec<Goal> {
        std::mem::take(&mut self.goals)
    }

    pub fn ids(&self) -> Vec<GoalId> {
        self.goals.iter().map(Goal::id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Goal> {
        self.goals.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}
