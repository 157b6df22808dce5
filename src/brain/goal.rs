//! Goals - scored, time-bounded units of intended behavior

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Vec2};
use crate::stimulus::{Emitter, EmitterId, StimulusKind};

/// Per-brain goal identifier, assigned when the goal joins a [`GoalSet`](super::GoalSet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoalId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalKind {
    /// Standing fallback behavior
    Idle,
    /// Walk over and see what made a noise
    Investigate,
    /// Get away from a threat
    Flee,
    /// Go and eat
    Forage,
}

/// How long a goal may live, counted in Evaluate phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalDuration {
    /// Never auto-expires
    Persistent,
    /// Evaluate phases left before release
    Ticks(u32),
}

impl GoalDuration {
    /// Count one Evaluate phase. Returns true when the goal has run out.
    ///
    /// `Ticks(n)` is scored n more times; the call after that expires it.
    pub fn tick(&mut self) -> bool {
        match self {
            GoalDuration::Persistent => false,
            GoalDuration::Ticks(0) => true,
            GoalDuration::Ticks(n) => {
                *n -= 1;
                false
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, GoalDuration::Persistent)
    }
}

#[derive(Debug, Clone)]
pub struct Goal {
    id: GoalId,
    pub kind: GoalKind,
    pub duration: GoalDuration,
    /// Utility assigned during the last Evaluate phase
    pub value: f32,
    pub complete: bool,
    /// Emitter that spawned this goal, if any
    pub emitter: Option<EmitterId>,
    pub stimulus: Option<StimulusKind>,
    pub source: Option<EntityId>,
    pub target: Option<Vec2>,
    /// Number of times this goal has been executed
    pub progress: u32,
}

impl Goal {
    pub fn new(kind: GoalKind) -> Self {
        Self {
            id: GoalId(0),
            kind,
            duration: GoalDuration::Persistent,
            value: 0.0,
            complete: false,
            emitter: None,
            stimulus: None,
            source: None,
            target: None,
            progress: 0,
        }
    }

    pub fn with_duration(mut self, duration: GoalDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_target(mut self, target: Vec2) -> Self {
        self.target = Some(target);
        self
    }

    /// Link this goal to the stimulus that caused it
    pub fn bound_to(mut self, emitter: &Emitter) -> Self {
        self.emitter = Some(emitter.id);
        self.stimulus = Some(emitter.kind);
        self.source = Some(emitter.source);
        self.target = Some(emitter.position);
        self
    }

    pub fn id(&self) -> GoalId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: GoalId) {
        self.id = id;
    }

    pub fn is_persistent(&self) -> bool {
        self.duration.is_persistent()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn mark_complete(&mut self) {
        self.complete = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_three_survives_three_calls() {
        let mut duration = GoalDuration::Ticks(3);
        assert!(!duration.tick());
        assert!(!duration.tick());
        assert!(!duration.tick());
        assert!(duration.tick());
    }

    #[test]
    fn test_persistent_never_expires() {
        let mut duration = GoalDuration::Persistent;
        for _ in 0..10_000 {
            assert!(!duration.tick());
        }
        assert!(duration.is_persistent());
    }

    #[test]
    fn test_bound_to_copies_emitter_fields() {
        let source = EntityId::new();
        let emitter = Emitter {
            id: EmitterId(7),
            kind: StimulusKind::Food,
            source,
            position: Vec2::new(2.0, 3.0),
            radius: 4.0,
            duration: 0,
            remaining: 0,
            dynamic_source: false,
        };

        let goal = Goal::new(GoalKind::Forage).bound_to(&emitter);
        assert_eq!(goal.emitter, Some(EmitterId(7)));
        assert_eq!(goal.stimulus, Some(StimulusKind::Food));
        assert_eq!(goal.source, Some(source));
        assert_eq!(goal.target, Some(Vec2::new(2.0, 3.0)));
    }

    #[test]
    fn test_new_goal_defaults() {
        let goal = Goal::new(GoalKind::Idle);
        assert!(goal.is_persistent());
        assert!(!goal.is_complete());
        assert_eq!(goal.progress, 0);
    }
}
