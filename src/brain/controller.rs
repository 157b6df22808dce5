//! Brain controller - per-agent goal arbitration
//!
//! Once per tick `think` runs four phases in order:
//! 1. PrepareGoals - the agent may add standing goals
//! 2. Perceive - linked goals re-aim at their emitter; interesting, in-range,
//!    unlinked emitters spawn reactive goals
//! 3. Evaluate - goals age, expired ones are released, the rest are scored
//! 4. Execute - the highest-value goal runs; it is released if it completes
//!
//! Each phase is its own fault boundary. A fault is logged with the agent's
//! type and the phase name and only cuts that phase short; `think` itself
//! never fails.

use ahash::AHashSet;

use crate::brain::agent::Agent;
use crate::brain::fault::{isolate, Fault, Phase, PhaseFault};
use crate::brain::goal::{Goal, GoalId, GoalKind};
use crate::brain::goals::GoalSet;
use crate::core::types::EntityId;
use crate::stimulus::{EmitterId, EmitterList, StimulusKind};

/// What happened during one `think`
#[derive(Debug, Clone)]
pub struct ThinkReport {
    pub agent: EntityId,
    pub agent_type: &'static str,
    /// Emitters that spawned a goal this tick
    pub perceived: Vec<EmitterId>,
    pub released: Vec<GoalId>,
    pub executed: Option<(GoalId, GoalKind)>,
    pub faults: Vec<PhaseFault>,
}

impl ThinkReport {
    fn new(agent: EntityId, agent_type: &'static str) -> Self {
        Self {
            agent,
            agent_type,
            perceived: Vec::new(),
            released: Vec::new(),
            executed: None,
            faults: Vec::new(),
        }
    }

    fn record(&mut self, phase: Phase, fault: Fault) {
        tracing::warn!(
            agent = %self.agent,
            agent_type = self.agent_type,
            %phase,
            %fault,
            "think phase faulted"
        );
        self.faults.push(PhaseFault {
            agent: self.agent,
            agent_type: self.agent_type,
            phase,
            fault,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

#[derive(Debug)]
pub struct Brain {
    owner: EntityId,
    interests: AHashSet<StimulusKind>,
    goals: GoalSet,
    highest: Option<GoalId>,
    purge_orphaned_goals: bool,
}

impl Brain {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            interests: AHashSet::new(),
            goals: GoalSet::new(),
            highest: None,
            purge_orphaned_goals: true,
        }
    }

    pub fn with_interests(mut self, kinds: impl IntoIterator<Item = StimulusKind>) -> Self {
        self.interests.extend(kinds);
        self
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn add_interest(&mut self, kind: StimulusKind) {
        self.interests.insert(kind);
    }

    pub fn remove_interest(&mut self, kind: StimulusKind) {
        self.interests.remove(&kind);
    }

    pub fn is_interested(&self, kind: StimulusKind) -> bool {
        self.interests.contains(&kind)
    }

    /// Release goals whose emitter has vanished at the start of Evaluate
    pub fn set_purge_orphaned_goals(&mut self, enabled: bool) {
        self.purge_orphaned_goals = enabled;
    }

    /// Goal chosen by the most recent Evaluate phase
    pub fn highest(&self) -> Option<GoalId> {
        self.highest
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }

    pub fn goals_mut(&mut self) -> &mut GoalSet {
        &mut self.goals
    }

    /// Existing goal of `kind`, or a new one from the agent's factory
    pub fn define_goal<A: Agent + ?Sized>(
        &mut self,
        kind: GoalKind,
        agent: &mut A,
    ) -> Result<GoalId, Fault> {
        self.goals.define_goal(kind, |k| agent.create_goal(k))
    }

    /// Add an externally built goal. Skips the one-per-kind check.
    pub fn add_goal(&mut self, goal: Goal) -> GoalId {
        self.goals.push(goal)
    }

    pub fn find_goal_by_kind(&self, kind: GoalKind) -> Option<&Goal> {
        self.goals.find_by_kind(kind)
    }

    pub fn goal(&self, id: GoalId) -> Option<&Goal> {
        self.goals.get(id)
    }

    /// Goal at a position in insertion order
    pub fn get_goal(&self, index: usize) -> Option<&Goal> {
        self.goals.at(index)
    }

    pub fn count(&self) -> usize {
        self.goals.len()
    }

    /// Dispose of a goal. Returns false if it was not held.
    pub fn release_goal<A: Agent + ?Sized>(&mut self, id: GoalId, agent: &mut A) -> bool {
        let Some(goal) = self.goals.take(id) else {
            return false;
        };
        tracing::debug!(agent = %self.owner, goal = id.0, kind = ?goal.kind, "goal released");
        agent.goal_released(&goal);
        if self.highest == Some(id) {
            self.highest = None;
        }
        true
    }

    pub fn clear_goals<A: Agent + ?Sized>(&mut self, agent: &mut A) {
        for goal in self.goals.drain() {
            agent.goal_released(&goal);
        }
        self.highest = None;
    }

    /// Run one decision cycle
    pub fn think<A: Agent + ?Sized>(&mut self, agent: &mut A, emitters: &EmitterList) -> ThinkReport {
        let agent_id = agent.agent_id();
        debug_assert_eq!(agent_id, self.owner, "brain driven by an agent it does not belong to");
        let mut report = ThinkReport::new(agent_id, agent.type_name());

        self.run_phase(Phase::PrepareGoals, &mut report, |brain, _| {
            agent.prepare_goals(&mut brain.goals)
        });
        self.run_phase(Phase::Perceive, &mut report, |brain, report| {
            brain.perceive(agent, emitters, report)
        });
        self.run_phase(Phase::Evaluate, &mut report, |brain, report| {
            brain.evaluate(agent, emitters, report)
        });
        self.run_phase(Phase::Execute, &mut report, |brain, report| {
            brain.execute(agent, report)
        });

        report
    }

    fn run_phase<F>(&mut self, phase: Phase, report: &mut ThinkReport, body: F)
    where
        F: FnOnce(&mut Self, &mut ThinkReport) -> Result<(), Fault>,
    {
        if let Err(fault) = isolate(|| body(self, report)) {
            report.record(phase, fault);
        }
    }

    fn perceive<A: Agent + ?Sized>(
        &mut self,
        agent: &mut A,
        emitters: &EmitterList,
        report: &mut ThinkReport,
    ) -> Result<(), Fault> {
        let here = agent.position();

        // Linked goals follow their emitter (dynamic sources move)
        for goal in self.goals.iter_mut() {
            if let Some(emitter) = goal.emitter.and_then(|id| emitters.get_emitter(id)) {
                goal.target = Some(emitter.position);
            }
        }

        for emitter in emitters.iter() {
            if !self.interests.contains(&emitter.kind) {
                continue;
            }
            if !emitter.reaches(here) {
                continue;
            }
            if self.goals.find_by_emitter(emitter.id).is_some() {
                continue;
            }
            if !agent.is_aware_of(emitter)? {
                continue;
            }

            agent.prepare_emitter(emitter, &mut self.goals)?;
            report.perceived.push(emitter.id);
        }

        Ok(())
    }

    fn evaluate<A: Agent + ?Sized>(
        &mut self,
        agent: &mut A,
        emitters: &EmitterList,
        report: &mut ThinkReport,
    ) -> Result<(), Fault> {
        self.highest = None;
        let mut best_value = f32::NEG_INFINITY;

        if self.purge_orphaned_goals {
            let orphaned: Vec<GoalId> = self
                .goals
                .iter()
                .filter(|g| g.emitter.is_some_and(|e| !emitters.contains(e)))
                .map(Goal::id)
                .collect();
            for id in orphaned {
                if self.release_goal(id, agent) {
                    report.released.push(id);
                }
            }
        }

        for id in self.goals.ids() {
            let Some(goal) = self.goals.get_mut(id) else {
                continue;
            };

            if goal.duration.tick() {
                if self.release_goal(id, agent) {
                    report.released.push(id);
                }
                continue;
            }

            // Scoring faults are per goal so one bad goal cannot starve the rest
            let kind = goal.kind;
            let goal: &Goal = goal;
            match isolate(|| agent.evaluate_goal(goal)) {
                Ok(value) if value.is_nan() => {
                    report.record(Phase::Evaluate, Fault::InvalidScore { goal: id, kind });
                }
                Ok(value) => {
                    if let Some(goal) = self.goals.get_mut(id) {
                        goal.value = value;
                    }
                    if self.highest.is_none() || value > best_value {
                        self.highest = Some(id);
                        best_value = value;
                    }
                }
                Err(fault) => report.record(Phase::Evaluate, fault),
            }
        }

        Ok(())
    }

    fn execute<A: Agent + ?Sized>(
        &mut self,
        agent: &mut A,
        report: &mut ThinkReport,
    ) -> Result<(), Fault> {
        let Some(id) = self.highest else {
            return Ok(());
        };

        let goal = self.goals.get_mut(id).ok_or(Fault::MissingGoal(id))?;
        agent.execute_goal(goal)?;
        goal.progress += 1;

        let kind = goal.kind;
        let complete = goal.complete;
        report.executed = Some((id, kind));

        if complete && self.release_goal(id, agent) {
            report.released.push(id);
        }

        Ok(())
    }
}
