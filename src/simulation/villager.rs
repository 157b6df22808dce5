//! Villager - the reference agent
//!
//! Villagers idle near home, walk over to noises, run from danger and go
//! eat when hungry. A villager fleeing real danger (not someone else's
//! alarm) raises an alarm of its own, delivered to the others next tick.

use std::rc::Rc;

use crate::brain::{Agent, Fault, Goal, GoalDuration, GoalKind, GoalSet, GoalTable};
use crate::core::config::{EngineConfig, GoalDurations};
use crate::core::types::{EntityId, Vec2};
use crate::events::EventPayload;
use crate::stimulus::{Emitter, StimulusKind};

/// How far a fleeing villager runs before feeling safe
pub const SAFE_DISTANCE: f32 = 25.0;

/// Close enough to count as having arrived
const ARRIVAL_DISTANCE: f32 = 0.5;

/// Everything goal behaviors may read or change
#[derive(Debug, Clone)]
pub struct VillagerState {
    pub id: EntityId,
    pub name: String,
    pub position: Vec2,
    pub home: Vec2,
    /// 0.0 = full, 1.0 = starving
    pub hunger: f32,
    /// 0.0 = calm, 1.0 = terrified
    pub fear: f32,
    pub walk_speed: f32,
    pub alarm_radius: f32,
    pub alarm_duration: i32,
    /// Events to schedule once the tick's thinking is done
    pub outbox: Vec<EventPayload>,
}

impl VillagerState {
    /// Per-tick drift: hunger builds, fear fades
    pub fn update_needs(&mut self) {
        self.hunger = (self.hunger + 0.01).min(1.0);
        self.fear = (self.fear - 0.05).max(0.0);
    }
}

fn target_of(goal: &Goal, hook: &'static str) -> Result<Vec2, Fault> {
    goal.target
        .ok_or_else(|| Fault::hook(hook, format!("{:?} goal has no target", goal.kind)))
}

fn score_idle(_goal: &Goal, _state: &VillagerState) -> Result<f32, Fault> {
    Ok(0.1)
}

fn score_investigate(goal: &Goal, state: &VillagerState) -> Result<f32, Fault> {
    let target = target_of(goal, "score_investigate")?;
    let closeness = 1.0 / (1.0 + state.position.distance(&target) / 10.0);
    Ok(0.3 + 0.2 * closeness - 0.3 * state.fear)
}

fn score_flee(_goal: &Goal, state: &VillagerState) -> Result<f32, Fault> {
    Ok(0.7 + 0.3 * state.fear)
}

fn score_forage(_goal: &Goal, state: &VillagerState) -> Result<f32, Fault> {
    Ok(0.9 * state.hunger)
}

fn execute_idle(_goal: &mut Goal, state: &mut VillagerState) -> Result<(), Fault> {
    state.position = state.position.step_toward(state.home, state.walk_speed * 0.5);
    Ok(())
}

fn execute_investigate(goal: &mut Goal, state: &mut VillagerState) -> Result<(), Fault> {
    let target = target_of(goal, "execute_investigate")?;
    state.position = state.position.step_toward(target, state.walk_speed);
    if state.position.distance(&target) <= ARRIVAL_DISTANCE {
        goal.mark_complete();
    }
    Ok(())
}

fn execute_flee(goal: &mut Goal, state: &mut VillagerState) -> Result<(), Fault> {
    let threat = target_of(goal, "execute_flee")?;

    if goal.progress == 0 && goal.stimulus == Some(StimulusKind::Danger) {
        state.outbox.push(EventPayload::Stimulus {
            kind: StimulusKind::Alarm,
            source: state.id,
            position: state.position,
            radius: state.alarm_radius,
            duration: state.alarm_duration,
            dynamic: false,
        });
    }

    let mut away = (state.position - threat).normalize();
    if away == Vec2::default() {
        // Standing right on the threat; any direction will do
        away = Vec2::new(1.0, 0.0);
    }
    state.position = state.position + away * state.walk_speed;
    state.fear = (state.fear + 0.2).min(1.0);

    if state.position.distance(&threat) >= SAFE_DISTANCE {
        goal.mark_complete();
    }
    Ok(())
}

fn execute_forage(goal: &mut Goal, state: &mut VillagerState) -> Result<(), Fault> {
    let food = target_of(goal, "execute_forage")?;
    state.position = state.position.step_toward(food, state.walk_speed);
    if state.position.distance(&food) <= ARRIVAL_DISTANCE {
        state.hunger = (state.hunger - 0.6).max(0.0);
        goal.mark_complete();
    }
    Ok(())
}

/// Behavior table shared by every villager
pub fn villager_goal_table() -> GoalTable<VillagerState> {
    let mut table: GoalTable<VillagerState> = GoalTable::new();
    table
        .register(GoalKind::Idle, score_idle, execute_idle)
        .register(GoalKind::Investigate, score_investigate, execute_investigate)
        .register(GoalKind::Flee, score_flee, execute_flee)
        .register(GoalKind::Forage, score_forage, execute_forage);
    table
}

/// Which goal a perceived stimulus turns into
pub fn goal_for_stimulus(kind: StimulusKind) -> GoalKind {
    match kind {
        StimulusKind::Sound | StimulusKind::Sight => GoalKind::Investigate,
        StimulusKind::Danger | StimulusKind::Alarm => GoalKind::Flee,
        StimulusKind::Food | StimulusKind::Smell => GoalKind::Forage,
    }
}

pub struct Villager {
    pub state: VillagerState,
    table: Rc<GoalTable<VillagerState>>,
    awareness_range: f32,
    durations: GoalDurations,
}

impl Villager {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        position: Vec2,
        config: &EngineConfig,
        table: Rc<GoalTable<VillagerState>>,
    ) -> Self {
        Self {
            state: VillagerState {
                id,
                name: name.into(),
                position,
                home: position,
                hunger: 0.0,
                fear: 0.0,
                walk_speed: config.villager.walk_speed,
                alarm_radius: config.villager.alarm_radius,
                alarm_duration: config.villager.alarm_duration,
                outbox: Vec::new(),
            },
            table,
            awareness_range: config.villager.awareness_range,
            durations: config.goals.clone(),
        }
    }

    fn duration_for(&self, kind: GoalKind) -> GoalDuration {
        match kind {
            GoalKind::Idle => GoalDuration::Persistent,
            GoalKind::Investigate => GoalDuration::Ticks(self.durations.investigate),
            GoalKind::Flee => GoalDuration::Ticks(self.durations.flee),
            GoalKind::Forage => GoalDuration::Ticks(self.durations.forage),
        }
    }
}

impl Agent for Villager {
    fn agent_id(&self) -> EntityId {
        self.state.id
    }

    fn position(&self) -> Vec2 {
        self.state.position
    }

    fn prepare_goals(&mut self, goals: &mut GoalSet) -> Result<(), Fault> {
        goals.define_goal(GoalKind::Idle, |kind| self.create_goal(kind))?;
        Ok(())
    }

    fn create_goal(&mut self, kind: GoalKind) -> Result<Goal, Fault> {
        if !self.table.handles(kind) {
            return Err(Fault::NoBehavior(kind));
        }
        Ok(Goal::new(kind).with_duration(self.duration_for(kind)))
    }

    fn is_aware_of(&self, emitter: &Emitter) -> Result<bool, Fault> {
        // Nobody reacts to their own alarm
        if emitter.source == self.state.id {
            return Ok(false);
        }
        Ok(self.state.position.distance(&emitter.position) <= self.awareness_range)
    }

    fn prepare_emitter(&mut self, emitter: &Emitter, goals: &mut GoalSet) -> Result<(), Fault> {
        let goal = self.create_goal(goal_for_stimulus(emitter.kind))?.bound_to(emitter);
        tracing::debug!(
            villager = %self.state.name,
            kind = ?goal.kind,
            emitter = emitter.id.0,
            "stimulus perceived"
        );
        goals.push(goal);
        Ok(())
    }

    fn evaluate_goal(&self, goal: &Goal) -> Result<f32, Fault> {
        self.table.score(goal, &self.state)
    }

    fn execute_goal(&mut self, goal: &mut Goal) -> Result<(), Fault> {
        self.table.execute(goal, &mut self.state)
    }

    fn goal_released(&mut self, goal: &Goal) {
        tracing::trace!(villager = %self.state.name, kind = ?goal.kind, "goal released");
    }
}
