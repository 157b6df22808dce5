//! Tick system - orchestrates one simulation step
//!
//! Order within a tick:
//! scheduled events -> emitter aging/tracking -> every brain thinks -> positions sync
//! -> events raised while thinking are queued for the next tick.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::brain::{Brain, GoalKind, GoalTable, PhaseFault};
use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, Tick, Vec2};
use crate::events::{EventContext, EventPayload};
use crate::simulation::listener::StimulusListener;
use crate::simulation::villager::{villager_goal_table, Villager, VillagerState};
use crate::simulation::world::World;
use crate::stimulus::{EmitterId, EmitterList};

/// A villager and the brain driving it
pub struct AgentSlot {
    pub villager: Villager,
    pub brain: Brain,
}

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: Tick,
    /// Deferred events delivered at the start of the tick
    pub delivered_events: usize,
    pub expired_emitters: Vec<EmitterId>,
    pub active_emitters: usize,
    /// Which goal each agent executed, if any
    pub executions: Vec<(EntityId, GoalKind)>,
    pub faults: Vec<PhaseFault>,
}

pub struct Simulation {
    config: EngineConfig,
    current_tick: Tick,
    events: EventContext,
    emitters: Rc<RefCell<EmitterList>>,
    world: Rc<RefCell<World>>,
    agents: Vec<AgentSlot>,
    table: Rc<GoalTable<VillagerState>>,
}

impl Simulation {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let events = EventContext::new();
        let emitters = Rc::new(RefCell::new(EmitterList::new()));
        let world = Rc::new(RefCell::new(World::new()));
        events.subscribe(Rc::new(StimulusListener::new(
            Rc::clone(&emitters),
            Rc::clone(&world),
        )));

        Ok(Self {
            config,
            current_tick: 0,
            events,
            emitters,
            world,
            agents: Vec::new(),
            table: Rc::new(villager_goal_table()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn events(&self) -> &EventContext {
        &self.events
    }

    pub fn emitters(&self) -> Ref<'_, EmitterList> {
        self.emitters.borrow()
    }

    pub fn world(&self) -> Ref<'_, World> {
        self.world.borrow()
    }

    pub fn agents(&self) -> &[AgentSlot] {
        &self.agents
    }

    pub fn agent(&self, id: EntityId) -> Option<&AgentSlot> {
        self.agents.iter().find(|slot| slot.villager.state.id == id)
    }

    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut AgentSlot> {
        self.agents.iter_mut().find(|slot| slot.villager.state.id == id)
    }

    pub fn spawn_villager(&mut self, name: impl Into<String>, position: Vec2) -> EntityId {
        let name = name.into();
        let id = self.world.borrow_mut().spawn(name.clone(), position);

        let villager = Villager::new(id, name, position, &self.config, Rc::clone(&self.table));
        let mut brain = Brain::new(id).with_interests(self.config.villager.interests.iter().copied());
        brain.set_purge_orphaned_goals(self.config.purge_orphaned_goals);

        self.agents.push(AgentSlot { villager, brain });
        id
    }

    /// Spawn a non-thinking entity (a stimulus source such as a wolf or a bell)
    pub fn spawn_prop(&mut self, name: impl Into<String>, position: Vec2) -> EntityId {
        self.world.borrow_mut().spawn(name, position)
    }

    pub fn move_entity(&mut self, id: EntityId, position: Vec2) -> bool {
        if let Some(slot) = self.agent_mut(id) {
            slot.villager.state.position = position;
        }
        self.world.borrow_mut().set_position(id, position)
    }

    /// Remove an entity from the world through the bus
    ///
    /// Emitters tracking it are pinned at its last position on the next update.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<bool> {
        if let Some(index) = self.agents.iter().position(|s| s.villager.state.id == id) {
            let mut slot = self.agents.remove(index);
            slot.brain.clear_goals(&mut slot.villager);
        }
        let known = self.world.borrow().contains(id);
        self.events.emit(EventPayload::EntityRemoved { entity: id })?;
        Ok(known)
    }

    /// Deliver immediately
    pub fn emit(&self, payload: EventPayload) -> Result<bool> {
        self.events.emit(payload)
    }

    /// Deliver at the start of the next tick
    pub fn schedule(&self, payload: EventPayload) {
        self.events.schedule(self.events.create_event(payload));
    }

    pub fn run_tick(&mut self) -> TickReport {
        self.current_tick += 1;
        self.events.advance_to(self.current_tick);

        let delivered_events = self.events.update();

        let expired_emitters = {
            let world = self.world.borrow();
            self.emitters
                .borrow_mut()
                .update_emitters(self.config.emitter_tick_step, &*world)
        };

        let mut report = TickReport {
            tick: self.current_tick,
            delivered_events,
            expired_emitters,
            ..Default::default()
        };

        {
            let emitters = self.emitters.borrow();
            for slot in &mut self.agents {
                slot.villager.state.update_needs();
                let think = slot.brain.think(&mut slot.villager, &emitters);
                if let Some((_, kind)) = think.executed {
                    report.executions.push((think.agent, kind));
                }
                report.faults.extend(think.faults);
            }
            report.active_emitters = emitters.count();
        }

        let mut world = self.world.borrow_mut();
        for slot in &mut self.agents {
            world.set_position(slot.villager.state.id, slot.villager.state.position);
            for payload in slot.villager.state.outbox.drain(..) {
                self.events.schedule(self.events.create_event(payload));
            }
        }

        tracing::debug!(
            tick = report.tick,
            delivered = report.delivered_events,
            expired = report.expired_emitters.len(),
            executed = report.executions.len(),
            faults = report.faults.len(),
            "tick complete"
        );

        report
    }
}
