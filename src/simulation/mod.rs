pub mod listener;
pub mod tick;
pub mod villager;
pub mod world;

pub use listener::StimulusListener;
pub use tick::{AgentSlot, Simulation, TickReport};
pub use villager::{goal_for_stimulus, villager_goal_table, Villager, VillagerState};
pub use world::World;
