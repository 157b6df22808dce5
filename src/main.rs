//! Arc Sentinel - headless village runner
//!
//! Spawns a handful of villagers, lets a wolf prowl toward them, rings a
//! bell now and then, and prints what every brain decided each tick.

use std::path::PathBuf;

use arc_sentinel::core::error::Result;
use arc_sentinel::core::{EngineConfig, EntityId, Vec2};
use arc_sentinel::events::EventPayload;
use arc_sentinel::simulation::{Simulation, TickReport};
use arc_sentinel::stimulus::StimulusKind;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless village runner - watch brains react to stimuli
#[derive(Parser, Debug)]
#[command(name = "arc-sentinel")]
#[command(about = "Run a headless village and report each agent's decisions")]
struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 60)]
    ticks: u64,

    /// Number of villagers to spawn
    #[arg(long, default_value_t = 8)]
    villagers: usize,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Engine config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,
}

/// JSON output structure, one line per tick
#[derive(Serialize)]
struct TickSummary {
    tick: u64,
    delivered_events: usize,
    expired_emitters: usize,
    active_emitters: usize,
    executions: Vec<Execution>,
    faults: Vec<String>,
}

#[derive(Serialize)]
struct Execution {
    agent: String,
    goal: String,
}

fn summarize(sim: &Simulation, report: &TickReport) -> TickSummary {
    let world = sim.world();
    TickSummary {
        tick: report.tick,
        delivered_events: report.delivered_events,
        expired_emitters: report.expired_emitters.len(),
        active_emitters: report.active_emitters,
        executions: report
            .executions
            .iter()
            .map(|(agent, kind)| Execution {
                agent: world.name(*agent).unwrap_or("?").to_string(),
                goal: format!("{:?}", kind),
            })
            .collect(),
        faults: report
            .faults
            .iter()
            .map(|f| format!("{} [{}]: {}", f.agent_type, f.phase, f.fault))
            .collect(),
    }
}

fn print_text(summary: &TickSummary) {
    let actions: Vec<String> = summary
        .executions
        .iter()
        .map(|e| format!("{}={}", e.agent, e.goal))
        .collect();
    println!(
        "tick {:>4} | events {:>2} | emitters {:>2} (-{}) | {}",
        summary.tick,
        summary.delivered_events,
        summary.active_emitters,
        summary.expired_emitters,
        actions.join(" ")
    );
    for fault in &summary.faults {
        println!("           fault: {}", fault);
    }
}

fn bell_ring(bell: EntityId, rng: &mut ChaCha8Rng) -> EventPayload {
    EventPayload::Stimulus {
        kind: StimulusKind::Sound,
        source: bell,
        position: Vec2::new(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0)),
        radius: 18.0,
        duration: 6,
        dynamic: false,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, villagers = args.villagers, ticks = args.ticks, "Arc Sentinel starting");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut sim = Simulation::new(config)?;

    for i in 0..args.villagers {
        let home = Vec2::new(rng.gen_range(-25.0..25.0), rng.gen_range(-25.0..25.0));
        sim.spawn_villager(format!("Villager{}", i + 1), home);
    }

    let berries_at = Vec2::new(rng.gen_range(-15.0..15.0), rng.gen_range(-15.0..15.0));
    let berries = sim.spawn_prop("Berry bush", berries_at);
    sim.emit(EventPayload::Stimulus {
        kind: StimulusKind::Food,
        source: berries,
        position: berries_at,
        radius: 30.0,
        duration: 0,
        dynamic: false,
    })?;

    let mut wolf_at = Vec2::new(45.0, 45.0);
    let wolf = sim.spawn_prop("Wolf", wolf_at);
    sim.emit(EventPayload::Stimulus {
        kind: StimulusKind::Danger,
        source: wolf,
        position: wolf_at,
        radius: 12.0,
        duration: 0,
        dynamic: true,
    })?;

    let bell = sim.spawn_prop("Bell", Vec2::default());
    let wolf_leaves_at = args.ticks * 3 / 4;

    for tick in 1..=args.ticks {
        if tick < wolf_leaves_at {
            wolf_at = wolf_at.step_toward(Vec2::default(), 1.0);
            sim.move_entity(wolf, wolf_at);
        } else if tick == wolf_leaves_at {
            sim.remove_entity(wolf)?;
            tracing::info!(tick, "the wolf slinks off");
        }

        if rng.gen_bool(0.1) {
            sim.schedule(bell_ring(bell, &mut rng));
        }

        let report = sim.run_tick();
        let summary = summarize(&sim, &report);
        if args.format == "json" {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            print_text(&summary);
        }
    }

    tracing::info!(
        ticks = sim.current_tick(),
        delivered = sim.events().scheduler().delivered_total(),
        "simulation finished"
    );
    Ok(())
}
