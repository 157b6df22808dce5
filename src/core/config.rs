//! Engine configuration with documented constants
//!
//! Loaded from TOML. Every field has a default so partial files are fine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::stimulus::StimulusKind;

/// Top-level configuration for the decision engine and its demo simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Elapsed ticks fed to the emitter registry on every simulation tick
    pub emitter_tick_step: u32,

    /// Release goals whose linked emitter has expired at the start of Evaluate
    ///
    /// Without this, a goal bound to a vanished stimulus lingers until its own
    /// duration runs out.
    pub purge_orphaned_goals: bool,

    /// `EnvFilter` directive used by the binary when `RUST_LOG` is unset
    pub log_filter: String,

    pub goals: GoalDurations,

    pub villager: VillagerConfig,
}

/// Lifetime (in thinks) of reactive goals spawned from stimuli
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalDurations {
    pub investigate: u32,
    pub flee: u32,
    pub forage: u32,
}

/// Tuning for the reference villager agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VillagerConfig {
    /// Stimulus kinds a villager's brain notices
    pub interests: Vec<StimulusKind>,

    /// World units moved per executed tick
    pub walk_speed: f32,

    /// Beyond this distance a villager is never aware of a stimulus, whatever its radius
    pub awareness_range: f32,

    /// Radius of the alarm a fleeing villager raises
    pub alarm_radius: f32,

    /// Lifetime of that alarm in ticks
    pub alarm_duration: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            emitter_tick_step: 1,
            purge_orphaned_goals: true,
            log_filter: "arc_sentinel=info".into(),
            goals: GoalDurations::default(),
            villager: VillagerConfig::default(),
        }
    }
}

impl Default for GoalDurations {
    fn default() -> Self {
        Self {
            investigate: 8,
            flee: 5,
            forage: 12,
        }
    }
}

impl Default for VillagerConfig {
    fn default() -> Self {
        Self {
            interests: vec![
                StimulusKind::Sound,
                StimulusKind::Danger,
                StimulusKind::Food,
                StimulusKind::Alarm,
            ],
            walk_speed: 1.5,
            awareness_range: 40.0,
            alarm_radius: 15.0,
            alarm_duration: 3,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.emitter_tick_step == 0 {
            return Err(EngineError::InvalidConfig(
                "emitter_tick_step must be at least 1".into(),
            ));
        }

        if !(self.villager.walk_speed > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "villager.walk_speed ({}) must be positive",
                self.villager.walk_speed
            )));
        }

        if !(self.villager.awareness_range >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "villager.awareness_range ({}) must not be negative",
                self.villager.awareness_range
            )));
        }

        if self.goals.investigate == 0 || self.goals.flee == 0 || self.goals.forage == 0 {
            return Err(EngineError::InvalidConfig(
                "goal durations must be at least one tick".into(),
            ));
        }

        Ok(())
    }
}
