//! Scene tuning: every rate, cap, and chance the simulation reads.
//!
//! Defaults reproduce the stock village scene. A host may load overrides
//! from a RON file with [`load_config`]; anything omitted keeps its default.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::shared::{Weather, DEFAULT_SEED};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub seed: u64,
    pub clock: ClockConfig,
    pub accumulators: AccumulatorConfig,
    pub particles: ParticleConfig,
    pub puddles: PuddleConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            clock: ClockConfig::default(),
            accumulators: AccumulatorConfig::default(),
            particles: ParticleConfig::default(),
            puddles: PuddleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Day-phase advance per tick. 0.0002 gives a 5000-tick day.
    pub rate_per_tick: f32,
    pub initial_phase: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            rate_per_tick: 0.0002,
            initial_phase: 0.1,
        }
    }
}

/// A signed per-tick rate for each weather mode.
pub trait WeatherRates {
    fn rate(&self, weather: Weather) -> f32;
}

/// Snow cover drift. Omitted modes keep their stock rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowCoverRates {
    pub sunny: f32,
    pub rainy: f32,
    pub snowy: f32,
}

impl Default for SnowCoverRates {
    fn default() -> Self {
        Self {
            sunny: -0.003,
            rainy: -0.002,
            snowy: 0.0015,
        }
    }
}

impl WeatherRates for SnowCoverRates {
    fn rate(&self, weather: Weather) -> f32 {
        match weather {
            Weather::Sunny => self.sunny,
            Weather::Rainy => self.rainy,
            Weather::Snowy => self.snowy,
        }
    }
}

/// River freeze drift. Omitted modes keep their stock rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverFreezeRates {
    pub sunny: f32,
    pub rainy: f32,
    pub snowy: f32,
}

impl Default for RiverFreezeRates {
    fn default() -> Self {
        Self {
            sunny: -0.0025,
            rainy: -0.0025,
            snowy: 0.0025,
        }
    }
}

impl WeatherRates for RiverFreezeRates {
    fn rate(&self, weather: Weather) -> f32 {
        match weather {
            Weather::Sunny => self.sunny,
            Weather::Rainy => self.rainy,
            Weather::Snowy => self.snowy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulatorConfig {
    pub snow_cover: SnowCoverRates,
    pub river_freeze: RiverFreezeRates,
    /// Flow-offset speed at zero freeze; the offset runs backwards.
    pub flow_base: f32,
    pub flow_rainy: f32,
    pub glow_per_tick: f32,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            snow_cover: SnowCoverRates::default(),
            river_freeze: RiverFreezeRates::default(),
            flow_base: 0.02,
            flow_rainy: 0.06,
            glow_per_tick: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Hard cap shared by sparks, embers, and smoke.
    pub cap: usize,
    pub spark_chance: f32,
    pub ember_chance: f32,
    pub smoke_chance: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            cap: 200,
            spark_chance: 1.0 / 4.0,
            ember_chance: 1.0 / 15.0,
            smoke_chance: 1.0 / 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuddleConfig {
    pub cap: usize,
    pub spawn_chance: f32,
    pub spawn_attempts: u32,
    /// Chance per tick of a snow-melt puddle while rain falls on snow.
    pub melt_spawn_chance: f32,
    pub grow_per_tick: f32,
    pub shrink_per_tick: f32,
    /// Freeze progress per simulated second (both directions).
    pub freeze_per_second: f32,
}

impl Default for PuddleConfig {
    fn default() -> Self {
        Self {
            cap: 15,
            spawn_chance: 1.0 / 150.0,
            spawn_attempts: 10,
            melt_spawn_chance: 1.0 / 100.0,
            grow_per_tick: 0.0005,
            shrink_per_tick: 0.0005,
            freeze_per_second: 2.0,
        }
    }
}

impl SceneConfig {
    /// Clamps every value into a range the simulation can run with.
    ///
    /// Chances land in [0, 1], magnitudes become non-negative, and the
    /// initial phase wraps into [0, 1).
    pub fn sanitized(mut self) -> Self {
        self.clock.rate_per_tick = self.clock.rate_per_tick.max(0.0);
        self.clock.initial_phase = self.clock.initial_phase.rem_euclid(1.0);
        if self.clock.initial_phase >= 1.0 {
            self.clock.initial_phase = 0.0;
        }

        let acc = &mut self.accumulators;
        acc.flow_base = acc.flow_base.max(0.0);
        acc.flow_rainy = acc.flow_rainy.max(0.0);
        acc.glow_per_tick = acc.glow_per_tick.max(0.0);

        let p = &mut self.particles;
        p.spark_chance = p.spark_chance.clamp(0.0, 1.0);
        p.ember_chance = p.ember_chance.clamp(0.0, 1.0);
        p.smoke_chance = p.smoke_chance.clamp(0.0, 1.0);

        let pd = &mut self.puddles;
        pd.spawn_chance = pd.spawn_chance.clamp(0.0, 1.0);
        pd.melt_spawn_chance = pd.melt_spawn_chance.clamp(0.0, 1.0);
        pd.spawn_attempts = pd.spawn_attempts.max(1);
        pd.grow_per_tick = pd.grow_per_tick.max(0.0);
        pd.shrink_per_tick = pd.shrink_per_tick.max(f32::EPSILON);
        pd.freeze_per_second = pd.freeze_per_second.max(0.0);
        self
    }
}

/// Parses a RON document into a sanitized config.
pub fn parse_config(source: &str) -> Result<SceneConfig, String> {
    let config: SceneConfig =
        ron::from_str(source).map_err(|e| format!("Config parse failed: {}", e))?;
    Ok(config.sanitized())
}

/// Reads and parses a RON config file.
pub fn load_config(path: &Path) -> Result<SceneConfig, String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_config(&source)
}

/// Serializes a config back to pretty RON (used by the runner's `--print-config`).
pub fn config_to_ron(config: &SceneConfig) -> Result<String, String> {
    ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::default())
        .map_err(|e| format!("Config serialization failed: {}", e))
}
