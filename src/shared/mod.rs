//! Shared components, resources, events, and system sets for Elvenvale.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly, except for reading
//! another domain's public resources inside its own systems.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;

// ═══════════════════════════════════════════════════════════════════════
// SCENE GEOMETRY
// ═══════════════════════════════════════════════════════════════════════

/// Simulated seconds covered by one scene tick.
pub const TICK_SECONDS: f32 = 0.016;

/// Horizontal wrap bound for roaming creatures.
pub const ROAM_WRAP_X: f32 = 2.7;

/// Ground band where elves walk.
pub const ELF_MIN_X: f32 = -1.8;
pub const ELF_MAX_X: f32 = 1.8;
pub const ELF_GROUND_Y: f32 = -0.7;

/// Campfire anchor; every fire particle is emitted relative to it.
pub const CAMPFIRE_POSITION: Vec2 = Vec2::new(-1.5, -0.6);

// ═══════════════════════════════════════════════════════════════════════
// WEATHER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Sunny,
    Rainy,
    Snowy,
}

impl Weather {
    /// Rain and snow suppress the campfire and the fair-weather creatures.
    pub fn is_precipitating(self) -> bool {
        matches!(self, Weather::Rainy | Weather::Snowy)
    }

    pub fn label(self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Rainy => "rainy",
            Weather::Snowy => "snowy",
        }
    }
}

impl std::str::FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunny" | "sun" => Ok(Weather::Sunny),
            "rainy" | "rain" => Ok(Weather::Rainy),
            "snowy" | "snow" => Ok(Weather::Snowy),
            other => Err(format!("Unknown weather '{}'", other)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TIME OF DAY
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Noon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Classifies a day phase in [0, 1).
    pub fn from_phase(phase: f32) -> Self {
        if (0.0..0.12).contains(&phase) {
            TimeOfDay::Morning
        } else if (0.12..0.44).contains(&phase) {
            TimeOfDay::Noon
        } else if (0.44..0.5).contains(&phase) {
            TimeOfDay::Evening
        } else {
            TimeOfDay::Night
        }
    }

    pub fn is_daylight(self) -> bool {
        matches!(self, TimeOfDay::Morning | TimeOfDay::Noon)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COMMON COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Scene-space position of a creature entity.
///
/// The scene uses one orthographic frame: x in [-2.5, 2.5],
/// y in [-1.5, 1.5], ground near y = -0.7.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ScenePosition(pub Vec2);

// ═══════════════════════════════════════════════════════════════════════
// TICK BOOKKEEPING
// ═══════════════════════════════════════════════════════════════════════

/// Number of scene ticks executed so far.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SceneTick(pub u64);

/// Deterministic RNG resource for all scene randomness.
///
/// Systems take `ResMut<SceneRng>` and draw from `rng.0` so identical seeds
/// produce identical scenes.
#[derive(Resource)]
pub struct SceneRng(pub ChaCha8Rng);

impl Default for SceneRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl SceneRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

pub const DEFAULT_SEED: u64 = 42;

// ═══════════════════════════════════════════════════════════════════════
// SYSTEM SETS
// ═══════════════════════════════════════════════════════════════════════

/// Ordered phases of one scene tick inside `FixedUpdate`.
///
/// The same chain orders the `Startup` population systems, so every draw
/// from `SceneRng` happens in a fixed order and a seed reproduces a scene
/// exactly. Later phases read what earlier phases wrote in the same tick
/// (puddle spawning reads the snow cover from `Accumulate`, for instance).
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneSet {
    /// Apply queued `SetWeatherEvent`s and re-evaluate population gates.
    Command,
    /// Tick counter and day phase.
    Clock,
    /// Continuous accumulators and the campfire.
    Accumulate,
    /// Sky and foliage ambience.
    Ambience,
    /// Elves, butterflies, fireflies, the fox.
    Creatures,
    /// Campfire pool, rain, snow, stars.
    Particles,
    /// Puddle spawning and state machines.
    Puddles,
    /// Redraw request for the rendering collaborator.
    Present,
}

fn scene_set_chain() -> impl IntoSystemSetConfigs {
    (
        SceneSet::Command,
        SceneSet::Clock,
        SceneSet::Accumulate,
        SceneSet::Ambience,
        SceneSet::Creatures,
        SceneSet::Particles,
        SceneSet::Puddles,
        SceneSet::Present,
    )
        .chain()
}

/// Core wiring every scene app needs before the domain plugins:
/// config, RNG, the 16 ms fixed step, and the `SceneSet` chain.
///
/// A `SceneConfig` inserted before this plugin is kept; otherwise the
/// defaults are used. The RNG is seeded from the config.
pub struct SceneCorePlugin;

impl Plugin for SceneCorePlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SceneConfig>()
            .cloned()
            .unwrap_or_default()
            .sanitized();
        app.insert_resource(SceneRng::from_seed_u64(config.seed))
            .insert_resource(config)
            .init_resource::<SceneTick>()
            .insert_resource(Time::<Fixed>::from_seconds(TICK_SECONDS as f64));

        app.configure_sets(FixedUpdate, scene_set_chain())
            .configure_sets(Startup, scene_set_chain());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// The single external command: change the weather mode.
///
/// Applied at the start of the next tick. Sending the current mode is a no-op.
#[derive(Event, Debug, Clone, Copy)]
pub struct SetWeatherEvent {
    pub weather: Weather,
}

/// Emitted once per actual mode change; the audio collaborator listens here.
#[derive(Event, Debug, Clone, Copy)]
pub struct WeatherChangedEvent {
    pub previous: Weather,
    pub current: Weather,
}

/// Emitted at the end of every tick once the snapshot is consistent.
#[derive(Event, Debug, Clone, Copy)]
pub struct RedrawRequestEvent {
    pub tick: u64,
}

// ═══════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════

/// Linearly interpolate between two floats.
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Returns `true` with probability `chance` (clamped to [0, 1]).
pub fn roll(rng: &mut ChaCha8Rng, chance: f32) -> bool {
    use rand::Rng;
    rng.gen::<f32>() < chance.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_time_of_day_thresholds() {
        assert_eq!(TimeOfDay::from_phase(0.0), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_phase(0.1199), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_phase(0.12), TimeOfDay::Noon);
        assert_eq!(TimeOfDay::from_phase(0.4399), TimeOfDay::Noon);
        assert_eq!(TimeOfDay::from_phase(0.44), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_phase(0.5), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_phase(0.999), TimeOfDay::Night);
    }

    #[test]
    fn test_precipitation_flags() {
        assert!(!Weather::Sunny.is_precipitating());
        assert!(Weather::Rainy.is_precipitating());
        assert!(Weather::Snowy.is_precipitating());
    }

    #[test]
    fn test_weather_parses_labels() {
        assert_eq!("Rainy".parse::<Weather>(), Ok(Weather::Rainy));
        assert_eq!(" snow ".parse::<Weather>(), Ok(Weather::Snowy));
        assert!("hail".parse::<Weather>().is_err());
    }

    #[test]
    fn test_scene_rng_is_deterministic() {
        let mut a = SceneRng::from_seed_u64(7);
        let mut b = SceneRng::from_seed_u64(7);
        let vals_a: Vec<f32> = (0..16).map(|_| a.0.gen::<f32>()).collect();
        let vals_b: Vec<f32> = (0..16).map(|_| b.0.gen::<f32>()).collect();
        assert_eq!(vals_a, vals_b);
    }

    #[test]
    fn test_roll_extremes() {
        let mut rng = SceneRng::default();
        for _ in 0..100 {
            assert!(!roll(&mut rng.0, 0.0));
            assert!(roll(&mut rng.0, 1.0));
        }
    }
}
