//! Puddle domain plugin for Elvenvale.
//!
//! Responsible for:
//! - Weather-gated puddle spawning with a cap and a non-overlap rule
//! - Snow-melt puddles while rain falls on lying snow
//! - The per-puddle grow / freeze / thaw / shrink state machine
//!
//! Every puddle steps independently, so puddles created at different times
//! sit in different stages at once.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{PuddleConfig, SceneConfig};
use crate::environment::accumulators::SnowCover;
use crate::shared::*;
use crate::weather::WeatherState;

pub struct PuddlesPlugin;

impl Plugin for PuddlesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PuddleField>().add_systems(
            FixedUpdate,
            update_puddles.in_set(SceneSet::Puddles),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DATA
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PuddleState {
    Growing,
    Full,
    Shrinking,
    Freezing,
    Frozen,
    Melting,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Puddle {
    pub position: Vec2,
    pub current_radius: f32,
    pub max_radius: f32,
    pub state: PuddleState,
    /// 0 is open water, 1 is solid ice.
    pub freeze_progress: f32,
}

impl Puddle {
    pub fn new(position: Vec2, max_radius: f32) -> Self {
        Self {
            position,
            current_radius: 0.0,
            max_radius,
            state: PuddleState::Growing,
            freeze_progress: 0.0,
        }
    }

    /// Overlap uses the max radii, so two growing puddles never meet.
    pub fn overlaps(&self, position: Vec2, max_radius: f32) -> bool {
        self.position.distance(position) < self.max_radius + max_radius
    }

    /// Water-to-ice colour with the frozen surface slightly more opaque.
    pub fn surface_color(&self) -> Color {
        let t = self.freeze_progress;
        Color::srgba(
            lerp_f32(0.15, 0.8, t),
            lerp_f32(0.3, 0.9, t),
            lerp_f32(0.5, 1.0, t),
            0.6 + 0.2 * t,
        )
    }
}

/// Rates applied by one puddle step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuddleRates {
    pub grow: f32,
    pub shrink: f32,
    /// Freeze or thaw amount for this step (`freeze_per_second * dt`).
    pub freeze: f32,
}

impl PuddleRates {
    pub fn from_config(config: &PuddleConfig, dt: f32) -> Self {
        Self {
            grow: config.grow_per_tick,
            shrink: config.shrink_per_tick,
            freeze: config.freeze_per_second * dt,
        }
    }
}

/// What the field should do with a puddle after it stepped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuddleFate {
    Keep,
    Remove,
}

// ═══════════════════════════════════════════════════════════════════════
// STATE MACHINE
// ═══════════════════════════════════════════════════════════════════════

/// Advances one puddle by one tick under `weather`.
///
/// Entry transitions (`Frozen -> Melting`, `Growing|Full -> Freezing`, ...)
/// happen first and the entered state then does its work in the same tick,
/// so a puddle caught mid-growth by snow skips `Full` and starts freezing
/// immediately. States with no rule for the current weather hold still.
pub fn step_puddle(puddle: &mut Puddle, weather: Weather, rates: &PuddleRates) -> PuddleFate {
    match weather {
        Weather::Rainy => {
            if puddle.state == PuddleState::Frozen {
                puddle.state = PuddleState::Melting;
            }
            match puddle.state {
                PuddleState::Growing => {
                    puddle.current_radius =
                        (puddle.current_radius + rates.grow).min(puddle.max_radius);
                    if puddle.current_radius >= puddle.max_radius {
                        puddle.state = PuddleState::Full;
                    }
                }
                PuddleState::Melting => {
                    if thaw(puddle, rates.freeze) {
                        puddle.state = PuddleState::Full;
                    }
                }
                _ => {}
            }
        }
        Weather::Snowy => {
            if matches!(puddle.state, PuddleState::Growing | PuddleState::Full) {
                puddle.state = PuddleState::Freezing;
            }
            if puddle.state == PuddleState::Freezing {
                puddle.freeze_progress = (puddle.freeze_progress + rates.freeze).min(1.0);
                if puddle.freeze_progress >= 1.0 {
                    puddle.state = PuddleState::Frozen;
                }
            }
        }
        Weather::Sunny => {
            match puddle.state {
                PuddleState::Frozen => puddle.state = PuddleState::Melting,
                PuddleState::Growing | PuddleState::Full => puddle.state = PuddleState::Shrinking,
                _ => {}
            }
            if puddle.state == PuddleState::Melting && thaw(puddle, rates.freeze) {
                puddle.state = PuddleState::Shrinking;
            }
            if puddle.state == PuddleState::Shrinking {
                puddle.current_radius -= rates.shrink;
                if puddle.current_radius <= 0.0 {
                    puddle.current_radius = 0.0;
                    return PuddleFate::Remove;
                }
            }
        }
    }
    PuddleFate::Keep
}

/// Lowers freeze progress; returns true once it hits zero.
fn thaw(puddle: &mut Puddle, amount: f32) -> bool {
    puddle.freeze_progress = (puddle.freeze_progress - amount).max(0.0);
    puddle.freeze_progress <= 0.0
}

// ═══════════════════════════════════════════════════════════════════════
// FIELD
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct PuddleField {
    puddles: Vec<Puddle>,
}

impl PuddleField {
    pub fn puddles(&self) -> &[Puddle] {
        &self.puddles
    }

    pub fn len(&self) -> usize {
        self.puddles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puddles.is_empty()
    }

    /// Inserts a puddle directly. Returns false at the cap or on overlap.
    pub fn insert(&mut self, cap: usize, puddle: Puddle) -> bool {
        if self.puddles.len() >= cap
            || self
                .puddles
                .iter()
                .any(|p| p.overlaps(puddle.position, puddle.max_radius))
        {
            return false;
        }
        self.puddles.push(puddle);
        true
    }

    /// Samples up to `attempts` candidates and keeps the first that fits.
    pub fn try_spawn(
        &mut self,
        cap: usize,
        attempts: u32,
        radius_range: std::ops::Range<f32>,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        if self.puddles.len() >= cap {
            return false;
        }
        for _ in 0..attempts {
            let position = Vec2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-0.8..-0.1));
            let max_radius = rng.gen_range(radius_range.clone());
            if self.insert(cap, Puddle::new(position, max_radius)) {
                return true;
            }
        }
        false
    }

    /// Steps every puddle and swap-removes the ones that dried up.
    pub fn step(&mut self, weather: Weather, rates: &PuddleRates) {
        let mut i = 0;
        while i < self.puddles.len() {
            match step_puddle(&mut self.puddles[i], weather, rates) {
                PuddleFate::Remove => {
                    self.puddles.swap_remove(i);
                }
                PuddleFate::Keep => i += 1,
            }
        }
    }
}

const RAIN_PUDDLE_RADIUS: std::ops::Range<f32> = 0.1..0.3;
const MELT_PUDDLE_RADIUS: std::ops::Range<f32> = 0.1..0.2;

pub fn update_puddles(
    weather: Res<WeatherState>,
    config: Res<SceneConfig>,
    snow: Res<SnowCover>,
    mut field: ResMut<PuddleField>,
    mut rng: ResMut<SceneRng>,
) {
    let weather = weather.current();
    let cfg = &config.puddles;

    if weather == Weather::Rainy {
        if snow.value() > 0.0
            && roll(&mut rng.0, cfg.melt_spawn_chance)
            && field.try_spawn(cfg.cap, cfg.spawn_attempts, MELT_PUDDLE_RADIUS, &mut rng.0)
        {
            debug!("[Puddles] Snow-melt puddle formed ({} total)", field.len());
        }
        if roll(&mut rng.0, cfg.spawn_chance)
            && field.try_spawn(cfg.cap, cfg.spawn_attempts, RAIN_PUDDLE_RADIUS, &mut rng.0)
        {
            debug!("[Puddles] Rain puddle formed ({} total)", field.len());
        }
    }

    field.step(weather, &PuddleRates::from_config(cfg, TICK_SECONDS));
}
