//! Continuous accumulators: snow cover, river freeze and flow, glow phase.
//!
//! Each drifts at a bounded, weather-indexed rate once per tick instead of
//! snapping to a target, so a mid-animation weather change never pops.

use bevy::prelude::*;
use serde::Serialize;

use crate::config::{SceneConfig, WeatherRates};
use crate::shared::*;
use crate::weather::WeatherState;

/// A scalar in [0, 1] moved by a signed per-weather rate each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundedAccumulator {
    value: f32,
}

impl BoundedAccumulator {
    pub fn new(value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn step(&mut self, rates: &impl WeatherRates, weather: Weather) {
        self.value = (self.value + rates.rate(weather)).clamp(0.0, 1.0);
    }
}

/// How much of the ground is covered in snow.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnowCover(pub BoundedAccumulator);

impl Default for SnowCover {
    fn default() -> Self {
        Self(BoundedAccumulator::new(0.0))
    }
}

impl SnowCover {
    pub fn value(&self) -> f32 {
        self.0.value()
    }
}

/// Foreground river: freeze fraction and an unbounded flow phase.
///
/// The flow offset runs backwards and is only ever consumed through
/// trigonometric functions downstream, so it is never wrapped.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiverState {
    pub freeze: BoundedAccumulator,
    pub flow_offset: f32,
}

impl Default for RiverState {
    fn default() -> Self {
        Self {
            freeze: BoundedAccumulator::new(0.0),
            flow_offset: 0.0,
        }
    }
}

impl RiverState {
    /// Frozen rivers flow slower: `rate = base * (1 - freeze)`.
    pub fn flow_rate(&self, weather: Weather, base: f32, rainy: f32) -> f32 {
        let speed = if weather == Weather::Rainy { rainy } else { base };
        speed * (1.0 - self.freeze.value())
    }

    pub fn step(&mut self, weather: Weather, config: &crate::config::AccumulatorConfig) {
        self.freeze.step(&config.river_freeze, weather);
        self.flow_offset -= self.flow_rate(weather, config.flow_base, config.flow_rainy);
    }
}

/// Shared shimmer phase for the crystal and star twinkle.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GlowPhase(pub f32);

pub fn update_accumulators(
    weather: Res<WeatherState>,
    config: Res<SceneConfig>,
    mut snow: ResMut<SnowCover>,
    mut river: ResMut<RiverState>,
    mut glow: ResMut<GlowPhase>,
) {
    let weather = weather.current();
    let acc = &config.accumulators;
    glow.0 += acc.glow_per_tick;
    snow.0.step(&acc.snow_cover, weather);
    river.step(weather, acc);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccumulatorConfig;

    #[test]
    fn test_snow_cover_saturates_and_stays_clamped() {
        let rates = AccumulatorConfig::default().snow_cover;
        let mut snow = BoundedAccumulator::new(0.0);
        for _ in 0..10_000 {
            snow.step(&rates, Weather::Snowy);
            assert!((0.0..=1.0).contains(&snow.value()));
        }
        assert_eq!(snow.value(), 1.0);

        for _ in 0..10_000 {
            snow.step(&rates, Weather::Rainy);
            assert!((0.0..=1.0).contains(&snow.value()));
        }
        assert_eq!(snow.value(), 0.0);
    }

    #[test]
    fn test_sun_melts_faster_than_rain() {
        let rates = AccumulatorConfig::default().snow_cover;
        let mut sunny = BoundedAccumulator::new(1.0);
        let mut rainy = BoundedAccumulator::new(1.0);
        for _ in 0..100 {
            sunny.step(&rates, Weather::Sunny);
            rainy.step(&rates, Weather::Rainy);
        }
        assert!(sunny.value() < rainy.value());
    }

    #[test]
    fn test_frozen_river_stops_flowing() {
        let config = AccumulatorConfig::default();
        let mut river = RiverState {
            freeze: BoundedAccumulator::new(1.0),
            flow_offset: 3.0,
        };
        // Still snowing: stays fully frozen, offset does not move.
        river.step(Weather::Snowy, &config);
        assert_eq!(river.flow_offset, 3.0);
    }

    #[test]
    fn test_rain_flows_faster_than_sun() {
        let config = AccumulatorConfig::default();
        let river = RiverState::default();
        let sunny = river.flow_rate(Weather::Sunny, config.flow_base, config.flow_rainy);
        let rainy = river.flow_rate(Weather::Rainy, config.flow_base, config.flow_rainy);
        assert!(rainy > sunny);
        assert!((sunny - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_flow_offset_is_unbounded() {
        let config = AccumulatorConfig::default();
        let mut river = RiverState::default();
        for _ in 0..1000 {
            river.step(Weather::Sunny, &config);
        }
        assert!(river.flow_offset < -10.0);
    }
}
