//! Campfire flame flicker and the warm point light it casts.

use bevy::prelude::*;
use serde::Serialize;

use crate::clock::DayClock;
use crate::shared::*;
use crate::weather::WeatherState;

#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Campfire {
    pub position: Vec2,
    pub flame_phase_1: f32,
    pub flame_phase_2: f32,
    /// Light strength for this tick; 0 when the fire is rained or snowed out.
    pub light_strength: f32,
}

impl Default for Campfire {
    fn default() -> Self {
        Self {
            position: CAMPFIRE_POSITION,
            flame_phase_1: 0.0,
            flame_phase_2: std::f32::consts::FRAC_PI_2,
            light_strength: 0.0,
        }
    }
}

/// Flickers around 0.8, halved in daylight, dark under precipitation.
pub fn campfire_light_strength(flame_phase: f32, weather: Weather, time_of_day: TimeOfDay) -> f32 {
    if weather.is_precipitating() {
        return 0.0;
    }
    let strength = 0.8 + 0.2 * flame_phase.sin();
    if time_of_day.is_daylight() {
        strength * 0.5
    } else {
        strength
    }
}

/// Warm light colour scaled by strength.
pub fn campfire_light_color(strength: f32) -> Color {
    Color::srgb(strength, 0.6 * strength, 0.2 * strength)
}

pub fn update_campfire(
    weather: Res<WeatherState>,
    clock: Res<DayClock>,
    mut fire: ResMut<Campfire>,
) {
    fire.flame_phase_1 += 0.1;
    fire.flame_phase_2 += 0.07;
    fire.light_strength =
        campfire_light_strength(fire.flame_phase_1, weather.current(), clock.time_of_day());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precipitation_puts_out_the_light() {
        for phase in [0.0, 1.0, 2.5] {
            assert_eq!(campfire_light_strength(phase, Weather::Rainy, TimeOfDay::Night), 0.0);
            assert_eq!(campfire_light_strength(phase, Weather::Snowy, TimeOfDay::Night), 0.0);
        }
    }

    #[test]
    fn test_daylight_halves_strength() {
        let night = campfire_light_strength(1.0, Weather::Sunny, TimeOfDay::Night);
        let noon = campfire_light_strength(1.0, Weather::Sunny, TimeOfDay::Noon);
        assert!((noon * 2.0 - night).abs() < 1e-6);
        let evening = campfire_light_strength(1.0, Weather::Sunny, TimeOfDay::Evening);
        assert_eq!(evening, night);
    }

    #[test]
    fn test_strength_bounds() {
        for i in 0..100 {
            let s = campfire_light_strength(i as f32 * 0.1, Weather::Sunny, TimeOfDay::Night);
            assert!((0.6 - 1e-6..=1.0 + 1e-6).contains(&s), "strength {}", s);
        }
    }
}
