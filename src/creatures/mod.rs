//! Creature domain plugin for Elvenvale.
//!
//! Responsible for:
//! - Elves: persistent entities wandering between idle and walking
//! - Butterflies and fireflies: whole populations despawned when weather or
//!   time forbids them and freshly respawned on re-entry
//! - The fairy fox trotting along its looping path
//!
//! Population gates are evaluated once per tick at the start of
//! `SceneSet::Creatures`, after the clock has advanced, so a population that
//! becomes allowed this tick is present in this tick's snapshot.

use bevy::prelude::*;

use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Sub-modules
// ─────────────────────────────────────────────────────────────────────────────
mod butterflies;
mod elves;
mod fireflies;
mod fox;

pub use butterflies::*;
pub use elves::*;
pub use fireflies::*;
pub use fox::*;

use crate::clock::DayClock;
use crate::weather::WeatherState;

pub struct CreaturesPlugin;

impl Plugin for CreaturesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PopulationGates>()
            .init_resource::<FairyFox>()
            .add_systems(Startup, spawn_elves.in_set(SceneSet::Creatures))
            .add_systems(
                FixedUpdate,
                (
                    evaluate_population_gates,
                    update_elves,
                    manage_butterfly_population,
                    move_butterflies,
                    manage_firefly_population,
                    move_fireflies,
                    update_fairy_fox,
                )
                    .chain()
                    .in_set(SceneSet::Creatures),
            );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Population gates
// ─────────────────────────────────────────────────────────────────────────────

/// Which populations may be present this tick.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationGates {
    /// Elves update and are drawn only in sunshine; they additionally rest
    /// (but stay visible) at night.
    pub elves_visible: bool,
    pub elves_active: bool,
    pub butterflies: bool,
    pub fireflies: bool,
    pub fox: bool,
}

impl Default for PopulationGates {
    fn default() -> Self {
        Self::evaluate(Weather::default(), TimeOfDay::Morning)
    }
}

impl PopulationGates {
    pub fn evaluate(weather: Weather, time_of_day: TimeOfDay) -> Self {
        let sunny = weather == Weather::Sunny;
        let night = time_of_day == TimeOfDay::Night;
        Self {
            elves_visible: sunny,
            elves_active: sunny && !night,
            butterflies: !weather.is_precipitating(),
            fireflies: night && !weather.is_precipitating(),
            fox: weather != Weather::Rainy,
        }
    }
}

pub fn evaluate_population_gates(
    weather: Res<WeatherState>,
    clock: Res<DayClock>,
    mut gates: ResMut<PopulationGates>,
) {
    let next = PopulationGates::evaluate(weather.current(), clock.time_of_day());
    if next != *gates {
        debug!("[Creatures] Population gates now {:?}", next);
        *gates = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fireflies_only_on_clear_nights() {
        assert!(PopulationGates::evaluate(Weather::Sunny, TimeOfDay::Night).fireflies);
        assert!(!PopulationGates::evaluate(Weather::Sunny, TimeOfDay::Noon).fireflies);
        assert!(!PopulationGates::evaluate(Weather::Rainy, TimeOfDay::Night).fireflies);
        assert!(!PopulationGates::evaluate(Weather::Snowy, TimeOfDay::Night).fireflies);
    }

    #[test]
    fn test_elves_rest_at_night_and_hide_in_bad_weather() {
        let night = PopulationGates::evaluate(Weather::Sunny, TimeOfDay::Night);
        assert!(night.elves_visible);
        assert!(!night.elves_active);
        let snow = PopulationGates::evaluate(Weather::Snowy, TimeOfDay::Noon);
        assert!(!snow.elves_visible);
        assert!(!snow.elves_active);
    }

    #[test]
    fn test_butterflies_and_fox() {
        let rain = PopulationGates::evaluate(Weather::Rainy, TimeOfDay::Noon);
        assert!(!rain.butterflies);
        assert!(!rain.fox);
        let snow = PopulationGates::evaluate(Weather::Snowy, TimeOfDay::Noon);
        assert!(!snow.butterflies);
        assert!(snow.fox);
    }
}
