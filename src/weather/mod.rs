//! Weather controller.
//!
//! Holds the current weather mode and applies the external `setWeather`
//! command at the start of each tick. Every other domain reads
//! `WeatherState`; only `apply_weather_commands` writes it.

pub mod ambient;

use bevy::prelude::*;

use crate::shared::*;

pub struct WeatherPlugin;

impl Plugin for WeatherPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WeatherState>()
            .add_event::<SetWeatherEvent>()
            .add_event::<WeatherChangedEvent>()
            .add_systems(
                FixedUpdate,
                apply_weather_commands.in_set(SceneSet::Command),
            );
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeatherState {
    current: Weather,
}

impl WeatherState {
    pub fn new(current: Weather) -> Self {
        Self { current }
    }

    pub fn current(&self) -> Weather {
        self.current
    }

    /// Switches mode. Returns the previous mode when it actually changed.
    pub fn set(&mut self, weather: Weather) -> Option<Weather> {
        if self.current == weather {
            return None;
        }
        let previous = self.current;
        self.current = weather;
        Some(previous)
    }
}

/// Drains queued commands in arrival order; one change event per real change.
pub fn apply_weather_commands(
    mut commands: EventReader<SetWeatherEvent>,
    mut state: ResMut<WeatherState>,
    mut changed: EventWriter<WeatherChangedEvent>,
) {
    for command in commands.read() {
        if let Some(previous) = state.set(command.weather) {
            info!(
                "[Weather] {} -> {}",
                previous.label(),
                command.weather.label()
            );
            changed.send(WeatherChangedEvent {
                previous,
                current: command.weather,
            });
        }
    }
}

/// Queues a weather command on a world; used by hosts and tests.
pub fn request_weather(world: &mut World, weather: Weather) {
    world.send_event(SetWeatherEvent { weather });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_is_idempotent() {
        let mut state = WeatherState::default();
        assert_eq!(state.set(Weather::Sunny), None);
        assert_eq!(state.set(Weather::Rainy), Some(Weather::Sunny));
        assert_eq!(state.set(Weather::Rainy), None);
        assert_eq!(state.current(), Weather::Rainy);
    }

    #[test]
    fn test_commands_apply_in_order_and_emit_changes() {
        let mut app = App::new();
        app.add_event::<SetWeatherEvent>()
            .add_event::<WeatherChangedEvent>()
            .init_resource::<WeatherState>()
            .add_systems(Update, apply_weather_commands);

        request_weather(app.world_mut(), Weather::Snowy);
        request_weather(app.world_mut(), Weather::Snowy);
        request_weather(app.world_mut(), Weather::Rainy);
        app.update();

        assert_eq!(app.world().resource::<WeatherState>().current(), Weather::Rainy);
        let events = app.world().resource::<Events<WeatherChangedEvent>>();
        let seen: Vec<(Weather, Weather)> = events
            .iter_current_update_events()
            .map(|e| (e.previous, e.current))
            .collect();
        assert_eq!(
            seen,
            vec![
                (Weather::Sunny, Weather::Snowy),
                (Weather::Snowy, Weather::Rainy)
            ]
        );
    }
}
