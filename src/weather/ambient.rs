//! Ambient soundscape selection for the audio collaborator.
//!
//! The core never plays audio. It owns the table mapping a weather mode to
//! the looped tracks that should be running, and keeps `AmbientSoundState`
//! in step with `WeatherChangedEvent` so a host audio layer can diff it.

use bevy::prelude::*;

use crate::shared::*;

/// Whether a track streams as music or loops on an effect channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmbientChannel {
    Music,
    Effect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AmbientTrack {
    pub id: &'static str,
    pub channel: AmbientChannel,
}

const SUNNY_TRACKS: &[AmbientTrack] = &[
    AmbientTrack { id: "river", channel: AmbientChannel::Music },
    AmbientTrack { id: "birds", channel: AmbientChannel::Effect },
];

const RAINY_TRACKS: &[AmbientTrack] = &[
    AmbientTrack { id: "rain", channel: AmbientChannel::Effect },
    AmbientTrack { id: "thunder", channel: AmbientChannel::Effect },
];

const SNOWY_TRACKS: &[AmbientTrack] = &[
    AmbientTrack { id: "winter", channel: AmbientChannel::Music },
];

/// Looped tracks that should be playing for a weather mode.
pub fn ambient_tracks(weather: Weather) -> &'static [AmbientTrack] {
    match weather {
        Weather::Sunny => SUNNY_TRACKS,
        Weather::Rainy => RAINY_TRACKS,
        Weather::Snowy => SNOWY_TRACKS,
    }
}

/// Tracks the audio layer should currently be looping.
///
/// `generation` bumps on every change so a host can cheaply detect that it
/// must halt everything and restart the new set.
#[derive(Resource, Debug, Clone)]
pub struct AmbientSoundState {
    pub tracks: &'static [AmbientTrack],
    pub generation: u32,
}

impl Default for AmbientSoundState {
    fn default() -> Self {
        Self {
            tracks: ambient_tracks(Weather::default()),
            generation: 0,
        }
    }
}

pub struct AmbientPlugin;

impl Plugin for AmbientPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AmbientSoundState>()
            .add_systems(Startup, sync_initial_ambient)
            .add_systems(
                FixedUpdate,
                update_ambient_soundscape
                    .in_set(SceneSet::Command)
                    .after(super::apply_weather_commands),
            );
    }
}

fn sync_initial_ambient(weather: Res<super::WeatherState>, mut ambient: ResMut<AmbientSoundState>) {
    ambient.tracks = ambient_tracks(weather.current());
}

pub fn update_ambient_soundscape(
    mut changes: EventReader<WeatherChangedEvent>,
    mut ambient: ResMut<AmbientSoundState>,
) {
    for change in changes.read() {
        ambient.tracks = ambient_tracks(change.current);
        ambient.generation = ambient.generation.wrapping_add(1);
        debug!(
            "[Ambient] now looping {:?}",
            ambient.tracks.iter().map(|t| t.id).collect::<Vec<_>>()
        );
    }
}
