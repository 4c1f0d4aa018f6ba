//! Elvenvale library crate: the environmental simulation behind the scene.
//!
//! The binary crate (`main.rs`) is a headless runner. This library exposes
//! every domain so hosts and `tests/` integration tests can drive the
//! simulation without a window or GPU.

use bevy::app::PluginGroupBuilder;
use bevy::prelude::*;

pub mod shared;
pub mod config;
pub mod clock;
pub mod weather;
pub mod environment;
pub mod particles;
pub mod puddles;
pub mod creatures;
pub mod snapshot;

/// Every scene plugin, core first.
///
/// Insert a `config::SceneConfig` resource before adding this group to
/// override the defaults (seed included).
pub struct ElvenvalePlugins;

impl PluginGroup for ElvenvalePlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(shared::SceneCorePlugin)
            .add(weather::WeatherPlugin)
            .add(weather::ambient::AmbientPlugin)
            .add(clock::ClockPlugin)
            .add(environment::EnvironmentPlugin)
            .add(creatures::CreaturesPlugin)
            .add(particles::ParticlesPlugin)
            .add(puddles::PuddlesPlugin)
            .add(snapshot::SnapshotPlugin)
    }
}

/// Runs one scene tick outside the app runner.
///
/// Steps `FixedUpdate` once, then swaps every scene event buffer the way
/// `First` would on a full frame, so events live for two ticks at most.
pub fn step_scene(world: &mut World) {
    world.run_schedule(FixedUpdate);
    swap_events::<shared::SetWeatherEvent>(world);
    swap_events::<shared::WeatherChangedEvent>(world);
    swap_events::<shared::RedrawRequestEvent>(world);
}

fn swap_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}
