//! Particle domain plugin for Elvenvale.
//!
//! Responsible for:
//! - The capacity-bounded campfire pool (sparks, embers, smoke)
//! - Rain drops with their splash rings and droplets
//! - Snowflakes and the twinkling star field

use bevy::prelude::*;

use crate::shared::*;

pub mod pool;
pub mod rain;
pub mod snow;
pub mod stars;

use pool::{update_particle_pool, ParticlePool};
use rain::{init_rain, update_rain, RainField};
use snow::{init_snow, update_snow, SnowField};
use stars::{init_stars, update_stars, StarField};

pub struct ParticlesPlugin;

impl Plugin for ParticlesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ParticlePool>()
            .init_resource::<RainField>()
            .init_resource::<SnowField>()
            .init_resource::<StarField>()
            .add_systems(
                Startup,
                (init_stars, init_rain, init_snow)
                    .chain()
                    .in_set(SceneSet::Particles),
            )
            .add_systems(
                FixedUpdate,
                (update_stars, update_rain, update_particle_pool, update_snow)
                    .chain()
                    .in_set(SceneSet::Particles),
            );
    }
}
