//! Environment domain plugin for Elvenvale.
//!
//! Responsible for:
//! - Continuous accumulators (snow cover, river freeze and flow, glow phase)
//! - Campfire flicker and light strength
//! - Sky ambience (clouds, birds) and falling leaves

use bevy::prelude::*;

use crate::shared::*;

pub mod accumulators;
pub mod campfire;
pub mod foliage;
pub mod sky;

use accumulators::{update_accumulators, GlowPhase, RiverState, SnowCover};
use campfire::{update_campfire, Campfire};
use foliage::{init_leaves, update_leaves, LeafField};
use sky::{init_sky, update_sky, SkyField};

pub struct EnvironmentPlugin;

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SnowCover>()
            .init_resource::<RiverState>()
            .init_resource::<GlowPhase>()
            .init_resource::<Campfire>()
            .init_resource::<SkyField>()
            .init_resource::<LeafField>()
            .add_systems(
                Startup,
                (init_leaves, init_sky).chain().in_set(SceneSet::Ambience),
            )
            .add_systems(
                FixedUpdate,
                (update_accumulators, update_campfire)
                    .chain()
                    .in_set(SceneSet::Accumulate),
            )
            .add_systems(
                FixedUpdate,
                (update_leaves, update_sky).chain().in_set(SceneSet::Ambience),
            );
    }
}
