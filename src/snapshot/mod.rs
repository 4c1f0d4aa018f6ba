//! Read-only scene snapshot for the rendering collaborator.
//!
//! Responsible for:
//! - Emitting `RedrawRequestEvent` once every domain has finished the tick
//! - Collecting every entity collection and scalar the renderer draws from
//! - JSON export for the headless runner

use bevy::prelude::*;
use serde::Serialize;

use crate::clock::DayClock;
use crate::creatures::{Butterfly, Elf, ElfState, FairyFox, Firefly, PopulationGates};
use crate::environment::accumulators::{GlowPhase, RiverState, SnowCover};
use crate::environment::campfire::{campfire_light_color, Campfire};
use crate::environment::foliage::{FallingLeaf, LeafField};
use crate::environment::sky::SkyField;
use crate::particles::pool::{Particle, ParticlePool};
use crate::particles::rain::RainField;
use crate::particles::snow::SnowField;
use crate::particles::stars::StarField;
use crate::puddles::{Puddle, PuddleField};
use crate::shared::*;
use crate::weather::ambient::AmbientSoundState;
use crate::weather::WeatherState;

pub struct SnapshotPlugin;

impl Plugin for SnapshotPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RedrawRequestEvent>()
            .add_systems(FixedUpdate, request_redraw.in_set(SceneSet::Present));
    }
}

pub fn request_redraw(tick: Res<SceneTick>, mut redraw: EventWriter<RedrawRequestEvent>) {
    redraw.send(RedrawRequestEvent { tick: tick.0 });
}

// ═══════════════════════════════════════════════════════════════════════
// VIEWS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElfView {
    pub index: usize,
    pub position: Vec2,
    pub state: ElfState,
    pub state_timer: f32,
    pub animation_phase: f32,
    pub tunic: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButterflyView {
    pub position: Vec2,
    pub flutter_phase: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FireflyView {
    pub position: Vec2,
    pub depth: f32,
    pub glow: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoxView {
    pub visible: bool,
    pub position: Vec2,
    pub tail_sway: f32,
}

/// Everything the renderer reads after a tick.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot {
    pub tick: u64,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    pub day_phase: f32,
    pub snow_cover: f32,
    pub river_freeze: f32,
    pub river_flow_offset: f32,
    pub glow_phase: f32,
    pub campfire: Campfire,
    pub campfire_light: Color,
    pub particles: Vec<Particle>,
    pub puddles: Vec<Puddle>,
    pub elves_visible: bool,
    pub elves: Vec<ElfView>,
    pub butterflies: Vec<ButterflyView>,
    pub fireflies: Vec<FireflyView>,
    pub fox: FoxView,
    pub rain: RainField,
    pub snow: SnowField,
    pub stars: StarField,
    pub sky: SkyField,
    pub leaves: Vec<FallingLeaf>,
    pub ambient_tracks: Vec<&'static str>,
}

/// Copies the current scene out of the world.
pub fn capture_snapshot(world: &mut World) -> SceneSnapshot {
    let mut elves: Vec<ElfView> = world
        .query::<(&Elf, &ScenePosition)>()
        .iter(world)
        .map(|(elf, pos)| ElfView {
            index: elf.index,
            position: pos.0,
            state: elf.state,
            state_timer: elf.state_timer,
            animation_phase: elf.animation_phase,
            tunic: elf.tunic,
        })
        .collect();
    elves.sort_by_key(|e| e.index);

    let butterflies = world
        .query::<(&Butterfly, &ScenePosition)>()
        .iter(world)
        .map(|(b, pos)| ButterflyView {
            position: pos.0,
            flutter_phase: b.flutter_phase,
            color: b.color,
        })
        .collect();

    let fireflies = world
        .query::<(&Firefly, &ScenePosition)>()
        .iter(world)
        .map(|(f, pos)| FireflyView {
            position: pos.0,
            depth: f.depth,
            glow: f.glow_intensity(),
        })
        .collect();

    let clock = world.resource::<DayClock>();
    let river = world.resource::<RiverState>();
    let gates = world.resource::<PopulationGates>();
    let fox = world.resource::<FairyFox>();

    SceneSnapshot {
        tick: world.resource::<SceneTick>().0,
        weather: world.resource::<WeatherState>().current(),
        time_of_day: clock.time_of_day(),
        day_phase: clock.phase(),
        snow_cover: world.resource::<SnowCover>().value(),
        river_freeze: river.freeze.value(),
        river_flow_offset: river.flow_offset,
        glow_phase: world.resource::<GlowPhase>().0,
        campfire: *world.resource::<Campfire>(),
        campfire_light: campfire_light_color(world.resource::<Campfire>().light_strength),
        particles: world.resource::<ParticlePool>().particles().to_vec(),
        puddles: world.resource::<PuddleField>().puddles().to_vec(),
        elves_visible: gates.elves_visible,
        elves,
        butterflies,
        fireflies,
        fox: FoxView {
            visible: gates.fox,
            position: fox.position(),
            tail_sway: fox.tail_sway,
        },
        rain: world.resource::<RainField>().clone(),
        snow: world.resource::<SnowField>().clone(),
        stars: world.resource::<StarField>().clone(),
        sky: world.resource::<SkyField>().clone(),
        leaves: world.resource::<LeafField>().leaves.clone(),
        ambient_tracks: world
            .resource::<AmbientSoundState>()
            .tracks
            .iter()
            .map(|t| t.id)
            .collect(),
    }
}

/// Pretty JSON for the runner's `--dump` output.
pub fn snapshot_to_json(snapshot: &SceneSnapshot) -> Result<String, String> {
    serde_json::to_string_pretty(snapshot)
        .map_err(|e| format!("Snapshot serialization failed: {}", e))
}
