//! Snowfall: a fixed set of flakes that only move while it snows.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::shared::*;
use crate::weather::WeatherState;

pub const SNOW_COUNT: usize = 1000;
const SNOW_HALF_WIDTH: f32 = 3.0;
const SNOW_TOP_Y: f32 = 1.5;
const SNOW_BOTTOM_Y: f32 = -1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snowflake {
    pub position: Vec2,
    pub size: f32,
    pub speed: f32,
    /// Phase of the lateral drift.
    pub sway: f32,
}

#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct SnowField {
    pub flakes: Vec<Snowflake>,
}

impl SnowField {
    pub fn populate(rng: &mut ChaCha8Rng) -> Self {
        let flakes = (0..SNOW_COUNT)
            .map(|_| Snowflake {
                position: Vec2::new(
                    rng.gen_range(-SNOW_HALF_WIDTH..SNOW_HALF_WIDTH),
                    rng.gen_range(SNOW_BOTTOM_Y..SNOW_TOP_Y),
                ),
                size: rng.gen_range(0.003..0.008),
                speed: rng.gen_range(0.001..0.002),
                sway: rng.gen_range(0.0..std::f32::consts::TAU),
            })
            .collect();
        Self { flakes }
    }

    pub fn step(&mut self, rng: &mut ChaCha8Rng) {
        for flake in &mut self.flakes {
            flake.position.y -= flake.speed;
            flake.position.x += (flake.sway + flake.position.y * 2.0).sin() * 0.001;
            if flake.position.y < SNOW_BOTTOM_Y {
                flake.position = Vec2::new(
                    rng.gen_range(-SNOW_HALF_WIDTH..SNOW_HALF_WIDTH),
                    SNOW_TOP_Y,
                );
            }
        }
    }
}

pub fn init_snow(mut field: ResMut<SnowField>, mut rng: ResMut<SceneRng>) {
    *field = SnowField::populate(&mut rng.0);
}

pub fn update_snow(
    weather: Res<WeatherState>,
    mut field: ResMut<SnowField>,
    mut rng: ResMut<SceneRng>,
) {
    if weather.current() == Weather::Snowy {
        field.step(&mut rng.0);
    }
}
