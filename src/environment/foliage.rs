//! Falling leaves drifting down from the great tree's canopy.
//!
//! Leaves hang still while it snows and resume when it stops.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::shared::*;
use crate::weather::WeatherState;

const LEAF_COUNT: usize = 80;
const LEAF_FLOOR_Y: f32 = -1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FallingLeaf {
    pub position: Vec2,
    pub size: f32,
    pub fall_speed: f32,
    pub sway: f32,
    pub sway_speed: f32,
    /// Degrees.
    pub rotation: f32,
    pub rotation_speed: f32,
    pub color: Color,
}

#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct LeafField {
    pub leaves: Vec<FallingLeaf>,
}

fn canopy_position(rng: &mut ChaCha8Rng) -> Vec2 {
    Vec2::new(rng.gen_range(-0.6..0.6), rng.gen_range(-0.1..0.7))
}

impl LeafField {
    pub fn populate(rng: &mut ChaCha8Rng) -> Self {
        let leaves = (0..LEAF_COUNT)
            .map(|_| {
                let position = canopy_position(rng);
                let green = rng.gen_range(0.4..0.8);
                let red = rng.gen_range(0.1..0.25);
                let blue = rng.gen_range(0.2..0.3);
                FallingLeaf {
                    position,
                    size: rng.gen_range(0.8..1.8),
                    fall_speed: rng.gen_range(0.001..0.002),
                    sway: rng.gen_range(-1.0..1.0),
                    sway_speed: rng.gen_range(0.01..0.03),
                    rotation: rng.gen_range(0.0..360.0),
                    rotation_speed: rng.gen_range(-1.0..1.0),
                    color: Color::srgb(red, green, blue),
                }
            })
            .collect();
        Self { leaves }
    }

    pub fn step(&mut self, rng: &mut ChaCha8Rng) {
        for leaf in &mut self.leaves {
            leaf.position.y -= leaf.fall_speed;
            leaf.position.x += leaf.sway.sin() * 0.001;
            leaf.sway += leaf.sway_speed;
            leaf.rotation = (leaf.rotation + leaf.rotation_speed).rem_euclid(360.0);
            if leaf.rotation >= 360.0 {
                leaf.rotation = 0.0;
            }
            if leaf.position.y < LEAF_FLOOR_Y {
                leaf.position = canopy_position(rng);
            }
        }
    }
}

pub fn init_leaves(mut field: ResMut<LeafField>, mut rng: ResMut<SceneRng>) {
    *field = LeafField::populate(&mut rng.0);
}

pub fn update_leaves(
    weather: Res<WeatherState>,
    mut field: ResMut<LeafField>,
    mut rng: ResMut<SceneRng>,
) {
    if weather.current() == Weather::Snowy {
        return;
    }
    field.step(&mut rng.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_respawns_in_canopy() {
        let mut rng = SceneRng::default();
        let mut field = LeafField::populate(&mut rng.0);
        assert_eq!(field.leaves.len(), LEAF_COUNT);
        field.leaves[0].position.y = LEAF_FLOOR_Y;
        field.step(&mut rng.0);
        let y = field.leaves[0].position.y;
        assert!((-0.1..0.7).contains(&y), "respawned at y={}", y);
    }

    #[test]
    fn test_rotation_stays_in_degrees_range() {
        let mut rng = SceneRng::default();
        let mut field = LeafField::populate(&mut rng.0);
        for _ in 0..2000 {
            field.step(&mut rng.0);
        }
        assert!(field.leaves.iter().all(|l| (0.0..360.0).contains(&l.rotation)));
    }
}
