//! Night sky stars. They never move; twinkle is a pure function of the
//! shared glow phase.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::environment::accumulators::GlowPhase;
use crate::shared::*;

pub const STAR_COUNT: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Star {
    pub position: Vec2,
    pub radius: f32,
    pub twinkle_speed: f32,
    pub phase: f32,
}

impl Star {
    pub fn alpha(&self, glow: f32) -> f32 {
        (0.5 + 0.5 * (self.phase + glow * self.twinkle_speed).sin()).clamp(0.0, 1.0)
    }
}

#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct StarField {
    pub stars: Vec<Star>,
    /// Per-star alpha for the current glow phase, same order as `stars`.
    pub alphas: Vec<f32>,
}

impl StarField {
    pub fn populate(rng: &mut ChaCha8Rng) -> Self {
        let stars: Vec<Star> = (0..STAR_COUNT)
            .map(|_| Star {
                position: Vec2::new(rng.gen_range(-2.5..2.5), rng.gen_range(0.0..1.5)),
                radius: rng.gen_range(0.002..0.006),
                twinkle_speed: rng.gen_range(0.5..2.0),
                phase: rng.gen_range(0.0..std::f32::consts::TAU),
            })
            .collect();
        let alphas = stars.iter().map(|s| s.alpha(0.0)).collect();
        Self { stars, alphas }
    }

    pub fn refresh(&mut self, glow: f32) {
        for (alpha, star) in self.alphas.iter_mut().zip(&self.stars) {
            *alpha = star.alpha(glow);
        }
    }
}

pub fn init_stars(mut field: ResMut<StarField>, mut rng: ResMut<SceneRng>) {
    *field = StarField::populate(&mut rng.0);
}

pub fn update_stars(glow: Res<GlowPhase>, mut field: ResMut<StarField>) {
    field.refresh(glow.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_is_bounded_and_twinkles() {
        let mut rng = SceneRng::default();
        let mut field = StarField::populate(&mut rng.0);
        let before = field.alphas.clone();
        for step in 0..200 {
            field.refresh(step as f32 * 0.05);
            assert!(field.alphas.iter().all(|a| (0.0..=1.0).contains(a)));
        }
        assert_ne!(before, field.alphas);
        let positions: Vec<Vec2> = field.stars.iter().map(|s| s.position).collect();
        field.refresh(99.0);
        assert!(field.stars.iter().map(|s| s.position).eq(positions));
    }
}
