use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::shared::*;

use super::PopulationGates;

// ─────────────────────────────────────────────────────────────────────────────
// Butterflies
// The whole flock is despawned as soon as rain or snow starts and a fresh,
// randomised flock is spawned on the first clear tick afterwards.
// ─────────────────────────────────────────────────────────────────────────────

pub const BUTTERFLY_COUNT: usize = 7;

#[derive(Component, Debug, Clone, PartialEq, Serialize)]
pub struct Butterfly {
    pub initial_y: f32,
    pub speed: f32,
    /// Heading in radians.
    pub direction: f32,
    pub flutter_phase: f32,
    pub bob_phase: f32,
    pub color: Color,
}

impl Butterfly {
    pub fn random(rng: &mut ChaCha8Rng) -> (Self, Vec2) {
        let position = Vec2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-0.8..-0.4));
        let speed = rng.gen_range(0.001..0.003);
        let direction = rng.gen_range(0.0..std::f32::consts::TAU);
        let flutter_phase = rng.gen_range(0.0..std::f32::consts::PI);
        let bob_phase = rng.gen_range(0.0..std::f32::consts::PI);
        let color = match rng.gen_range(0..3) {
            0 => Color::srgb(1.0, 0.8, 0.2),
            1 => Color::srgb(0.5, 0.7, 1.0),
            _ => Color::srgb(1.0, 0.6, 0.8),
        };
        (
            Self {
                initial_y: position.y,
                speed,
                direction,
                flutter_phase,
                bob_phase,
                color,
            },
            position,
        )
    }

    pub fn step(&mut self, position: &mut Vec2, rng: &mut ChaCha8Rng) {
        position.x += self.direction.cos() * self.speed;
        position.y = self.initial_y + 0.05 * self.bob_phase.sin();
        self.flutter_phase += 0.3;
        self.bob_phase += 0.05;
        if roll(rng, 0.01) {
            self.direction += rng.gen_range(-0.5..0.5);
        }
        position.x = wrap_roam_x(position.x);
    }
}

/// Horizontal wrap shared by the free-roaming species.
pub(crate) fn wrap_roam_x(x: f32) -> f32 {
    if x > ROAM_WRAP_X {
        -ROAM_WRAP_X
    } else if x < -ROAM_WRAP_X {
        ROAM_WRAP_X
    } else {
        x
    }
}

pub fn manage_butterfly_population(
    mut commands: Commands,
    gates: Res<PopulationGates>,
    mut rng: ResMut<SceneRng>,
    query: Query<Entity, With<Butterfly>>,
) {
    let present = !query.is_empty();
    if !gates.butterflies {
        if present {
            for entity in query.iter() {
                commands.entity(entity).despawn();
            }
            info!("[Creatures] Butterflies took shelter");
        }
        return;
    }
    if !present {
        for _ in 0..BUTTERFLY_COUNT {
            let (butterfly, position) = Butterfly::random(&mut rng.0);
            commands.spawn((butterfly, ScenePosition(position)));
        }
        info!("[Creatures] {} butterflies are out", BUTTERFLY_COUNT);
    }
}

pub fn move_butterflies(
    mut rng: ResMut<SceneRng>,
    mut query: Query<(&mut Butterfly, &mut ScenePosition)>,
) {
    for (mut butterfly, mut position) in query.iter_mut() {
        butterfly.step(&mut position.0, &mut rng.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_butterfly_bobs_around_its_initial_height() {
        let mut rng = SceneRng::default();
        let (mut b, mut pos) = Butterfly::random(&mut rng.0);
        for _ in 0..500 {
            b.step(&mut pos, &mut rng.0);
            assert!((pos.y - b.initial_y).abs() <= 0.05 + 1e-6);
            assert!(pos.x.abs() <= ROAM_WRAP_X);
        }
    }

    #[test]
    fn test_wrap_roam_x() {
        assert_eq!(wrap_roam_x(2.71), -ROAM_WRAP_X);
        assert_eq!(wrap_roam_x(-2.71), ROAM_WRAP_X);
        assert_eq!(wrap_roam_x(1.0), 1.0);
    }
}
