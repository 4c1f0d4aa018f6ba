use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::shared::*;

use super::butterflies::wrap_roam_x;
use super::PopulationGates;

// ─────────────────────────────────────────────────────────────────────────────
// Fireflies
// Present only on clear nights. They hover low over the ground, drifting on
// two independent phase accumulators.
// ─────────────────────────────────────────────────────────────────────────────

pub const FIREFLY_COUNT: usize = 50;

const FIREFLY_CEILING_Y: f32 = 0.0;
const FIREFLY_FLOOR_Y: f32 = -0.9;
const FIREFLY_RESET_Y: f32 = -0.8;

#[derive(Component, Debug, Clone, PartialEq, Serialize)]
pub struct Firefly {
    /// Depth offset for the renderer.
    pub depth: f32,
    pub speed: f32,
    pub glow_phase: f32,
    pub move_phase: Vec2,
}

impl Firefly {
    pub fn random(rng: &mut ChaCha8Rng) -> (Self, Vec2) {
        let position = Vec2::new(rng.gen_range(-2.5..2.5), rng.gen_range(-0.8..-0.2));
        let depth = rng.gen_range(-0.5..0.5);
        let speed = rng.gen_range(0.0005..0.0015);
        let glow_phase = rng.gen_range(0.0..std::f32::consts::PI);
        let move_phase = Vec2::new(
            rng.gen_range(0.0..std::f32::consts::TAU),
            rng.gen_range(0.0..std::f32::consts::TAU),
        );
        (
            Self {
                depth,
                speed,
                glow_phase,
                move_phase,
            },
            position,
        )
    }

    /// Pulsing brightness in [0.2, 1.0].
    pub fn glow_intensity(&self) -> f32 {
        0.6 + 0.4 * self.glow_phase.sin()
    }

    pub fn step(&mut self, position: &mut Vec2) {
        self.move_phase.x += 0.03 * self.speed * 100.0;
        self.move_phase.y += 0.02 * self.speed * 100.0;
        position.x += self.move_phase.x.cos() * 0.001;
        position.y += self.move_phase.y.sin() * 0.0005;
        self.glow_phase += 0.1;

        position.x = wrap_roam_x(position.x);
        if position.y > FIREFLY_CEILING_Y || position.y < FIREFLY_FLOOR_Y {
            position.y = FIREFLY_RESET_Y;
        }
    }
}

pub fn manage_firefly_population(
    mut commands: Commands,
    gates: Res<PopulationGates>,
    mut rng: ResMut<SceneRng>,
    query: Query<Entity, With<Firefly>>,
) {
    let present = !query.is_empty();
    if !gates.fireflies {
        if present {
            for entity in query.iter() {
                commands.entity(entity).despawn();
            }
            info!("[Creatures] Fireflies went dark");
        }
        return;
    }
    if !present {
        for _ in 0..FIREFLY_COUNT {
            let (firefly, position) = Firefly::random(&mut rng.0);
            commands.spawn((firefly, ScenePosition(position)));
        }
        info!("[Creatures] {} fireflies lit up", FIREFLY_COUNT);
    }
}

pub fn move_fireflies(mut query: Query<(&mut Firefly, &mut ScenePosition)>) {
    for (mut firefly, mut position) in query.iter_mut() {
        firefly.step(&mut position.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fireflies_stay_in_their_band() {
        let mut rng = SceneRng::default();
        let (mut f, mut pos) = Firefly::random(&mut rng.0);
        for _ in 0..5000 {
            f.step(&mut pos);
            assert!((FIREFLY_FLOOR_Y..=FIREFLY_CEILING_Y).contains(&pos.y));
            assert!(pos.x.abs() <= ROAM_WRAP_X);
            assert!((0.2..=1.0).contains(&f.glow_intensity()));
        }
    }

    #[test]
    fn test_escaped_firefly_is_reset_low() {
        let mut rng = SceneRng::default();
        let (mut f, _) = Firefly::random(&mut rng.0);
        let mut pos = Vec2::new(0.0, 0.2);
        f.step(&mut pos);
        assert_eq!(pos.y, FIREFLY_RESET_Y);
    }
}
