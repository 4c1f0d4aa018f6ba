use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::shared::*;

use super::PopulationGates;

// ─────────────────────────────────────────────────────────────────────────────
// Elf wander machine
// Each elf idles for 2-5 s, then walks toward a fresh target for 5-10 s, then
// idles again. Only its own timer ever changes its state.
// ─────────────────────────────────────────────────────────────────────────────

pub const ELF_COUNT: usize = 6;

const IDLE_SECONDS: std::ops::Range<f32> = 2.0..5.0;
const WALK_SECONDS: std::ops::Range<f32> = 5.0..10.0;
const GAIT_PER_TICK: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElfState {
    Idle,
    Walking,
}

#[derive(Component, Debug, Clone, PartialEq, Serialize)]
pub struct Elf {
    /// Spawn order, stable for the process lifetime.
    pub index: usize,
    pub target_x: f32,
    /// Scene units per tick while walking.
    pub speed: f32,
    pub state: ElfState,
    /// Seconds remaining in the current state, counted down by `dt` each tick.
    pub state_timer: f32,
    /// Gait phase, consumed by the renderer.
    pub animation_phase: f32,
    pub tunic: Color,
}

fn tunic_for(index: usize) -> Color {
    match index % 3 {
        0 => Color::srgb(0.8, 0.1, 0.2),
        1 => Color::srgb(0.1, 0.2, 0.8),
        _ => Color::srgb(0.1, 0.6, 0.3),
    }
}

impl Elf {
    pub fn new(index: usize, x: f32, rng: &mut ChaCha8Rng) -> Self {
        Self {
            index,
            target_x: x,
            speed: rng.gen_range(0.001..0.002),
            state: ElfState::Idle,
            state_timer: rng.gen_range(IDLE_SECONDS),
            animation_phase: 0.0,
            tunic: tunic_for(index),
        }
    }

    /// One tick of the wander machine. Returns true when the state flipped.
    pub fn advance(&mut self, x: &mut f32, dt: f32, rng: &mut ChaCha8Rng) -> bool {
        self.state_timer -= dt;
        let mut flipped = false;
        if self.state_timer <= 0.0 {
            flipped = true;
            match self.state {
                ElfState::Idle => {
                    self.state = ElfState::Walking;
                    self.state_timer = rng.gen_range(WALK_SECONDS);
                    self.target_x = rng.gen_range(ELF_MIN_X..ELF_MAX_X);
                }
                ElfState::Walking => {
                    self.state = ElfState::Idle;
                    self.state_timer = rng.gen_range(IDLE_SECONDS);
                }
            }
        }

        if self.state == ElfState::Walking {
            // Stepping by at most the remaining distance keeps an arrived elf
            // still instead of jittering across its target.
            let delta = self.target_x - *x;
            if delta.abs() <= self.speed {
                *x = self.target_x;
            } else {
                *x += delta.signum() * self.speed;
            }
            self.animation_phase += GAIT_PER_TICK;
        }
        flipped
    }
}

pub fn spawn_elves(mut commands: Commands, mut rng: ResMut<SceneRng>) {
    for index in 0..ELF_COUNT {
        let x = rng.0.gen_range(ELF_MIN_X..ELF_MAX_X);
        let elf = Elf::new(index, x, &mut rng.0);
        commands.spawn((elf, ScenePosition(Vec2::new(x, ELF_GROUND_Y))));
    }
    info!("[Creatures] Spawned {} elves", ELF_COUNT);
}

pub fn update_elves(
    gates: Res<PopulationGates>,
    mut rng: ResMut<SceneRng>,
    mut query: Query<(&mut Elf, &mut ScenePosition)>,
) {
    if !gates.elves_active {
        return;
    }
    for (mut elf, mut position) in query.iter_mut() {
        if elf.advance(&mut position.0.x, TICK_SECONDS, &mut rng.0) {
            debug!("[Creatures] Elf {} is now {:?}", elf.index, elf.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_elf_holds_until_timer_expires() {
        let mut rng = SceneRng::default();
        let mut elf = Elf::new(0, 0.0, &mut rng.0);
        elf.state_timer = 0.05;
        let mut x = 0.0;
        assert!(!elf.advance(&mut x, TICK_SECONDS, &mut rng.0));
        assert!(!elf.advance(&mut x, TICK_SECONDS, &mut rng.0));
        assert!(!elf.advance(&mut x, TICK_SECONDS, &mut rng.0));
        assert_eq!(elf.state, ElfState::Idle);
        assert_eq!(x, 0.0);
        assert!(elf.advance(&mut x, TICK_SECONDS, &mut rng.0));
        assert_eq!(elf.state, ElfState::Walking);
        assert!(WALK_SECONDS.contains(&elf.state_timer));
        assert!((ELF_MIN_X..ELF_MAX_X).contains(&elf.target_x));
    }

    #[test]
    fn test_state_timer_counts_down_in_seconds() {
        let mut rng = SceneRng::default();
        let mut elf = Elf::new(3, 0.0, &mut rng.0);
        elf.state_timer = 1.0;
        let mut x = 0.0;
        for _ in 0..10 {
            elf.advance(&mut x, TICK_SECONDS, &mut rng.0);
        }
        assert!((elf.state_timer - (1.0 - 10.0 * TICK_SECONDS)).abs() < 1e-5);
        assert_eq!(elf.state, ElfState::Idle);
    }

    #[test]
    fn test_walking_elf_arrives_without_overshoot() {
        let mut rng = SceneRng::default();
        let mut elf = Elf::new(1, 0.0, &mut rng.0);
        elf.state = ElfState::Walking;
        elf.state_timer = 100.0;
        elf.target_x = 0.01;
        elf.speed = 0.004;
        let mut x = 0.0;
        for _ in 0..10 {
            elf.advance(&mut x, TICK_SECONDS, &mut rng.0);
            assert!(x <= 0.01);
        }
        assert_eq!(x, 0.01);
        assert!(elf.animation_phase > 0.0);
    }

    #[test]
    fn test_walk_ends_in_idle() {
        let mut rng = SceneRng::default();
        let mut elf = Elf::new(2, 0.0, &mut rng.0);
        elf.state = ElfState::Walking;
        elf.state_timer = 0.0;
        let mut x = 0.0;
        assert!(elf.advance(&mut x, TICK_SECONDS, &mut rng.0));
        assert_eq!(elf.state, ElfState::Idle);
        assert!(IDLE_SECONDS.contains(&elf.state_timer));
        assert_eq!(elf.tunic, Color::srgb(0.1, 0.6, 0.3));
    }
}
