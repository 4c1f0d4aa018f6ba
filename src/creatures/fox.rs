use bevy::prelude::*;
use serde::Serialize;

use crate::shared::*;

use super::PopulationGates;

/// The fairy fox: trots left to right along the riverbank path and loops.
/// It hides while it rains and picks up where it left off afterwards.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FairyFox {
    /// Fraction of the path covered, in [0, 1].
    pub progress: f32,
    /// Path fractions per simulated second.
    pub speed: f32,
    pub tail_sway: f32,
}

const FOX_PATH_START_X: f32 = -3.5;
const FOX_PATH_LENGTH: f32 = 7.0;
const FOX_PATH_Y: f32 = -0.91;

impl Default for FairyFox {
    fn default() -> Self {
        Self {
            progress: 0.0,
            speed: 0.05,
            tail_sway: 0.0,
        }
    }
}

impl FairyFox {
    pub fn position(&self) -> Vec2 {
        Vec2::new(FOX_PATH_START_X + self.progress * FOX_PATH_LENGTH, FOX_PATH_Y)
    }

    pub fn step(&mut self, dt: f32) {
        self.progress += self.speed * dt;
        if self.progress > 1.0 {
            self.progress = 0.0;
        }
        self.tail_sway += 0.08;
    }
}

pub fn update_fairy_fox(gates: Res<PopulationGates>, mut fox: ResMut<FairyFox>) {
    if gates.fox {
        fox.step(TICK_SECONDS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fox_loops_back_to_path_start() {
        let mut fox = FairyFox {
            progress: 0.9999,
            ..Default::default()
        };
        fox.step(TICK_SECONDS);
        assert_eq!(fox.progress, 0.0);
        assert_eq!(fox.position().x, FOX_PATH_START_X);
        assert!(fox.tail_sway > 0.0);
    }
}
