//! Rain: a fixed set of falling drops plus the splashes they leave behind.
//!
//! Drops live in fixed slots and are recycled to the top when they hit the
//! ground. Each landing spawns one expanding ring and a small burst of
//! ballistic droplets. Rings and droplets are swap-removed on expiry.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::shared::*;
use crate::weather::WeatherState;

pub const RAIN_COUNT: usize = 300;
const RAIN_SPAWN_Y: f32 = 1.5;
const RAIN_HALF_WIDTH: f32 = 2.5;
/// Drops below this line splash.
const SPLASH_LINE_Y: f32 = -1.1;
const DROPLETS_PER_SPLASH: usize = 5;
const SPLASH_MAX_RADIUS: f32 = 0.1;
const DROPLET_GRAVITY: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RainDrop {
    pub position: Vec2,
    /// Fall distance per tick.
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplashRing {
    pub position: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    /// 1.0 at impact, removed at 0.
    pub life: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplashDroplet {
    pub position: Vec2,
    pub velocity: Vec2,
    pub life: f32,
}

#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct RainField {
    pub drops: Vec<RainDrop>,
    pub splashes: Vec<SplashRing>,
    pub droplets: Vec<SplashDroplet>,
}

impl RainField {
    pub fn populate(rng: &mut ChaCha8Rng) -> Self {
        let drops = (0..RAIN_COUNT)
            .map(|_| RainDrop {
                position: Vec2::new(
                    rng.gen_range(-RAIN_HALF_WIDTH..RAIN_HALF_WIDTH),
                    rng.gen_range(RAIN_SPAWN_Y..RAIN_SPAWN_Y + 2.0),
                ),
                speed: rng.gen_range(0.02..0.04),
            })
            .collect();
        Self {
            drops,
            splashes: Vec::with_capacity(64),
            droplets: Vec::with_capacity(64 * DROPLETS_PER_SPLASH),
        }
    }

    /// Outside of rain the drops hang where they are and splashes vanish.
    pub fn clear_splashes(&mut self) {
        self.splashes.clear();
        self.droplets.clear();
    }

    pub fn step(&mut self, rng: &mut ChaCha8Rng) {
        for drop in &mut self.drops {
            drop.position.y -= drop.speed;
            if drop.position.y < SPLASH_LINE_Y {
                self.splashes.push(SplashRing {
                    position: drop.position,
                    radius: 0.0,
                    max_radius: SPLASH_MAX_RADIUS,
                    life: 1.0,
                });
                for _ in 0..DROPLETS_PER_SPLASH {
                    let angle = rng.gen_range(0.0..std::f32::consts::PI);
                    let speed = rng.gen_range(0.01..0.03);
                    self.droplets.push(SplashDroplet {
                        position: drop.position,
                        velocity: Vec2::new(angle.cos() * speed * 0.5, angle.sin() * speed),
                        life: rng.gen_range(0.5..1.0),
                    });
                }
                drop.position = Vec2::new(
                    rng.gen_range(-RAIN_HALF_WIDTH..RAIN_HALF_WIDTH),
                    RAIN_SPAWN_Y,
                );
            }
        }

        let mut i = 0;
        while i < self.splashes.len() {
            let ring = &mut self.splashes[i];
            ring.life -= 0.05;
            ring.radius = (ring.radius + 0.005).min(ring.max_radius);
            if ring.life <= 0.0 {
                self.splashes.swap_remove(i);
            } else {
                i += 1;
            }
        }

        let mut i = 0;
        while i < self.droplets.len() {
            let droplet = &mut self.droplets[i];
            droplet.life -= 0.02;
            droplet.velocity.y -= DROPLET_GRAVITY * TICK_SECONDS;
            droplet.position += droplet.velocity;
            if droplet.life <= 0.0 {
                self.droplets.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }
}

pub fn init_rain(mut field: ResMut<RainField>, mut rng: ResMut<SceneRng>) {
    *field = RainField::populate(&mut rng.0);
}

pub fn update_rain(
    weather: Res<WeatherState>,
    mut field: ResMut<RainField>,
    mut rng: ResMut<SceneRng>,
) {
    if weather.current() != Weather::Rainy {
        if !field.splashes.is_empty() || !field.droplets.is_empty() {
            field.clear_splashes();
        }
        return;
    }
    field.step(&mut rng.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_drop_at(y: f32) -> RainField {
        RainField {
            drops: vec![RainDrop {
                position: Vec2::new(0.3, y),
                speed: 0.02,
            }],
            splashes: Vec::new(),
            droplets: Vec::new(),
        }
    }

    #[test]
    fn test_landing_spawns_ring_and_droplets_then_recycles() {
        let mut rng = SceneRng::default();
        let mut field = single_drop_at(-1.09);
        field.step(&mut rng.0);

        assert_eq!(field.splashes.len(), 1);
        assert_eq!(field.droplets.len(), DROPLETS_PER_SPLASH);
        assert_eq!(field.drops[0].position.y, RAIN_SPAWN_Y);
        // Droplets launch into the upper half-plane.
        assert!(field.droplets.iter().all(|d| d.velocity.y >= -DROPLET_GRAVITY * TICK_SECONDS));
    }

    #[test]
    fn test_ring_grows_to_max_and_expires() {
        let mut rng = SceneRng::default();
        let mut field = single_drop_at(-1.09);
        field.step(&mut rng.0);
        // Keep the drop from landing again.
        field.drops.clear();
        let mut ticks = 1;
        while !field.splashes.is_empty() {
            let ring = field.splashes[0];
            assert!(ring.radius <= ring.max_radius);
            assert!(ring.life > 0.0);
            field.step(&mut rng.0);
            ticks += 1;
        }
        assert!(ticks <= 21, "ring lived {} ticks", ticks);
    }

    #[test]
    fn test_droplets_fall_under_gravity_and_expire() {
        let mut rng = SceneRng::default();
        let mut field = single_drop_at(-1.09);
        field.step(&mut rng.0);
        field.drops.clear();
        let start_vy: Vec<f32> = field.droplets.iter().map(|d| d.velocity.y).collect();
        field.step(&mut rng.0);
        for (d, vy) in field.droplets.iter().zip(start_vy) {
            assert!(d.velocity.y < vy);
        }
        for _ in 0..60 {
            field.step(&mut rng.0);
        }
        assert!(field.droplets.is_empty());
    }

    #[test]
    fn test_populate_fills_every_slot() {
        let mut rng = SceneRng::default();
        let field = RainField::populate(&mut rng.0);
        assert_eq!(field.drops.len(), RAIN_COUNT);
        assert!(field.drops.iter().all(|d| d.position.y >= RAIN_SPAWN_Y));
    }
}
