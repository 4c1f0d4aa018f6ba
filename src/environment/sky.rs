//! Sky ambience: drifting clouds and a flock of birds.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::shared::*;

const CLOUD_COUNT: usize = 7;
const CLOUD_WRAP_X: f32 = 4.0;
const BIRD_COUNT: usize = 7;
const BIRD_WRAP_X: f32 = 3.0;

/// One circle in a cloud cluster, relative to the cloud centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CloudPuff {
    pub offset: Vec2,
    pub radius: f32,
    pub y_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cloud {
    pub position: Vec2,
    pub speed: f32,
    /// First puff is the flattened base; the rest sit on top of it.
    pub puffs: Vec<CloudPuff>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bird {
    pub position: Vec2,
    pub speed: f32,
    /// Wing-flap phase.
    pub phase: f32,
}

#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct SkyField {
    pub clouds: Vec<Cloud>,
    pub birds: Vec<Bird>,
}

impl SkyField {
    pub fn populate(rng: &mut ChaCha8Rng) -> Self {
        let section = 2.0 * CLOUD_WRAP_X / CLOUD_COUNT as f32;
        let clouds = (0..CLOUD_COUNT)
            .map(|i| {
                let x = -CLOUD_WRAP_X + i as f32 * section + (rng.gen::<f32>() - 0.5) * section;
                let base_radius = rng.gen_range(0.12..0.15);
                let mut puffs = vec![CloudPuff {
                    offset: Vec2::ZERO,
                    radius: base_radius,
                    y_scale: 0.5,
                }];
                let extra = rng.gen_range(5..=10);
                for _ in 0..extra {
                    puffs.push(CloudPuff {
                        offset: Vec2::new(
                            (rng.gen::<f32>() - 0.5) * base_radius * 1.8,
                            rng.gen::<f32>() * 0.5 * base_radius,
                        ),
                        radius: base_radius * rng.gen_range(0.4..0.9),
                        y_scale: 1.0,
                    });
                }
                Cloud {
                    position: Vec2::new(x, rng.gen_range(0.6..1.3)),
                    speed: rng.gen_range(0.001..0.0025) * 2.0,
                    puffs,
                }
            })
            .collect();

        let birds = (0..BIRD_COUNT)
            .map(|_| Bird {
                position: Vec2::new(-3.0 - rng.gen::<f32>() * 5.0, rng.gen_range(0.8..1.4)),
                speed: rng.gen_range(0.006..0.01),
                phase: rng.gen::<f32>() * std::f32::consts::PI,
            })
            .collect();

        Self { clouds, birds }
    }

    pub fn step(&mut self, rng: &mut ChaCha8Rng) {
        for cloud in &mut self.clouds {
            cloud.position.x += cloud.speed;
            if cloud.position.x > CLOUD_WRAP_X {
                cloud.position.x = -CLOUD_WRAP_X;
            }
        }

        for bird in &mut self.birds {
            bird.position.x += bird.speed;
            bird.phase += 0.2 + bird.speed * 10.0;
            if bird.position.x > BIRD_WRAP_X {
                bird.position.x = -BIRD_WRAP_X;
                bird.position.y = rng.gen_range(0.8..1.4);
                bird.speed = rng.gen_range(0.006..0.01);
            }
        }
    }
}

pub fn init_sky(mut sky: ResMut<SkyField>, mut rng: ResMut<SceneRng>) {
    *sky = SkyField::populate(&mut rng.0);
}

pub fn update_sky(mut sky: ResMut<SkyField>, mut rng: ResMut<SceneRng>) {
    sky.step(&mut rng.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populate_counts() {
        let mut rng = SceneRng::default();
        let sky = SkyField::populate(&mut rng.0);
        assert_eq!(sky.clouds.len(), CLOUD_COUNT);
        assert_eq!(sky.birds.len(), BIRD_COUNT);
        for cloud in &sky.clouds {
            assert!((6..=11).contains(&cloud.puffs.len()));
            assert_eq!(cloud.puffs[0].y_scale, 0.5);
        }
    }

    #[test]
    fn test_clouds_and_birds_wrap() {
        let mut rng = SceneRng::default();
        let mut sky = SkyField::populate(&mut rng.0);
        sky.clouds[0].position.x = CLOUD_WRAP_X;
        sky.birds[0].position.x = BIRD_WRAP_X;
        sky.step(&mut rng.0);
        assert_eq!(sky.clouds[0].position.x, -CLOUD_WRAP_X);
        assert_eq!(sky.birds[0].position.x, -BIRD_WRAP_X);
        assert!((0.8..1.4).contains(&sky.birds[0].position.y));
    }
}
