//! Campfire particle pool: sparks, embers, and smoke.
//!
//! One capacity-bounded collection shared across kinds. Emission refuses
//! new particles at the cap rather than evicting old ones, and expired
//! particles are swap-removed, so survivor order carries no meaning.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{ParticleConfig, SceneConfig};
use crate::environment::campfire::Campfire;
use crate::shared::*;
use crate::weather::WeatherState;

/// Smoke is fully faded this far above the fire.
const SMOKE_FADE_HEIGHT: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParticleKind {
    Spark,
    Ember,
    Smoke,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    /// Unique for the lifetime of the pool.
    pub id: u64,
    pub kind: ParticleKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds left; the particle is removed once this reaches 0.
    pub life: f32,
    pub max_life: f32,
    /// Point size for sparks/embers, radius for smoke.
    pub size: f32,
    /// Base colour; its alpha is the peak opacity.
    pub color: Color,
}

impl Particle {
    /// Remaining-life fraction, always in [0, 1].
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    /// Opacity the renderer should use. Smoke also thins with height above
    /// the fire at `source_y`.
    pub fn display_alpha(&self, source_y: f32) -> f32 {
        let base = self.alpha() * self.color.alpha();
        match self.kind {
            ParticleKind::Smoke => {
                let height_fade = 1.0 - (self.position.y - source_y) / SMOKE_FADE_HEIGHT;
                (base * height_fade).clamp(0.0, 1.0)
            }
            ParticleKind::Spark | ParticleKind::Ember => base,
        }
    }

    /// Per-kind velocity rule, then position integration.
    fn integrate(&mut self, dt: f32) {
        match self.kind {
            ParticleKind::Spark => {
                self.velocity.y -= 0.0003;
            }
            ParticleKind::Ember => {
                self.velocity.y -= 0.00005;
                self.velocity.x *= 0.98;
            }
            ParticleKind::Smoke => {
                self.size += dt * 0.05;
                self.velocity.y *= 1.005;
                self.velocity.x *= 0.99;
            }
        }
        self.position += self.velocity;
    }
}

#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    next_id: u64,
}

impl ParticlePool {
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Adds a particle unless the pool is at `cap`. Returns whether it was added.
    pub fn try_emit(&mut self, cap: usize, mut particle: Particle) -> bool {
        if self.particles.len() >= cap {
            return false;
        }
        particle.id = self.next_id;
        self.next_id += 1;
        self.particles.push(particle);
        true
    }

    /// Ages every particle by `dt`, removes the expired, integrates the rest.
    pub fn step(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.particles.len() {
            let particle = &mut self.particles[i];
            particle.life -= dt;
            if particle.life <= 0.0 {
                self.particles.swap_remove(i);
                continue;
            }
            particle.integrate(dt);
            i += 1;
        }
    }
}

/// Each kind rolls independently; all share the pool cap.
pub fn emit_campfire_particles(
    pool: &mut ParticlePool,
    config: &ParticleConfig,
    source: Vec2,
    rng: &mut ChaCha8Rng,
) {
    if roll(rng, config.spark_chance) {
        let vx = rng.gen_range(-50..50) as f32 / 8000.0;
        pool.try_emit(
            config.cap,
            Particle {
                id: 0,
                kind: ParticleKind::Spark,
                position: source + Vec2::new(0.0, 0.05),
                velocity: Vec2::new(vx, 0.002),
                life: 0.2,
                max_life: 0.2,
                size: 0.0,
                color: Color::srgba(1.0, 0.8, 0.2, 1.0),
            },
        );
    }

    if roll(rng, config.ember_chance) {
        let vx = rng.gen_range(-50..50) as f32 / 3000.0;
        pool.try_emit(
            config.cap,
            Particle {
                id: 0,
                kind: ParticleKind::Ember,
                position: source,
                velocity: Vec2::new(vx, 0.002),
                life: 0.4,
                max_life: 0.4,
                size: 0.0,
                color: Color::srgba(1.0, 0.4, 0.0, 1.0),
            },
        );
    }

    if roll(rng, config.smoke_chance) {
        let x = source.x + rng.gen_range(-0.01..0.01);
        let vx = rng.gen_range(-0.0005..0.0005);
        let vy = rng.gen_range(0.003..0.005);
        let life = rng.gen_range(2.0..3.0);
        pool.try_emit(
            config.cap,
            Particle {
                id: 0,
                kind: ParticleKind::Smoke,
                position: Vec2::new(x, source.y + 0.08),
                velocity: Vec2::new(vx, vy),
                life,
                max_life: 3.0,
                size: 0.01,
                color: Color::srgba(0.8, 0.8, 0.8, 0.4),
            },
        );
    }
}

pub fn update_particle_pool(
    weather: Res<WeatherState>,
    config: Res<SceneConfig>,
    fire: Res<Campfire>,
    mut pool: ResMut<ParticlePool>,
    mut rng: ResMut<SceneRng>,
) {
    if !weather.current().is_precipitating() {
        emit_campfire_particles(&mut pool, &config.particles, fire.position, &mut rng.0);
    }
    pool.step(TICK_SECONDS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn spark(life: f32) -> Particle {
        Particle {
            id: 0,
            kind: ParticleKind::Spark,
            position: Vec2::ZERO,
            velocity: Vec2::new(0.0, 0.002),
            life,
            max_life: 0.2,
            size: 0.0,
            color: Color::WHITE,
        }
    }

    #[test]
    fn test_emit_refuses_at_cap() {
        let mut pool = ParticlePool::default();
        assert!(pool.try_emit(2, spark(0.2)));
        assert!(pool.try_emit(2, spark(0.2)));
        assert!(!pool.try_emit(2, spark(0.2)));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut pool = ParticlePool::default();
        for _ in 0..5 {
            pool.try_emit(10, spark(0.2));
        }
        for _ in 0..3 {
            pool.step(TICK_SECONDS);
            pool.try_emit(10, spark(0.2));
        }
        let ids: HashSet<u64> = pool.particles().iter().map(|p| p.id).collect();
        assert_eq!(pool.len(), 8);
        assert_eq!(ids.len(), pool.len());
    }

    #[test]
    fn test_spark_expires_after_its_lifetime() {
        let mut pool = ParticlePool::default();
        pool.try_emit(10, spark(0.2));
        // 0.2 s at 16 ms per tick: alive through tick 12, gone on tick 13.
        for _ in 0..12 {
            pool.step(TICK_SECONDS);
        }
        assert_eq!(pool.len(), 1);
        pool.step(TICK_SECONDS);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_life_strictly_decreases() {
        let mut pool = ParticlePool::default();
        pool.try_emit(10, spark(0.2));
        let mut last = pool.particles()[0].life;
        while !pool.is_empty() {
            pool.step(TICK_SECONDS);
            if let Some(p) = pool.particles().first() {
                assert!(p.life < last);
                last = p.life;
            }
        }
    }

    #[test]
    fn test_spark_falls_back_under_gravity() {
        let mut p = spark(0.2);
        for _ in 0..10 {
            p.integrate(TICK_SECONDS);
        }
        assert!(p.velocity.y < 0.0);
    }

    #[test]
    fn test_smoke_grows_accelerates_and_slows_sideways() {
        let mut p = Particle {
            kind: ParticleKind::Smoke,
            velocity: Vec2::new(0.0004, 0.004),
            size: 0.01,
            max_life: 3.0,
            life: 3.0,
            ..spark(0.2)
        };
        p.integrate(TICK_SECONDS);
        assert!(p.size > 0.01);
        assert!(p.velocity.y > 0.004);
        assert!(p.velocity.x < 0.0004);
    }

    #[test]
    fn test_alpha_bounds() {
        let mut p = spark(0.1);
        assert!((p.alpha() - 0.5).abs() < 1e-6);
        p.life = 5.0;
        assert_eq!(p.alpha(), 1.0);
        p.life = -1.0;
        assert_eq!(p.alpha(), 0.0);
    }

    #[test]
    fn test_smoke_fades_with_height() {
        let p = Particle {
            kind: ParticleKind::Smoke,
            position: Vec2::new(0.0, 0.0),
            life: 3.0,
            max_life: 3.0,
            color: Color::srgba(0.8, 0.8, 0.8, 0.4),
            ..spark(0.2)
        };
        let low = p.display_alpha(0.0);
        let high = p.display_alpha(-0.4);
        assert!((low - 0.4).abs() < 1e-6);
        assert!(high < low);
        assert_eq!(p.display_alpha(-1.0), 0.0);
    }

    #[test]
    fn test_emission_never_exceeds_cap() {
        let mut rng = SceneRng::default();
        let mut pool = ParticlePool::default();
        let config = ParticleConfig {
            cap: 5,
            spark_chance: 1.0,
            ember_chance: 1.0,
            smoke_chance: 1.0,
        };
        for _ in 0..50 {
            emit_campfire_particles(&mut pool, &config, CAMPFIRE_POSITION, &mut rng.0);
            assert!(pool.len() <= 5);
        }
        assert_eq!(pool.len(), 5);
    }
}
