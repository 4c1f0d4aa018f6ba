//! Temporal clock: the heartbeat of the scene.
//!
//! Responsible for:
//! - Counting scene ticks
//! - Advancing the cyclic day phase and wrapping it into [0, 1)
//! - Deriving the discrete time of day every other domain gates on
//! - Logging time-of-day transitions

use bevy::prelude::*;

use crate::config::SceneConfig;
use crate::shared::*;

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DayClock>()
            .add_systems(Startup, init_day_clock.in_set(SceneSet::Clock))
            .add_systems(
                FixedUpdate,
                (count_tick, advance_day_clock).chain().in_set(SceneSet::Clock),
            );
    }
}

/// Cyclic day phase. 0.0 is dawn; night covers [0.5, 1.0).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DayClock {
    phase: f32,
    pub rate_per_tick: f32,
}

impl Default for DayClock {
    fn default() -> Self {
        Self::new(0.0, 0.0002)
    }
}

impl DayClock {
    pub fn new(phase: f32, rate_per_tick: f32) -> Self {
        let mut clock = Self {
            phase: 0.0,
            rate_per_tick,
        };
        clock.set_phase(phase);
        clock
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Sets the phase, wrapping it into [0, 1).
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = wrap_unit(phase);
    }

    /// Advances one tick: `phase = (phase + rate) mod 1`.
    pub fn advance(&mut self) {
        self.phase = wrap_unit(self.phase + self.rate_per_tick);
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_phase(self.phase)
    }
}

/// Wraps into [0, 1). `rem_euclid` can round up to exactly 1.0 for tiny
/// negative inputs, so that case is folded back to 0.
fn wrap_unit(value: f32) -> f32 {
    let wrapped = value.rem_euclid(1.0);
    if wrapped >= 1.0 || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}

fn init_day_clock(config: Res<SceneConfig>, mut clock: ResMut<DayClock>) {
    *clock = DayClock::new(config.clock.initial_phase, config.clock.rate_per_tick);
}

fn count_tick(mut tick: ResMut<SceneTick>) {
    tick.0 += 1;
}

pub fn advance_day_clock(mut clock: ResMut<DayClock>) {
    let before = clock.time_of_day();
    clock.advance();
    let after = clock.time_of_day();
    if before != after {
        info!("[Clock] {:?} -> {:?} (phase {:.4})", before, after, clock.phase());
    }
}
