//! Per-frame simulation tick.
//!
//! One tick per rendered frame, scaled by the measured frame delta. Phase
//! order within a tick is fixed: clock, motion, culling, spawning, firing,
//! collisions, particle aging. Skipping the whole body while paused is what
//! freezes the world; the sim clock is only touched here.

use super::events::EventSink;
use super::state::{GamePhase, GameState};
use super::{collision, motion, spawn};

/// Input commands for a single tick, sampled by the app shell from whatever
/// input device it fronts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    /// Fire held. Actual shots remain cooldown-gated.
    pub fire: bool,
    /// Edge-triggered pause toggle; the shell sends it for one tick only.
    pub toggle_pause: bool,
}

/// Advances the world by `dt` seconds of play time.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, sink: &mut dyn EventSink) {
    if input.toggle_pause {
        state.toggle_pause();
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    state.clock_ms += f64::from(dt) * 1000.0;

    motion::steer(state, input);
    motion::integrate(state, dt);
    motion::cull(state, sink);

    spawn::try_spawn_enemy(state, sink);
    if input.fire {
        spawn::try_fire_player_bullet(state, sink);
    }
    spawn::fire_enemy_bullets(state, sink);

    collision::resolve(state, sink);

    motion::age_particles(state, sink);
}
