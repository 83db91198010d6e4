//! Time-gated entity creation: enemy waves, bullets from both sides, and
//! explosion particle bursts.
//!
//! All gates compare against the sim clock, so anything that does not tick
//! (pause, game over) freezes every gate for free. Gate timestamps start out
//! unset, which deliberately leaves the first enemy spawn and the first
//! player shot ungated.

use glam::Vec2;
use rand::Rng;

use crate::consts::{
    BULLET_SPAWN_OFFSET, DIFFICULTY_CADENCE, EXPLOSION_PARTICLE_COUNT, PARTICLE_LIFE_TICKS,
    PARTICLE_MAX_SPEED, PARTICLE_MIN_SPEED, SPAWN_EDGE_INSET, SPAWN_Y_OFFSET,
};

use super::entity::{Entity, EntityId, EntityKind, KindTag};
use super::events::EventSink;
use super::motion::enemy_descent_speed;
use super::state::GameState;

/// Spawn cadence and fire-gate bookkeeping. Lives on the game state so a
/// reset can swap it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    /// Current gap between enemy spawns, in ms. Tightens as difficulty rises.
    pub spawn_interval_ms: f64,
    /// Sim-clock time of the last enemy spawn. `None` until the first one,
    /// so a fresh run spawns immediately.
    pub last_spawn_ms: Option<f64>,
    /// Cumulative enemies spawned this run. Drives the difficulty cadence
    /// regardless of how many are still alive.
    pub spawned_total: u32,
    /// Sim-clock time of the player's last shot. `None` means the trigger
    /// is free.
    pub last_player_shot_ms: Option<f64>,
}

impl Spawner {
    pub fn new(spawn_interval_ms: f64) -> Self {
        Self {
            spawn_interval_ms,
            last_spawn_ms: None,
            spawned_total: 0,
            last_player_shot_ms: None,
        }
    }
}

/// True when `cooldown_ms` has fully elapsed since `last_ms`, or when the
/// gate has never fired.
pub(crate) fn cooldown_elapsed(now_ms: f64, last_ms: Option<f64>, cooldown_ms: f64) -> bool {
    last_ms.is_none_or(|last| now_ms - last > cooldown_ms)
}

/// Spawns one enemy at the top edge if the spawn gate is open. Every
/// [`DIFFICULTY_CADENCE`]-th cumulative spawn tightens the interval and
/// raises the level; the enemy spawned on that boundary still gets the
/// pre-bump level's health.
pub fn try_spawn_enemy(state: &mut GameState, sink: &mut dyn EventSink) -> Option<EntityId> {
    let now = state.clock_ms;
    if !cooldown_elapsed(now, state.spawner.last_spawn_ms, state.spawner.spawn_interval_ms) {
        return None;
    }

    let max_x = state.bounds.half_width - SPAWN_EDGE_INSET;
    let x = if max_x > 0.0 {
        state.rng.random_range(-max_x..max_x)
    } else {
        0.0
    };
    let y = state.bounds.half_height + SPAWN_Y_OFFSET;
    let health = 1 + (state.level / 3) as i32;
    let shot_cooldown_ms = state.rng.random_range(
        state.tuning.enemy_shot_cooldown_min_ms..state.tuning.enemy_shot_cooldown_max_ms,
    );
    let descent = enemy_descent_speed(&state.tuning, state.level);

    let id = state.store.add(Entity::new(
        EntityKind::Enemy {
            health,
            last_shot_ms: now,
            shot_cooldown_ms,
        },
        Vec2::new(x, y),
        Vec2::new(0.0, -descent),
        now,
    ));

    state.spawner.last_spawn_ms = Some(now);
    state.spawner.spawned_total += 1;
    if state.spawner.spawned_total % DIFFICULTY_CADENCE == 0 {
        state.spawner.spawn_interval_ms = (state.spawner.spawn_interval_ms
            - state.tuning.spawn_interval_step_ms)
            .max(state.tuning.spawn_interval_floor_ms);
        state.level += 1;
        log::debug!(
            "difficulty up: level {}, spawn interval {:.0}ms",
            state.level,
            state.spawner.spawn_interval_ms
        );
    }

    if let Some(entity) = state.store.get(id) {
        sink.on_entity_spawned(entity);
    }
    Some(id)
}

/// Fires a player bullet from just above the ship if the fire cooldown has
/// elapsed. Called only on frames where the fire input is held.
pub fn try_fire_player_bullet(state: &mut GameState, sink: &mut dyn EventSink) -> Option<EntityId> {
    let now = state.clock_ms;
    if !cooldown_elapsed(
        now,
        state.spawner.last_player_shot_ms,
        state.tuning.player_fire_cooldown_ms,
    ) {
        return None;
    }
    let origin = state.player_position()? + Vec2::new(0.0, BULLET_SPAWN_OFFSET);
    state.spawner.last_player_shot_ms = Some(now);
    Some(spawn_bullet(state, origin, true, sink))
}

/// Gives every enemy whose personal cooldown has elapsed one downward shot.
/// Enemies fire wherever they are, including above the visible top edge.
pub fn fire_enemy_bullets(state: &mut GameState, sink: &mut dyn EventSink) {
    let now = state.clock_ms;
    for id in state.store.ids_of(KindTag::Enemy) {
        let origin = {
            let Some(enemy) = state.store.get_mut(id) else {
                continue;
            };
            let EntityKind::Enemy {
                last_shot_ms,
                shot_cooldown_ms,
                ..
            } = &mut enemy.kind
            else {
                continue;
            };
            if now - *last_shot_ms <= *shot_cooldown_ms {
                continue;
            }
            *last_shot_ms = now;
            enemy.position - Vec2::new(0.0, BULLET_SPAWN_OFFSET)
        };
        spawn_bullet(state, origin, false, sink);
    }
}

fn spawn_bullet(
    state: &mut GameState,
    origin: Vec2,
    player_owned: bool,
    sink: &mut dyn EventSink,
) -> EntityId {
    let speed = if player_owned {
        state.tuning.bullet_speed
    } else {
        -state.tuning.bullet_speed
    };
    let id = state.store.add(Entity::new(
        EntityKind::Bullet { player_owned },
        origin,
        Vec2::new(0.0, speed),
        state.clock_ms,
    ));
    if let Some(entity) = state.store.get(id) {
        sink.on_entity_spawned(entity);
    }
    id
}

/// Radial burst of particles at an impact point. Directions are evenly
/// distributed around the circle; speeds are randomized per particle.
pub fn spawn_explosion(state: &mut GameState, origin: Vec2, sink: &mut dyn EventSink) {
    let now = state.clock_ms;
    for i in 0..EXPLOSION_PARTICLE_COUNT {
        let angle = std::f32::consts::TAU * i as f32 / EXPLOSION_PARTICLE_COUNT as f32;
        let speed = state.rng.random_range(PARTICLE_MIN_SPEED..PARTICLE_MAX_SPEED);
        let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;
        let id = state.store.add(Entity::new(
            EntityKind::Particle {
                life: PARTICLE_LIFE_TICKS,
                initial_life: PARTICLE_LIFE_TICKS,
            },
            origin,
            velocity,
            now,
        ));
        if let Some(entity) = state.store.get(id) {
            sink.on_entity_spawned(entity);
        }
    }
}
