//! Velocity assignment, integration and out-of-bounds culling.
//!
//! Every entity moves the same way: position advances by velocity times the
//! frame delta. That single rule is what makes the sim frame-rate
//! independent; ten 100ms ticks land entities where sixty 16.7ms ticks do.

use glam::Vec2;

use crate::consts::CULL_MARGIN;
use crate::tuning::Tuning;

use super::entity::{EntityId, EntityKind};
use super::events::{DestroyCause, EventSink};
use super::state::GameState;
use super::tick::TickInput;

/// Descent speed for an enemy at the given level, in units per second.
pub fn enemy_descent_speed(tuning: &Tuning, level: u32) -> f32 {
    tuning.enemy_base_speed * (1.0 + tuning.enemy_speed_level_scale * level as f32)
}

/// Reassigns steering velocities for the frame: the player's from held
/// movement inputs, every enemy's from the current level. Recomputing enemy
/// descent each tick means live enemies speed up the moment the level rises.
/// Bullets and particles keep the velocity they spawned with.
pub fn steer(state: &mut GameState, input: &TickInput) {
    let mut dir = Vec2::ZERO;
    if input.move_left {
        dir.x -= 1.0;
    }
    if input.move_right {
        dir.x += 1.0;
    }
    if input.move_up {
        dir.y += 1.0;
    }
    if input.move_down {
        dir.y -= 1.0;
    }
    // Axes are independent; diagonals keep full per-axis speed.
    let player_velocity = dir * state.tuning.player_speed;
    let descent = enemy_descent_speed(&state.tuning, state.level);

    for entity in state.store.iter_mut() {
        match entity.kind {
            EntityKind::Player => entity.velocity = player_velocity,
            EntityKind::Enemy { .. } => entity.velocity = Vec2::new(0.0, -descent),
            _ => {}
        }
    }
}

/// Advances every entity by its velocity, then clamps the player back inside
/// the arena. Only the player is position-clamped; everything else flies
/// free until the cull pass takes it.
pub fn integrate(state: &mut GameState, dt: f32) {
    for entity in state.store.iter_mut() {
        entity.position += entity.velocity * dt;
    }
    let max = state.bounds.player_max();
    let player_id = state.player_id();
    if let Some(player) = state.store.get_mut(player_id) {
        player.position = player.position.clamp(-max, max);
    }
}

/// Removes bullets that left the vertical play band and enemies that made it
/// past the bottom edge. Enemies above the top edge are left alone; that is
/// where they spawn.
pub fn cull(state: &mut GameState, sink: &mut dyn EventSink) {
    let limit = state.bounds.half_height + CULL_MARGIN;
    let mut doomed: Vec<(EntityId, DestroyCause)> = Vec::new();
    for entity in state.store.iter() {
        match entity.kind {
            EntityKind::Bullet { .. } if entity.position.y.abs() > limit => {
                doomed.push((entity.id, DestroyCause::OutOfBounds));
            }
            EntityKind::Enemy { .. } if entity.position.y < -limit => {
                doomed.push((entity.id, DestroyCause::Escaped));
            }
            _ => {}
        }
    }
    for (id, cause) in doomed {
        state.destroy(id, cause, sink);
    }
}

/// Burns one tick of life off every particle and removes the ones that just
/// expired.
pub fn age_particles(state: &mut GameState, sink: &mut dyn EventSink) {
    let mut expired: Vec<EntityId> = Vec::new();
    for entity in state.store.iter_mut() {
        if let EntityKind::Particle { life, .. } = &mut entity.kind {
            *life = life.saturating_sub(1);
            if *life == 0 {
                expired.push(entity.id);
            }
        }
    }
    for id in expired {
        state.destroy(id, DestroyCause::Expired, sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PARTICLE_LIFE_TICKS;
    use crate::sim::entity::{Entity, KindTag};
    use crate::sim::events::recording::RecordingSink;
    use crate::sim::state::ArenaBounds;
    use proptest::prelude::*;

    fn state() -> GameState {
        GameState::new(1, ArenaBounds::from_aspect(16.0 / 9.0))
    }

    fn add_bullet(state: &mut GameState, pos: Vec2, vel: Vec2) -> EntityId {
        state.store.add(Entity::new(
            EntityKind::Bullet { player_owned: true },
            pos,
            vel,
            0.0,
        ))
    }

    #[test]
    fn steer_maps_inputs_to_player_velocity() {
        let mut state = state();
        let input = TickInput {
            move_right: true,
            move_up: true,
            ..Default::default()
        };
        steer(&mut state, &input);
        let player = state.store.get(state.player_id()).unwrap();
        assert_eq!(player.velocity, Vec2::new(9.0, 9.0));

        // Opposing keys cancel.
        let input = TickInput {
            move_left: true,
            move_right: true,
            ..Default::default()
        };
        steer(&mut state, &input);
        let player = state.store.get(state.player_id()).unwrap();
        assert_eq!(player.velocity, Vec2::ZERO);
    }

    #[test]
    fn enemy_descent_tracks_the_current_level() {
        let mut state = state();
        let id = state.store.add(Entity::new(
            EntityKind::Enemy {
                health: 1,
                last_shot_ms: 0.0,
                shot_cooldown_ms: 2500.0,
            },
            Vec2::new(0.0, 8.0),
            Vec2::ZERO,
            0.0,
        ));

        steer(&mut state, &TickInput::default());
        let vy = state.store.get(id).unwrap().velocity.y;
        assert!((vy - (-3.3)).abs() < 1e-4, "vy {vy}");

        // A live enemy accelerates as soon as the level rises.
        state.level = 5;
        steer(&mut state, &TickInput::default());
        let vy = state.store.get(id).unwrap().velocity.y;
        assert!((vy - (-4.5)).abs() < 1e-4, "vy {vy}");
    }

    #[test]
    fn coarse_and_fine_ticks_cover_the_same_distance() {
        // One second simulated as 10 x 100ms must land where 60 x 16.7ms does.
        let mut coarse = state();
        let mut fine = state();
        let vel = Vec2::new(3.0, -18.0);
        let a = add_bullet(&mut coarse, Vec2::ZERO, vel);
        let b = add_bullet(&mut fine, Vec2::ZERO, vel);

        for _ in 0..10 {
            integrate(&mut coarse, 0.1);
        }
        for _ in 0..60 {
            integrate(&mut fine, 1.0 / 60.0);
        }

        let pa = coarse.store.get(a).unwrap().position;
        let pb = fine.store.get(b).unwrap().position;
        assert!(pa.distance(pb) < 1e-3, "{pa} vs {pb}");
        assert!(pa.distance(vel) < 1e-3);
    }

    #[test]
    fn player_is_clamped_to_the_arena() {
        let mut state = state();
        let input = TickInput {
            move_left: true,
            move_down: true,
            ..Default::default()
        };
        // Long enough to reach the corner many times over.
        for _ in 0..600 {
            steer(&mut state, &input);
            integrate(&mut state, 1.0 / 60.0);
        }
        let max = state.bounds.player_max();
        let pos = state.player_position().unwrap();
        assert_eq!(pos, Vec2::new(-max.x, -max.y));
    }

    #[test]
    fn bullets_are_culled_past_either_edge() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        let top = state.bounds.half_height;
        let keep = add_bullet(&mut state, Vec2::new(0.0, top + CULL_MARGIN - 0.1), Vec2::ZERO);
        let above = add_bullet(&mut state, Vec2::new(0.0, top + CULL_MARGIN + 0.1), Vec2::ZERO);
        let below = add_bullet(&mut state, Vec2::new(0.0, -top - CULL_MARGIN - 0.1), Vec2::ZERO);

        cull(&mut state, &mut sink);

        assert!(state.store.get(keep).is_some());
        assert!(state.store.get(above).is_none());
        assert!(state.store.get(below).is_none());
        assert_eq!(sink.destroyed_with_cause(DestroyCause::OutOfBounds), 2);
    }

    #[test]
    fn escaped_enemies_are_culled_only_below() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        let enemy = |y: f32| {
            Entity::new(
                EntityKind::Enemy {
                    health: 1,
                    last_shot_ms: 0.0,
                    shot_cooldown_ms: 2500.0,
                },
                Vec2::new(0.0, y),
                Vec2::ZERO,
                0.0,
            )
        };
        let spawning = state.store.add(enemy(state.bounds.half_height + 1.0));
        let escaped = state
            .store
            .add(enemy(-state.bounds.half_height - CULL_MARGIN - 0.5));

        cull(&mut state, &mut sink);

        // Fresh spawns sit above the top edge and must survive the cull.
        assert!(state.store.get(spawning).is_some());
        assert!(state.store.get(escaped).is_none());
        assert_eq!(sink.destroyed_with_cause(DestroyCause::Escaped), 1);
    }

    #[test]
    fn particles_expire_after_their_lifetime() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        crate::sim::spawn::spawn_explosion(&mut state, Vec2::ZERO, &mut sink);
        assert_eq!(state.store.count(KindTag::Particle), 20);

        for _ in 0..PARTICLE_LIFE_TICKS - 1 {
            age_particles(&mut state, &mut sink);
        }
        assert_eq!(state.store.count(KindTag::Particle), 20);

        age_particles(&mut state, &mut sink);
        assert_eq!(state.store.count(KindTag::Particle), 0);
        assert_eq!(sink.destroyed_with_cause(DestroyCause::Expired), 20);
    }

    proptest! {
        /// Integration is linear in dt: many small steps accumulate to
        /// velocity times total time, independent of step size.
        #[test]
        fn integration_accumulates_velocity(
            px in -5.0f32..5.0,
            py in -5.0f32..5.0,
            vx in -20.0f32..20.0,
            vy in -20.0f32..20.0,
            steps in 1usize..240,
        ) {
            let mut state = state();
            let id = add_bullet(&mut state, Vec2::new(px, py), Vec2::new(vx, vy));
            let dt = 1.0 / 60.0;
            for _ in 0..steps {
                integrate(&mut state, dt);
            }
            let expected = Vec2::new(px, py) + Vec2::new(vx, vy) * (steps as f32 * dt);
            let actual = state.store.get(id).unwrap().position;
            prop_assert!(actual.distance(expected) < 1e-2, "{} vs {}", actual, expected);
        }
    }
}
