//! Circle-overlap collision detection and response.
//!
//! Three passes run in a fixed order each tick: enemy-vs-player rams, player
//! bullets vs enemies, enemy bullets vs the player. Each pass walks an id
//! snapshot taken before it starts and re-resolves every id through the
//! store, so removals made by an earlier pass (or earlier in the same pass)
//! are seen as already gone rather than as dangling references.

use glam::Vec2;

use super::entity::{EntityKind, KindTag};
use super::events::{DestroyCause, EventSink};
use super::spawn::spawn_explosion;
use super::state::GameState;

/// True when two circles overlap. Compared in squared space; no sqrt.
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) < reach * reach
}

/// Runs all three collision passes for the frame.
pub fn resolve(state: &mut GameState, sink: &mut dyn EventSink) {
    resolve_rams(state, sink);
    resolve_player_bullets(state, sink);
    resolve_enemy_bullets(state, sink);
}

/// Enemy ships that touch the player explode on contact: heavy damage to the
/// player, the enemy always dies regardless of its remaining health, and no
/// score is awarded.
fn resolve_rams(state: &mut GameState, sink: &mut dyn EventSink) {
    let Some(player_pos) = state.player_position() else {
        return;
    };
    let player_radius = state.tuning.player_radius;
    let enemy_radius = state.tuning.enemy_radius;
    let ram_damage = state.tuning.ram_damage;

    for id in state.store.ids_of(KindTag::Enemy) {
        let Some(enemy) = state.store.get(id) else {
            continue;
        };
        if !circles_overlap(enemy.position, enemy_radius, player_pos, player_radius) {
            continue;
        }
        let impact = enemy.position;
        state.apply_player_damage(ram_damage, sink);
        state.destroy(id, DestroyCause::Hit, sink);
        spawn_explosion(state, impact, sink);
    }
}

/// Player bullets damage enemies. Each bullet is consumed by the first enemy
/// in store order it overlaps; a kill awards score scaled by the current
/// level and leaves an explosion behind.
fn resolve_player_bullets(state: &mut GameState, sink: &mut dyn EventSink) {
    let bullet_radius = state.tuning.bullet_radius;
    let enemy_radius = state.tuning.enemy_radius;
    let enemy_ids = state.store.ids_of(KindTag::Enemy);

    for bullet_id in state.store.ids_of(KindTag::Bullet) {
        let Some(bullet) = state.store.get(bullet_id) else {
            continue;
        };
        if !matches!(bullet.kind, EntityKind::Bullet { player_owned: true }) {
            continue;
        }
        let bullet_pos = bullet.position;

        for &enemy_id in &enemy_ids {
            let Some(enemy) = state.store.get(enemy_id) else {
                continue;
            };
            if !circles_overlap(bullet_pos, bullet_radius, enemy.position, enemy_radius) {
                continue;
            }
            let impact = enemy.position;
            state.destroy(bullet_id, DestroyCause::Hit, sink);

            let killed = match state.store.get_mut(enemy_id) {
                Some(enemy) => match &mut enemy.kind {
                    EntityKind::Enemy { health, .. } => {
                        *health -= 1;
                        *health <= 0
                    }
                    _ => false,
                },
                None => false,
            };
            if killed {
                let points = state.tuning.score_per_kill * state.level;
                state.add_score(points, sink);
                state.destroy(enemy_id, DestroyCause::Hit, sink);
                spawn_explosion(state, impact, sink);
            }
            break;
        }
    }
}

/// Enemy bullets that reach the player deal damage and burst on impact.
fn resolve_enemy_bullets(state: &mut GameState, sink: &mut dyn EventSink) {
    let Some(player_pos) = state.player_position() else {
        return;
    };
    let bullet_radius = state.tuning.bullet_radius;
    let player_radius = state.tuning.player_radius;
    let bullet_damage = state.tuning.bullet_damage;

    for bullet_id in state.store.ids_of(KindTag::Bullet) {
        let Some(bullet) = state.store.get(bullet_id) else {
            continue;
        };
        if !matches!(bullet.kind, EntityKind::Bullet { player_owned: false }) {
            continue;
        }
        if !circles_overlap(bullet.position, bullet_radius, player_pos, player_radius) {
            continue;
        }
        let impact = bullet.position;
        state.apply_player_damage(bullet_damage, sink);
        state.destroy(bullet_id, DestroyCause::Hit, sink);
        spawn_explosion(state, impact, sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Entity, EntityId};
    use crate::sim::events::recording::{Event, RecordingSink};
    use crate::sim::state::{ArenaBounds, GamePhase};

    fn state() -> GameState {
        GameState::new(11, ArenaBounds::from_aspect(16.0 / 9.0))
    }

    fn add_enemy(state: &mut GameState, pos: Vec2, health: i32) -> EntityId {
        state.store.add(Entity::new(
            EntityKind::Enemy {
                health,
                last_shot_ms: 0.0,
                shot_cooldown_ms: 2500.0,
            },
            pos,
            Vec2::ZERO,
            0.0,
        ))
    }

    fn add_bullet(state: &mut GameState, pos: Vec2, player_owned: bool) -> EntityId {
        state.store.add(Entity::new(
            EntityKind::Bullet { player_owned },
            pos,
            Vec2::ZERO,
            0.0,
        ))
    }

    #[test]
    fn circles_overlap_uses_combined_radius() {
        assert!(circles_overlap(Vec2::ZERO, 0.3, Vec2::new(0.5, 0.0), 0.3));
        assert!(!circles_overlap(Vec2::ZERO, 0.3, Vec2::new(0.7, 0.0), 0.3));
        // Exactly touching is not overlapping.
        assert!(!circles_overlap(Vec2::ZERO, 0.3, Vec2::new(0.6, 0.0), 0.3));
    }

    #[test]
    fn ram_kills_the_enemy_outright_and_hurts_the_player() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        let player = state.player_position().unwrap();
        // Plenty of health left; rams ignore it.
        let enemy = add_enemy(&mut state, player + Vec2::new(0.3, 0.0), 5);

        resolve(&mut state, &mut sink);

        assert!(state.store.get(enemy).is_none());
        assert_eq!(state.health, 80);
        assert_eq!(state.score, 0);
        assert_eq!(sink.destroyed_with_cause(DestroyCause::Hit), 1);
        assert_eq!(sink.count_matching(|e| matches!(e, Event::Damage(20))), 1);
        assert_eq!(state.store.count(KindTag::Particle), 20);
    }

    #[test]
    fn bullet_wears_an_enemy_down_before_killing_it() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        let enemy = add_enemy(&mut state, Vec2::new(0.0, 5.0), 2);

        let first = add_bullet(&mut state, Vec2::new(0.0, 5.0), true);
        resolve(&mut state, &mut sink);

        // First hit consumes the bullet but only wounds the enemy.
        assert!(state.store.get(first).is_none());
        let EntityKind::Enemy { health, .. } = state.store.get(enemy).unwrap().kind else {
            panic!("expected enemy");
        };
        assert_eq!(health, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.store.count(KindTag::Particle), 0);

        let second = add_bullet(&mut state, Vec2::new(0.0, 5.0), true);
        resolve(&mut state, &mut sink);

        assert!(state.store.get(second).is_none());
        assert!(state.store.get(enemy).is_none());
        assert_eq!(state.score, 10);
        assert_eq!(state.store.count(KindTag::Particle), 20);
    }

    #[test]
    fn kill_score_scales_with_level() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        state.level = 7;
        add_enemy(&mut state, Vec2::new(0.0, 5.0), 1);
        add_bullet(&mut state, Vec2::new(0.0, 5.0), true);

        resolve(&mut state, &mut sink);

        assert_eq!(state.score, 70);
        assert_eq!(sink.count_matching(|e| matches!(e, Event::Score(70))), 1);
    }

    #[test]
    fn bullet_hits_the_first_enemy_in_store_order() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        let first = add_enemy(&mut state, Vec2::new(0.0, 5.0), 1);
        let second = add_enemy(&mut state, Vec2::new(0.1, 5.0), 1);
        add_bullet(&mut state, Vec2::new(0.05, 5.0), true);

        resolve(&mut state, &mut sink);

        assert!(state.store.get(first).is_none());
        assert!(state.store.get(second).is_some());
        assert_eq!(state.score, 10);
    }

    #[test]
    fn one_bullet_cannot_kill_two_enemies() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        // Two bullets, two overlapping enemies: each bullet takes one.
        add_enemy(&mut state, Vec2::new(0.0, 5.0), 1);
        add_enemy(&mut state, Vec2::new(0.05, 5.0), 1);
        add_bullet(&mut state, Vec2::new(0.0, 5.0), true);
        add_bullet(&mut state, Vec2::new(0.0, 5.0), true);

        resolve(&mut state, &mut sink);

        assert_eq!(state.store.count(KindTag::Enemy), 0);
        assert_eq!(state.store.count(KindTag::Bullet), 0);
        assert_eq!(state.score, 20);
    }

    #[test]
    fn player_bullets_pass_through_the_player() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        let player = state.player_position().unwrap();
        let own = add_bullet(&mut state, player, true);

        resolve(&mut state, &mut sink);

        assert!(state.store.get(own).is_some());
        assert_eq!(state.health, 100);
    }

    #[test]
    fn enemy_bullet_damages_the_player_and_bursts() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        let player = state.player_position().unwrap();
        let impact = player + Vec2::new(0.2, 0.0);
        let bullet = add_bullet(&mut state, impact, false);

        resolve(&mut state, &mut sink);

        assert!(state.store.get(bullet).is_none());
        assert_eq!(state.health, 90);
        assert_eq!(sink.count_matching(|e| matches!(e, Event::Damage(10))), 1);
        // The burst sits where the bullet died, not on the player.
        let particle = state
            .store
            .iter_kind(KindTag::Particle)
            .next()
            .expect("explosion particles");
        assert_eq!(particle.position, impact);
    }

    #[test]
    fn lethal_ram_ends_the_run_exactly_once() {
        let mut state = state();
        let mut sink = RecordingSink::new();
        state.health = 30;
        let player = state.player_position().unwrap();
        // Two simultaneous rams; the second lands after the transition.
        add_enemy(&mut state, player + Vec2::new(0.2, 0.0), 1);
        add_enemy(&mut state, player - Vec2::new(0.2, 0.0), 1);

        resolve(&mut state, &mut sink);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(sink.game_overs(), 1);
        assert_eq!(state.health, 10 - 20);
        assert_eq!(state.store.count(KindTag::Enemy), 0);
    }
}
