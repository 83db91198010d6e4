//! Game state: phase machine, arena geometry, score/health/level, and the
//! entity store plus the RNG that drives all randomized gameplay.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{
    ARENA_HALF_HEIGHT, PLAYER_MARGIN, PLAYER_START_HEALTH, PLAYER_START_X, PLAYER_START_Y,
};
use crate::tuning::Tuning;

use super::entity::{Entity, EntityId, EntityKind, EntityStore};
use super::events::{DestroyCause, EventSink};
use super::spawn::Spawner;

/// Top-level lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Normal play; the tick advances the world.
    Playing,
    /// Frozen mid-run. No time passes, nothing moves, nothing spawns.
    Paused,
    /// The run ended. Only a reset leaves this phase.
    GameOver,
}

/// Arena extents, centered on the origin. Height is fixed; width follows the
/// viewport aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    pub half_width: f32,
    pub half_height: f32,
}

impl ArenaBounds {
    pub fn from_aspect(aspect: f32) -> Self {
        Self {
            half_width: ARENA_HALF_HEIGHT * aspect,
            half_height: ARENA_HALF_HEIGHT,
        }
    }

    /// Largest |x|,|y| the player's center may occupy.
    pub fn player_max(&self) -> Vec2 {
        Vec2::new(
            self.half_width - PLAYER_MARGIN,
            self.half_height - PLAYER_MARGIN,
        )
    }
}

/// The complete simulation state. Owns its own clock: `clock_ms` only
/// advances while the phase is [`GamePhase::Playing`], which is what makes
/// pause airtight for every timer in the game (spawn gate, fire cooldowns,
/// per-enemy shot timers) without re-baselining any of them.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Run seed for reproducibility.
    pub seed: u64,
    pub rng: Pcg32,
    /// Monotonic sim time in ms. Advances by the frame delta each unpaused
    /// tick, never otherwise.
    pub clock_ms: f64,
    pub score: u32,
    /// Raw health; goes negative on the killing blow. HUD display clamps via
    /// [`GameState::display_health`].
    pub health: i32,
    /// Difficulty level, starts at 1. Drives enemy speed, enemy health and
    /// kill score.
    pub level: u32,
    pub phase: GamePhase,
    pub bounds: ArenaBounds,
    pub tuning: Tuning,
    pub store: EntityStore,
    pub spawner: Spawner,
    player_id: EntityId,
}

impl GameState {
    pub fn new(seed: u64, bounds: ArenaBounds) -> Self {
        Self::with_tuning(seed, bounds, Tuning::default())
    }

    pub fn with_tuning(seed: u64, bounds: ArenaBounds, tuning: Tuning) -> Self {
        let mut store = EntityStore::new();
        let player_id = store.add(Entity::new(
            EntityKind::Player,
            Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            Vec2::ZERO,
            0.0,
        ));
        let spawner = Spawner::new(tuning.spawn_interval_start_ms);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            clock_ms: 0.0,
            score: 0,
            health: PLAYER_START_HEALTH,
            level: 1,
            phase: GamePhase::Playing,
            bounds,
            tuning,
            store,
            spawner,
            player_id,
        }
    }

    pub fn player_id(&self) -> EntityId {
        self.player_id
    }

    /// Position of the player ship. The player entity is never removed, so
    /// `None` only occurs if the store was tampered with externally.
    pub fn player_position(&self) -> Option<Vec2> {
        self.store.get(self.player_id).map(|e| e.position)
    }

    /// Health clamped to zero for display.
    pub fn display_health(&self) -> i32 {
        self.health.max(0)
    }

    /// Playing <-> Paused. Ignored once the run has ended; a dead run cannot
    /// be paused or unpaused.
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                log::debug!("paused at {:.0}ms", self.clock_ms);
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                log::debug!("resumed at {:.0}ms", self.clock_ms);
            }
            GamePhase::GameOver => {}
        }
    }

    /// Applies damage to the player, transitioning to game over when health
    /// is exhausted. The transition fires exactly once; damage arriving after
    /// it is dropped.
    pub fn apply_player_damage(&mut self, amount: i32, sink: &mut dyn EventSink) {
        debug_assert!(amount >= 0, "damage amount must not be negative");
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.health -= amount;
        sink.on_damage(amount);
        if self.health <= 0 {
            self.phase = GamePhase::GameOver;
            log::info!(
                "game over: score {}, level {}, {:.1}s survived",
                self.score,
                self.level,
                self.clock_ms / 1000.0
            );
            sink.on_game_over();
        }
    }

    pub fn add_score(&mut self, points: u32, sink: &mut dyn EventSink) {
        self.score += points;
        sink.on_score_changed(self.score);
    }

    /// Removes `id` from the store and reports it to the sink. Stale ids are
    /// ignored.
    pub fn destroy(&mut self, id: EntityId, cause: DestroyCause, sink: &mut dyn EventSink) {
        if let Some(entity) = self.store.remove(id) {
            sink.on_entity_destroyed(&entity, cause);
        }
    }

    /// Adopts new arena bounds (viewport resize) and immediately re-clamps
    /// the player, so a shrink cannot strand the ship outside the field even
    /// while paused.
    pub fn set_bounds(&mut self, bounds: ArenaBounds) {
        self.bounds = bounds;
        let max = bounds.player_max();
        if let Some(player) = self.store.get_mut(self.player_id) {
            player.position = player.position.clamp(-max, max);
        }
    }

    /// Returns the game to a fresh run: score, health and level restored,
    /// every non-player entity cleared, spawn cadence back to its starting
    /// interval, clock rewound. The RNG stream continues, so consecutive runs
    /// differ.
    pub fn reset(&mut self, sink: &mut dyn EventSink) {
        let doomed: Vec<EntityId> = self
            .store
            .iter()
            .filter(|e| e.id != self.player_id)
            .map(|e| e.id)
            .collect();
        for id in doomed {
            self.destroy(id, DestroyCause::Cleared, sink);
        }
        self.score = 0;
        self.health = PLAYER_START_HEALTH;
        self.level = 1;
        self.phase = GamePhase::Playing;
        self.clock_ms = 0.0;
        self.spawner = Spawner::new(self.tuning.spawn_interval_start_ms);
        if let Some(player) = self.store.get_mut(self.player_id) {
            player.position = Vec2::new(PLAYER_START_X, PLAYER_START_Y);
            player.velocity = Vec2::ZERO;
        }
        log::info!("reset to new run");
        sink.on_reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::KindTag;
    use crate::sim::events::recording::{Event, RecordingSink};

    fn bounds() -> ArenaBounds {
        ArenaBounds::from_aspect(16.0 / 9.0)
    }

    #[test]
    fn new_state_holds_only_the_player() {
        let state = GameState::new(7, bounds());
        assert_eq!(state.store.len(), 1);
        assert_eq!(state.store.count(KindTag::Player), 1);
        assert_eq!(state.health, 100);
        assert_eq!(state.level, 1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(
            state.player_position().unwrap(),
            Vec2::new(PLAYER_START_X, PLAYER_START_Y)
        );
    }

    #[test]
    fn display_health_clamps_negative_values() {
        let mut state = GameState::new(0, bounds());
        state.health = -30;
        assert_eq!(state.display_health(), 0);
        state.health = 40;
        assert_eq!(state.display_health(), 40);
    }

    #[test]
    fn pause_toggles_but_not_after_game_over() {
        let mut state = GameState::new(0, bounds());
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Paused);
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::Playing);

        state.phase = GamePhase::GameOver;
        state.toggle_pause();
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn game_over_fires_once_and_gates_further_damage() {
        let mut state = GameState::new(0, bounds());
        let mut sink = RecordingSink::new();
        state.health = 15;

        state.apply_player_damage(10, &mut sink);
        assert_eq!(state.phase, GamePhase::Playing);
        state.apply_player_damage(10, &mut sink);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.health, -5);

        // Anything landing after the transition is dropped entirely.
        state.apply_player_damage(20, &mut sink);
        assert_eq!(state.health, -5);
        assert_eq!(sink.game_overs(), 1);
        assert_eq!(sink.count_matching(|e| matches!(e, Event::Damage(_))), 2);
    }

    #[test]
    fn reset_restores_a_fresh_run() {
        let mut state = GameState::new(3, bounds());
        let mut sink = RecordingSink::new();
        state.score = 480;
        state.health = -10;
        state.level = 6;
        state.phase = GamePhase::GameOver;
        state.clock_ms = 90_000.0;
        state.spawner.spawn_interval_ms = 300.0;
        state.spawner.spawned_total = 120;
        for i in 0..4 {
            state.store.add(Entity::new(
                EntityKind::Bullet {
                    player_owned: i % 2 == 0,
                },
                Vec2::ZERO,
                Vec2::ZERO,
                0.0,
            ));
        }

        state.reset(&mut sink);

        assert_eq!(state.score, 0);
        assert_eq!(state.health, 100);
        assert_eq!(state.level, 1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.clock_ms, 0.0);
        assert_eq!(state.spawner.spawn_interval_ms, 1000.0);
        assert_eq!(state.spawner.spawned_total, 0);
        assert_eq!(state.store.len(), 1);
        assert_eq!(
            state.player_position().unwrap(),
            Vec2::new(PLAYER_START_X, PLAYER_START_Y)
        );
        assert_eq!(sink.destroyed_with_cause(DestroyCause::Cleared), 4);
        assert_eq!(sink.count_matching(|e| matches!(e, Event::Reset)), 1);
    }

    #[test]
    fn resize_reclamps_the_player() {
        let mut state = GameState::new(0, bounds());
        let player_id = state.player_id();
        let wide = state.bounds.player_max();
        if let Some(p) = state.store.get_mut(player_id) {
            p.position = Vec2::new(wide.x, -7.0);
        }

        // Shrink to a much narrower viewport.
        state.set_bounds(ArenaBounds::from_aspect(0.5));
        let max = state.bounds.player_max();
        let pos = state.player_position().unwrap();
        assert!(pos.x <= max.x);
        assert_eq!(pos.y, -7.0);
    }
}
