//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time comes only from the sim clock, which advances only inside the tick
//! - Randomness comes only from the seeded RNG on the game state
//! - Entity iteration follows stable insertion order
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod events;
pub mod motion;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::circles_overlap;
pub use entity::{Entity, EntityId, EntityKind, EntityStore, KindTag};
pub use events::{DestroyCause, EventSink, NullSink};
pub use spawn::{Spawner, spawn_explosion, try_fire_player_bullet, try_spawn_enemy};
pub use state::{ArenaBounds, GamePhase, GameState};
pub use tick::{TickInput, tick};
