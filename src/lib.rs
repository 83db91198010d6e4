//! Nova Strike: a wave-survival space shooter built around a deterministic,
//! frame-rate independent simulation core.
//!
//! The crate is split into:
//! - [`sim`]: entity store, spawning, motion, collision and the per-frame tick.
//!   Pure logic, no platform dependencies, runs headless on native targets.
//! - [`tuning`]: data-driven balance parameters with validation.
//! - [`audio`]: Web Audio sound effects and the chiptune music sequencer
//!   (wasm only; pattern data is target-independent).
//! - `render`: 2D canvas renderer (wasm only).

pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod render;
pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

/// Fixed gameplay constants. Balance values that make sense to tweak per
/// deployment live in [`crate::Tuning`] instead; these are the structural
/// ones.
pub mod consts {
    /// Arena half-height in world units. The visible field is 20 units tall;
    /// width follows the viewport aspect ratio.
    pub const ARENA_HALF_HEIGHT: f32 = 10.0;
    /// Inset keeping the player ship fully inside the visible arena.
    pub const PLAYER_MARGIN: f32 = 0.5;
    /// Horizontal inset applied to enemy spawn positions so ships never
    /// materialize clipped by the arena edge.
    pub const SPAWN_EDGE_INSET: f32 = 0.5;
    /// Enemies enter this far above the top edge.
    pub const SPAWN_Y_OFFSET: f32 = 1.0;
    /// Entities further than this past an arena edge are despawned.
    pub const CULL_MARGIN: f32 = 2.0;

    pub const PLAYER_START_X: f32 = 0.0;
    pub const PLAYER_START_Y: f32 = -7.0;
    pub const PLAYER_START_HEALTH: i32 = 100;

    /// Bullets leave the muzzle this far from the owner's center, along the
    /// direction of travel.
    pub const BULLET_SPAWN_OFFSET: f32 = 0.5;

    /// Every this many cumulative enemy spawns, the spawn interval tightens
    /// and the level rises.
    pub const DIFFICULTY_CADENCE: u32 = 10;

    pub const EXPLOSION_PARTICLE_COUNT: u32 = 20;
    pub const PARTICLE_MIN_SPEED: f32 = 6.0;
    pub const PARTICLE_MAX_SPEED: f32 = 12.0;
    /// Explosion particles live this many ticks, fading linearly.
    pub const PARTICLE_LIFE_TICKS: u32 = 30;

    /// Frame delta clamp in seconds. Protects the sim from the huge delta a
    /// backgrounded tab reports on its first frame back.
    pub const MAX_FRAME_DT: f32 = 0.1;
}
