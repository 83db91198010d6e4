//! Synthesized audio: event-driven sound effects and the looping chiptune
//! soundtrack. Pattern data lives in [`music`] and is testable anywhere; the
//! parts that talk to Web Audio only exist on wasm.

pub mod music;

#[cfg(target_arch = "wasm32")]
mod director;

#[cfg(target_arch = "wasm32")]
pub use director::AudioDirector;
