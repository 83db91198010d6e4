//! Observer interface between the simulation and the outside world.
//!
//! The sim never talks to audio, rendering or the DOM directly. Every
//! externally interesting change is reported through an [`EventSink`] passed
//! into the tick; collaborators (sound, HUD) implement the trait and react,
//! while headless runs and most tests plug in [`NullSink`].

use super::entity::Entity;

/// Why an entity was removed from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyCause {
    /// Destroyed by a collision (bullet impact or ram).
    Hit,
    /// An enemy descended past the bottom edge without being stopped.
    Escaped,
    /// A bullet flew past the top or bottom cull margin.
    OutOfBounds,
    /// A particle's life counter ran out.
    Expired,
    /// Removed wholesale by a game reset.
    Cleared,
}

/// Receiver for simulation events. All methods default to no-ops so sinks
/// only implement what they care about.
pub trait EventSink {
    /// A new entity entered the store. Called after insertion, so the entity
    /// carries its final id.
    fn on_entity_spawned(&mut self, _entity: &Entity) {}

    /// An entity left the store. The entity is already removed; the snapshot
    /// here is the last state it had.
    fn on_entity_destroyed(&mut self, _entity: &Entity, _cause: DestroyCause) {}

    /// The player took damage.
    fn on_damage(&mut self, _amount: i32) {}

    /// The score changed; `score` is the new total.
    fn on_score_changed(&mut self, _score: u32) {}

    /// Health reached zero. Fired exactly once per run.
    fn on_game_over(&mut self) {}

    /// The game was reset to a fresh run.
    fn on_reset(&mut self) {}
}

/// Sink that ignores every event. Used for headless runs and tests that do
/// not assert on event traffic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {}

#[cfg(test)]
pub(crate) mod recording {
    //! Test double that captures the full event stream in order.

    use super::*;
    use crate::sim::entity::{EntityId, KindTag};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Event {
        Spawned { id: EntityId, tag: KindTag },
        Destroyed { id: EntityId, tag: KindTag, cause: DestroyCause },
        Damage(i32),
        Score(u32),
        GameOver,
        Reset,
    }

    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub events: Vec<Event>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count_matching(&self, pred: impl Fn(&Event) -> bool) -> usize {
            self.events.iter().filter(|e| pred(e)).count()
        }

        pub fn game_overs(&self) -> usize {
            self.count_matching(|e| matches!(e, Event::GameOver))
        }

        pub fn destroyed_with_cause(&self, cause: DestroyCause) -> usize {
            self.count_matching(|e| matches!(e, Event::Destroyed { cause: c, .. } if *c == cause))
        }

        pub fn spawned_of(&self, tag: KindTag) -> usize {
            self.count_matching(|e| matches!(e, Event::Spawned { tag: t, .. } if *t == tag))
        }
    }

    impl EventSink for RecordingSink {
        fn on_entity_spawned(&mut self, entity: &Entity) {
            self.events.push(Event::Spawned {
                id: entity.id,
                tag: entity.kind.tag(),
            });
        }

        fn on_entity_destroyed(&mut self, entity: &Entity, cause: DestroyCause) {
            self.events.push(Event::Destroyed {
                id: entity.id,
                tag: entity.kind.tag(),
                cause,
            });
        }

        fn on_damage(&mut self, amount: i32) {
            self.events.push(Event::Damage(amount));
        }

        fn on_score_changed(&mut self, score: u32) {
            self.events.push(Event::Score(score));
        }

        fn on_game_over(&mut self) {
            self.events.push(Event::GameOver);
        }

        fn on_reset(&mut self) {
            self.events.push(Event::Reset);
        }
    }
}
