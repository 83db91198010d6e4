//! Entities and the insertion-ordered store that holds them.
//!
//! Everything that exists in the arena is an [`Entity`]: one record with a
//! position, a velocity and a kind-specific payload. Systems address entities
//! by [`EntityId`] and re-resolve through the store on every access, so a
//! handle that outlives its entity simply stops resolving instead of dangling.

use glam::Vec2;

/// Opaque handle for an entity. Ids are assigned by [`EntityStore::add`],
/// start at 1 and are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind-specific payload carried by each entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    /// The player ship. Health lives on the game state, not here.
    Player,
    /// A descending enemy ship with its own fire timer.
    Enemy {
        health: i32,
        /// Sim-clock time of the last shot, in ms. Initialized to the spawn
        /// time so a fresh enemy waits out one full cooldown before firing.
        last_shot_ms: f64,
        /// Per-enemy randomized cooldown between shots, in ms.
        shot_cooldown_ms: f64,
    },
    /// A projectile. Player bullets travel up and hit enemies; enemy bullets
    /// travel down and hit the player.
    Bullet { player_owned: bool },
    /// A short-lived explosion fragment, culled by life expiry alone.
    Particle { life: u32, initial_life: u32 },
}

/// Fieldless discriminant of [`EntityKind`], used for store queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Player,
    Enemy,
    Bullet,
    Particle,
}

impl EntityKind {
    pub fn tag(&self) -> KindTag {
        match self {
            EntityKind::Player => KindTag::Player,
            EntityKind::Enemy { .. } => KindTag::Enemy,
            EntityKind::Bullet { .. } => KindTag::Bullet,
            EntityKind::Particle { .. } => KindTag::Particle,
        }
    }
}

/// One simulated object.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// World position, arena-centered. +y is up.
    pub position: Vec2,
    /// World velocity in units per second.
    pub velocity: Vec2,
    /// Sim-clock time this entity was created, in ms.
    pub spawned_at_ms: f64,
}

impl Entity {
    /// Builds an entity with a placeholder id; the store assigns the real one.
    pub fn new(kind: EntityKind, position: Vec2, velocity: Vec2, spawned_at_ms: f64) -> Self {
        Self {
            id: EntityId(0),
            kind,
            position,
            velocity,
            spawned_at_ms,
        }
    }
}

/// Flat, insertion-ordered entity collection.
///
/// Iteration order is the order entities were added, which collision
/// resolution relies on ("first enemy in store order absorbs the hit").
/// Removal keeps that order intact.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStore {
    entities: Vec<Entity>,
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Assigns the next id to `entity`, stores it and returns the id.
    pub fn add(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.entities.push(entity);
        id
    }

    /// Removes and returns the entity with `id`. Removing an id that is
    /// already gone is a no-op, so systems can hold stale handles safely.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.entities.iter_mut()
    }

    pub fn iter_kind(&self, tag: KindTag) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind.tag() == tag)
    }

    /// Snapshot of the ids of every entity of `tag`, in store order. Systems
    /// iterate these snapshots so that removals mid-pass cannot invalidate
    /// the traversal.
    pub fn ids_of(&self, tag: KindTag) -> Vec<EntityId> {
        self.iter_kind(tag).map(|e| e.id).collect()
    }

    pub fn count(&self, tag: KindTag) -> usize {
        self.iter_kind(tag).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
