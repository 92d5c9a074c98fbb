//! # Entity Allocator
//!
//! Issues and recycles [`Entity`] handles and tracks each live entity's
//! aggregate [`Signature`].
//!
//! Every slot is pre-allocated. Destroying an entity bumps its slot's
//! generation so handles from the previous life are detected as stale.

use super::entity::Entity;
use super::signature::Signature;
use crate::error::{EcsError, EcsResult};

/// Per-index bookkeeping.
#[derive(Clone, Copy, Debug)]
struct EntitySlot {
    signature: Signature,
    generation: u32,
    alive: bool,
}

impl EntitySlot {
    const fn dead() -> Self {
        Self {
            signature: Signature::EMPTY,
            generation: 0,
            alive: false,
        }
    }
}

/// Fixed-capacity entity allocator.
///
/// # Example
///
/// ```rust,ignore
/// let mut entities = EntityManager::new(1024);
///
/// let e = entities.create()?;
/// entities.destroy(e)?;
/// assert!(!entities.is_alive(e));
/// ```
pub struct EntityManager {
    /// All entity slots (pre-allocated).
    slots: Box<[EntitySlot]>,
    /// Free indices, popped from the back; lowest index on top.
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
}

impl EntityManager {
    /// Creates an allocator for `capacity` entities.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        let Ok(count) = u32::try_from(capacity) else {
            panic!("Capacity cannot exceed u32::MAX");
        };

        Self {
            slots: vec![EntitySlot::dead(); capacity].into_boxed_slice(),
            free_indices: (0..count).rev().collect(),
            alive_count: 0,
        }
    }

    /// Returns the maximum number of entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of alive entities.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.alive_count
    }

    /// Checks if no entity is alive.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Number of free slots.
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.free_indices.len()
    }

    /// Checks if every slot is in use.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_indices.is_empty()
    }

    /// Allocates a new entity with an empty signature.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntitiesExhausted`] if every slot is in use.
    pub fn create(&mut self) -> EcsResult<Entity> {
        let index = self
            .free_indices
            .pop()
            .ok_or(EcsError::EntitiesExhausted(self.slots.len()))?;

        let slot = &mut self.slots[index as usize];
        slot.alive = true;
        slot.signature = Signature::EMPTY;
        self.alive_count += 1;

        let entity = Entity::new(index, slot.generation);
        tracing::trace!(?entity, "created entity");
        Ok(entity)
    }

    /// Validates `entity` against its slot and returns the slot index.
    fn check(&self, entity: Entity) -> EcsResult<usize> {
        let index = entity.index() as usize;
        let slot = self.slots.get(index).ok_or(EcsError::EntityOutOfBounds {
            entity,
            index: entity.index(),
            capacity: self.slots.len(),
        })?;

        if !slot.alive {
            return Err(EcsError::DeadEntity(entity));
        }
        if slot.generation != entity.generation() {
            return Err(EcsError::StaleEntity {
                entity,
                current: slot.generation,
            });
        }
        Ok(index)
    }

    /// Retires `entity` and recycles its index.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityOutOfBounds`], [`EcsError::DeadEntity`] or
    /// [`EcsError::StaleEntity`].
    pub fn destroy(&mut self, entity: Entity) -> EcsResult<()> {
        let index = self.check(entity)?;

        let slot = &mut self.slots[index];
        slot.alive = false;
        slot.signature = Signature::EMPTY;
        slot.generation = slot.generation.wrapping_add(1);
        self.alive_count -= 1;
        self.free_indices.push(entity.index());

        tracing::trace!(?entity, "destroyed entity");
        Ok(())
    }

    /// Checks if `entity` is alive and current.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.check(entity).is_ok()
    }

    /// Stores the aggregate signature of `entity`.
    ///
    /// # Errors
    ///
    /// Same as [`EntityManager::destroy`].
    pub fn set_signature(&mut self, entity: Entity, signature: Signature) -> EcsResult<()> {
        let index = self.check(entity)?;
        self.slots[index].signature = signature;
        Ok(())
    }

    /// Returns the aggregate signature of `entity`.
    ///
    /// # Errors
    ///
    /// Same as [`EntityManager::destroy`].
    pub fn signature(&self, entity: Entity) -> EcsResult<Signature> {
        let index = self.check(entity)?;
        Ok(self.slots[index].signature)
    }

    /// Frees every slot and resets generations.
    pub fn clear(&mut self) {
        self.slots.fill(EntitySlot::dead());
        self.free_indices.clear();
        self.free_indices.extend(
            (0..self.slots.len())
                .rev()
                .filter_map(|index| u32::try_from(index).ok()),
        );
        self.alive_count = 0;
    }

    /// Iterates over alive entities with their signatures, by index.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, Signature)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let index = u32::try_from(index).ok().filter(|_| slot.alive)?;
            Some((Entity::new(index, slot.generation), slot.signature))
        })
    }

    /// Iterates over alive entities whose signature matches `required`.
    pub fn matching(&self, required: Signature) -> impl Iterator<Item = Entity> + '_ {
        self.iter()
            .filter(move |(_, signature)| signature.matches(&required))
            .map(|(entity, _)| entity)
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("alive", &self.alive_count)
            .field("capacity", &self.slots.len())
            .finish()
    }
}
