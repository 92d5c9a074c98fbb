//! # Component Storage
//!
//! Pre-allocated sparse-set storage for a single component type.
//!
//! ```text
//! sparse:     [ -, 1, -, 0, - ]        indexed by entity index
//! components: [ C3, C1 ]               dense, packed
//! owners:     [ e3, e1 ]               parallel to components
//! ```
//!
//! - Insert appends to the dense tail: O(1)
//! - Remove swaps the last live slot into the hole: O(1)
//! - Iteration walks contiguous memory
//!
//! Dense order is whatever the swap-remove history produced. It is not
//! insertion order and it changes on every removal, so dense indices and
//! references must not be held across a mutation.
//!
//! Only the index half of an [`Entity`] addresses the array. Whether a
//! handle is still current is the allocator's concern, not the storage's.

use std::any::type_name;

use super::entity::Entity;
use crate::error::{EcsError, EcsResult};

/// Sparse slot value meaning "no component for this entity".
const ABSENT: usize = usize::MAX;

/// Dense, cache-packed storage for one component type.
///
/// This storage guarantees:
/// - Zero allocations after construction
/// - O(1) insert, remove and lookup by entity
/// - `sparse[owners[d].index()] == d` for every dense index `d`
///
/// # Example
///
/// ```rust,ignore
/// let mut positions: ComponentArray<Position> = ComponentArray::new(1024);
/// positions.insert(Entity::new(3, 0), Position::new(1.0, 2.0))?;
/// assert!(positions.has(Entity::new(3, 0)));
/// ```
pub struct ComponentArray<T> {
    /// Packed component values.
    components: Vec<T>,
    /// `owners[d]` owns `components[d]`.
    owners: Vec<Entity>,
    /// Entity index -> dense index, or `ABSENT`.
    sparse: Box<[usize]>,
    /// Maximum number of entities (and live components).
    capacity: usize,
}

impl<T: 'static> ComponentArray<T> {
    /// Creates storage for entity indices `0..capacity`.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        Self {
            components: Vec::with_capacity(capacity),
            owners: Vec::with_capacity(capacity),
            sparse: vec![ABSENT; capacity].into_boxed_slice(),
            capacity,
        }
    }

    #[inline]
    fn slot(&self, entity: Entity) -> EcsResult<usize> {
        let index = entity.index() as usize;
        if index < self.capacity {
            Ok(index)
        } else {
            Err(EcsError::EntityOutOfBounds {
                entity,
                index: entity.index(),
                capacity: self.capacity,
            })
        }
    }

    #[inline]
    fn dense(&self, entity: Entity) -> EcsResult<usize> {
        let slot = self.slot(entity)?;
        self.lookup(slot).ok_or(EcsError::MissingComponent {
            entity,
            component: type_name::<T>(),
        })
    }

    #[inline]
    fn lookup(&self, slot: usize) -> Option<usize> {
        match self.sparse[slot] {
            ABSENT => None,
            dense => Some(dense),
        }
    }

    /// Attaches `component` to `entity`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::EntityOutOfBounds`] if the index does not fit
    /// - [`EcsError::DuplicateComponent`] if the slot is already occupied
    /// - [`EcsError::StorageFull`] if `capacity` components are live
    pub fn insert(&mut self, entity: Entity, component: T) -> EcsResult<()> {
        let slot = self.slot(entity)?;
        if self.sparse[slot] != ABSENT {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: type_name::<T>(),
            });
        }
        if self.is_full() {
            return Err(EcsError::StorageFull {
                component: type_name::<T>(),
                capacity: self.capacity,
            });
        }

        self.sparse[slot] = self.components.len();
        self.owners.push(entity);
        self.components.push(component);
        Ok(())
    }

    /// Detaches and returns the component of `entity`.
    ///
    /// The last live component is moved into the freed dense slot.
    ///
    /// # Errors
    ///
    /// - [`EcsError::EntityOutOfBounds`] if the index does not fit
    /// - [`EcsError::MissingComponent`] if the entity has no component here
    pub fn remove(&mut self, entity: Entity) -> EcsResult<T> {
        let removed = self.dense(entity)?;

        let component = self.components.swap_remove(removed);
        self.owners.swap_remove(removed);

        // The former tail now lives at `removed`.
        if let Some(&moved) = self.owners.get(removed) {
            self.sparse[moved.index() as usize] = removed;
        }

        self.sparse[entity.index() as usize] = ABSENT;
        Ok(component)
    }

    /// Returns the component of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityOutOfBounds`] or [`EcsError::MissingComponent`].
    #[inline]
    pub fn get(&self, entity: Entity) -> EcsResult<&T> {
        let dense = self.dense(entity)?;
        Ok(&self.components[dense])
    }

    /// Returns the component of `entity` mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityOutOfBounds`] or [`EcsError::MissingComponent`].
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> EcsResult<&mut T> {
        let dense = self.dense(entity)?;
        Ok(&mut self.components[dense])
    }

    /// Returns the component of `entity`, or `None` if absent.
    #[inline]
    #[must_use]
    pub fn try_get(&self, entity: Entity) -> Option<&T> {
        let dense = self.index_of(entity)?;
        self.components.get(dense)
    }

    /// Returns the component of `entity` mutably, or `None` if absent.
    #[inline]
    pub fn try_get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let dense = self.index_of(entity)?;
        self.components.get_mut(dense)
    }

    /// Checks if `entity` has a component here. Never errors.
    #[inline]
    #[must_use]
    pub fn has(&self, entity: Entity) -> bool {
        self.index_of(entity).is_some()
    }

    /// Returns the current dense index of `entity`.
    #[inline]
    #[must_use]
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        let slot = self.slot(entity).ok()?;
        self.lookup(slot)
    }

    /// Number of live components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Checks if no component is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Checks if every slot is occupied.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.components.len() == self.capacity
    }

    /// Returns the capacity of this storage.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes every component without releasing memory.
    ///
    /// Only the sparse slots of live owners are reset.
    pub fn clear(&mut self) {
        for owner in &self.owners {
            self.sparse[owner.index() as usize] = ABSENT;
        }
        self.components.clear();
        self.owners.clear();
    }

    /// Packed components in dense order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.components
    }

    /// Packed components in dense order, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Owners in dense order, parallel to [`ComponentArray::as_slice`].
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.owners
    }

    /// Iterates over `(owner, component)` pairs in dense order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.owners.iter().copied().zip(self.components.iter())
    }

    /// Iterates mutably over `(owner, component)` pairs in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.owners.iter().copied().zip(self.components.iter_mut())
    }

    /// Component at dense index `index`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DenseIndexOutOfBounds`] if `index >= len()`.
    #[inline]
    pub fn at_index(&self, index: usize) -> EcsResult<&T> {
        let len = self.len();
        self.components
            .get(index)
            .ok_or(EcsError::DenseIndexOutOfBounds { index, len })
    }

    /// Component at dense index `index`, mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::DenseIndexOutOfBounds`] if `index >= len()`.
    #[inline]
    pub fn at_index_mut(&mut self, index: usize) -> EcsResult<&mut T> {
        let len = self.len();
        self.components
            .get_mut(index)
            .ok_or(EcsError::DenseIndexOutOfBounds { index, len })
    }

    /// Owner of dense index `index`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DenseIndexOutOfBounds`] if `index >= len()`.
    #[inline]
    pub fn entity_at_index(&self, index: usize) -> EcsResult<Entity> {
        self.owners
            .get(index)
            .copied()
            .ok_or(EcsError::DenseIndexOutOfBounds {
                index,
                len: self.len(),
            })
    }
}

impl<T> std::fmt::Debug for ComponentArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentArray")
            .field("component", &std::any::type_name::<T>())
            .field("len", &self.components.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
