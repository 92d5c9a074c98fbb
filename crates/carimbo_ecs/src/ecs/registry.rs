//! # Component Type Registry
//!
//! Assigns each Rust type a small, stable [`ComponentType`] id on first use.
//!
//! Ids come from a monotonically increasing counter and are never
//! reclaimed. The registry is an explicit context object: every
//! [`ComponentManager`](super::ComponentManager) built from the same
//! `Arc<TypeRegistry>` sees the same numbering, so signatures computed
//! against one manager stay comparable with systems configured against
//! another. Managers built from different registries have independent id
//! spaces.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use parking_lot::RwLock;

use super::signature::{ComponentType, Signature};
use crate::error::{EcsError, EcsResult};

/// Process-level table of component-type ids.
#[derive(Debug)]
pub struct TypeRegistry {
    ids: RwLock<HashMap<TypeId, ComponentType>>,
    capacity: usize,
}

impl TypeRegistry {
    /// Creates a registry handing out at most `capacity` ids.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or larger than [`Signature::CAPACITY`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= Signature::CAPACITY,
            "Capacity cannot exceed the signature width"
        );

        Self {
            ids: RwLock::new(HashMap::with_capacity(capacity)),
            capacity,
        }
    }

    /// Returns the id of `T`, assigning the next free one on first call.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentTypesExhausted`] once every id is taken.
    pub fn id_of<T: 'static>(&self) -> EcsResult<ComponentType> {
        let key = TypeId::of::<T>();
        if let Some(&id) = self.ids.read().get(&key) {
            return Ok(id);
        }

        let mut ids = self.ids.write();
        // Another caller may have assigned it between the two locks.
        if let Some(&id) = ids.get(&key) {
            return Ok(id);
        }

        let next = ids.len();
        let id = ComponentType::try_from(next)
            .ok()
            .filter(|_| next < self.capacity)
            .ok_or(EcsError::ComponentTypesExhausted {
                capacity: self.capacity,
            })?;

        ids.insert(key, id);
        tracing::debug!(component = type_name::<T>(), id, "assigned component type id");
        Ok(id)
    }

    /// Returns the id of `T` without assigning one.
    #[must_use]
    pub fn lookup<T: 'static>(&self) -> Option<ComponentType> {
        self.ids.read().get(&TypeId::of::<T>()).copied()
    }

    /// Number of ids assigned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.read().len()
    }

    /// Checks if no id has been assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.read().is_empty()
    }

    /// Maximum number of ids.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(Signature::CAPACITY)
    }
}
