//! # Systems
//!
//! A system is a behavior unit run once per frame over the entities whose
//! signature satisfies its required [`Signature`].
//!
//! The membership list is a derived, cached view kept in sync by the
//! [`SystemManager`](super::SystemManager); systems never poll component
//! arrays to discover their entities.

use std::any::Any;

use super::entity::Entity;
use super::manager::ComponentManager;
use super::signature::Signature;
use crate::error::{EcsError, EcsResult};

/// Fixed-capacity list of the entities currently matching a system.
///
/// Removal swaps the last entry into the hole, so order is whatever the
/// add/remove history produced.
pub struct Membership {
    /// Pre-allocated entity slots; only `..count` are live.
    entities: Box<[Entity]>,
    /// Number of live entries.
    count: usize,
    /// Required component types.
    signature: Signature,
}

impl Membership {
    /// Creates an empty list with room for `capacity` entities.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        Self {
            entities: vec![Entity::NULL; capacity].into_boxed_slice(),
            count: 0,
            signature: Signature::EMPTY,
        }
    }

    /// Required component types.
    #[inline]
    #[must_use]
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Replaces the required component types.
    ///
    /// Existing members are not re-evaluated.
    #[inline]
    pub fn set_signature(&mut self, signature: Signature) {
        self.signature = signature;
    }

    /// Adds `entity` to the list.
    ///
    /// # Errors
    ///
    /// - [`EcsError::SystemFull`] if every slot is taken
    /// - [`EcsError::DuplicateSystemEntity`] if already a member
    pub fn add_entity(&mut self, entity: Entity) -> EcsResult<()> {
        if self.count == self.entities.len() {
            return Err(EcsError::SystemFull(self.entities.len()));
        }
        if self.has_entity(entity) {
            return Err(EcsError::DuplicateSystemEntity(entity));
        }

        self.entities[self.count] = entity;
        self.count += 1;
        Ok(())
    }

    /// Removes `entity` from the list.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemEntityMissing`] if not a member.
    pub fn remove_entity(&mut self, entity: Entity) -> EcsResult<()> {
        let position = self
            .as_slice()
            .iter()
            .position(|&e| e == entity)
            .ok_or(EcsError::SystemEntityMissing(entity))?;

        self.count -= 1;
        self.entities[position] = self.entities[self.count];
        self.entities[self.count] = Entity::NULL;
        Ok(())
    }

    /// Checks membership with a linear scan of the live entries.
    #[inline]
    #[must_use]
    pub fn has_entity(&self, entity: Entity) -> bool {
        self.as_slice().contains(&entity)
    }

    /// Calls `f` for every member.
    #[inline]
    pub fn each<F: FnMut(Entity)>(&self, f: F) {
        self.iter().for_each(f);
    }

    /// Iterates over the members.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.as_slice().iter().copied()
    }

    /// Live members as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Entity] {
        &self.entities[..self.count]
    }

    /// Member at `index`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DenseIndexOutOfBounds`] if `index >= len()`.
    #[inline]
    pub fn entity_at(&self, index: usize) -> EcsResult<Entity> {
        self.as_slice()
            .get(index)
            .copied()
            .ok_or(EcsError::DenseIndexOutOfBounds {
                index,
                len: self.count,
            })
    }

    /// Number of members.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Checks if there are no members.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum number of members.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entities.len()
    }

    /// Drops every member, keeping the signature.
    #[inline]
    pub fn clear(&mut self) {
        self.entities[..self.count].fill(Entity::NULL);
        self.count = 0;
    }
}

impl std::fmt::Debug for Membership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Membership")
            .field("count", &self.count)
            .field("capacity", &self.entities.len())
            .field("signature", &self.signature)
            .finish()
    }
}

/// Per-frame behavior over a set of entities.
///
/// # Example
///
/// ```rust,ignore
/// struct Gravity;
///
/// impl System for Gravity {
///     fn update(&mut self, members: &Membership, components: &mut ComponentManager, delta: f32) {
///         let velocities = components.array_mut::<Velocity>()?;
///         for e in members.iter() {
///             velocities.get_mut(e)?.dy -= 9.8 * delta;
///         }
///     }
/// }
/// ```
pub trait System: AsAny {
    /// Runs one frame of this system.
    ///
    /// `members` lists the entities whose signature currently matches.
    /// The system may read and write any enrolled component array.
    fn update(&mut self, members: &Membership, components: &mut ComponentManager, delta: f32);

    /// Human-readable name for diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Upcast helper so boxed systems can be downcast to their concrete type.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
