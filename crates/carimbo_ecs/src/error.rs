//! # ECS Error Types
//!
//! Every contract violation of the ECS core surfaces as an [`EcsError`].
//! Nothing is silently ignored and nothing corrupts storage.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur in the ECS core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Entity index does not fit the fixed-size arrays.
    #[error("entity {entity:?} out of bounds: index {index} >= capacity {capacity}")]
    EntityOutOfBounds {
        /// The offending entity.
        entity: Entity,
        /// Its index portion.
        index: u32,
        /// The capacity of the storage that rejected it.
        capacity: usize,
    },

    /// Component added to the same entity more than once.
    #[error("component {component} already attached to entity {entity:?}")]
    DuplicateComponent {
        /// The entity.
        entity: Entity,
        /// Name of the component type.
        component: &'static str,
    },

    /// Removing or reading a component the entity does not have.
    #[error("component {component} not attached to entity {entity:?}")]
    MissingComponent {
        /// The entity.
        entity: Entity,
        /// Name of the component type.
        component: &'static str,
    },

    /// The component array already holds `capacity` live components.
    #[error("component storage for {component} is full: capacity {capacity}")]
    StorageFull {
        /// Name of the component type.
        component: &'static str,
        /// Storage capacity.
        capacity: usize,
    },

    /// Dense index past the live count.
    #[error("dense index {index} out of bounds: len {len}")]
    DenseIndexOutOfBounds {
        /// Requested dense index.
        index: usize,
        /// Current live count.
        len: usize,
    },

    /// Component type used before being enrolled.
    #[error("component type {0} not enrolled before use")]
    ComponentNotEnrolled(&'static str),

    /// Component type enrolled twice in the same manager.
    #[error("component type {0} enrolled more than once")]
    ComponentAlreadyEnrolled(&'static str),

    /// Component footprint exceeds the per-slot budget.
    #[error("component type {component} is {size} bytes, slot budget is {budget}")]
    ComponentTooLarge {
        /// Name of the component type.
        component: &'static str,
        /// `size_of` the component.
        size: usize,
        /// Configured byte budget.
        budget: usize,
    },

    /// No component-type ids left.
    #[error("component type id space exhausted: capacity {capacity}")]
    ComponentTypesExhausted {
        /// Number of ids available.
        capacity: usize,
    },

    /// Maximum number of systems already registered.
    #[error("maximum systems reached: {0}")]
    SystemLimitReached(usize),

    /// System value exceeds the per-system size ceiling.
    #[error("system {system} is {size} bytes, limit is {limit}")]
    SystemTooLarge {
        /// Name of the system type.
        system: &'static str,
        /// `size_of` the system.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// System alignment exceeds the configured ceiling.
    #[error("system {system} needs alignment {align}, limit is {limit}")]
    SystemAlignmentTooLarge {
        /// Name of the system type.
        system: &'static str,
        /// `align_of` the system.
        align: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The same system type registered twice.
    #[error("system {0} registered more than once")]
    SystemAlreadyRegistered(&'static str),

    /// Looking up a system type that was never registered.
    #[error("system {0} not registered")]
    SystemNotRegistered(&'static str),

    /// A system's membership list has no room left.
    #[error("system entity list full: capacity {0}")]
    SystemFull(usize),

    /// Entity added to a system it already belongs to.
    #[error("entity {0:?} already in system")]
    DuplicateSystemEntity(Entity),

    /// Entity removed from a system it does not belong to.
    #[error("entity {0:?} not found in system")]
    SystemEntityMissing(Entity),

    /// The entity allocator has no free slots.
    #[error("no more entities available: capacity {0}")]
    EntitiesExhausted(usize),

    /// Operating on an entity whose slot is not alive.
    #[error("entity {0:?} is not alive")]
    DeadEntity(Entity),

    /// Operating on a handle from an earlier generation of its slot.
    #[error("entity {entity:?} is stale: slot is at generation {current}")]
    StaleEntity {
        /// The stale handle.
        entity: Entity,
        /// Generation currently held by the slot.
        current: u32,
    },

    /// Invalid or unreadable configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EcsError {
    /// Builds a [`EcsError::ComponentNotEnrolled`] for `T`.
    #[must_use]
    pub fn not_enrolled<T: 'static>() -> Self {
        Self::ComponentNotEnrolled(std::any::type_name::<T>())
    }

    /// Returns `true` for programming errors, `false` for bad configuration input.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
