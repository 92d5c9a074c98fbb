//! # CARIMBO ECS
//!
//! Fixed-capacity Entity Component System core:
//! - Sparse-set component arrays with O(1) add, remove and lookup
//! - Type-erased component manager with stable per-type ids
//! - Signature-driven systems run in registration order
//!
//! ## Architecture Rules
//!
//! 1. **Bounded memory** - Every array and membership list is sized up front
//! 2. **Dense iteration** - Components of one type are packed contiguously
//! 3. **Explicit errors** - Contract violations come back as [`EcsError`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use carimbo_ecs::{EcsConfig, Position, Velocity, World};
//!
//! let mut world = World::new(EcsConfig::default())?;
//! world.register_component::<Position>()?;
//! world.register_component::<Velocity>()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::EcsConfig;
pub use ecs::{
    AsAny, Component, ComponentArray, ComponentManager, ComponentType, Entity, EntityManager,
    ErasedArray, Membership, Position, Signature, System, SystemManager, Transform,
    Transparency, TypeRegistry, Vec2, Velocity, World,
};
pub use error::{EcsError, EcsResult};
