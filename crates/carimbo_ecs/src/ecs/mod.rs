//! # Entity Component System
//!
//! A fixed-capacity sparse-set ECS.
//!
//! ## Design Philosophy
//!
//! - All storage is pre-allocated when a manager is created
//! - Components are stored in dense arrays, addressed through a sparse index
//! - Entity handles pack an index with a generation counter
//! - Systems track their entities through signatures, never by polling

mod component;
mod entities;
mod entity;
mod manager;
mod registry;
mod scheduler;
mod signature;
mod storage;
mod system;
mod world;

pub use component::{Component, Position, Transform, Transparency, Vec2, Velocity};
pub use entities::EntityManager;
pub use entity::Entity;
pub use manager::{ComponentManager, ErasedArray};
pub use registry::TypeRegistry;
pub use scheduler::SystemManager;
pub use signature::{ComponentType, Signature};
pub use storage::ComponentArray;
pub use system::{AsAny, Membership, System};
pub use world::World;
