//! # ECS World
//!
//! The central container tying the entity allocator, component manager and
//! system manager together.
//!
//! The three managers must observe every change in lock-step: a component
//! added or removed recomputes the entity's signature and notifies the
//! systems; a despawn erases the entity from every array and every system
//! before its index is recycled. `World` is the one place that does this.

use std::sync::Arc;

use super::component::Component;
use super::entities::EntityManager;
use super::entity::Entity;
use super::manager::{ComponentManager, ErasedArray};
use super::registry::TypeRegistry;
use super::scheduler::SystemManager;
use super::signature::{ComponentType, Signature};
use super::system::System;
use crate::config::EcsConfig;
use crate::error::{EcsError, EcsResult};

/// The ECS World - container for all game state.
///
/// All storage is pre-allocated at creation from the [`EcsConfig`]. No
/// allocations occur during spawn, despawn, or component add/remove.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new(EcsConfig::default())?;
/// world.register_component::<Position>()?;
/// world.register_component::<Velocity>()?;
/// world.register_system(MovementSystem, &[position, velocity])?;
///
/// let e = world.spawn()?;
/// world.add_component(e, Position::new(0.0, 0.0))?;
/// world.add_component(e, Velocity::new(1.0, 1.0))?;
/// world.update(1.0 / 60.0);
/// ```
pub struct World {
    config: EcsConfig,
    entities: EntityManager,
    components: ComponentManager,
    systems: SystemManager,
}

impl World {
    /// Creates a world with its own type registry.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`](crate::EcsError::InvalidConfig) if
    /// `config` does not validate.
    pub fn new(config: EcsConfig) -> EcsResult<Self> {
        config.validate()?;
        let registry = Arc::new(TypeRegistry::new(config.max_component_types));
        Self::with_registry(config, registry)
    }

    /// Creates a world drawing component ids from a shared registry.
    ///
    /// Worlds sharing a registry agree on every component-type id.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`](crate::EcsError::InvalidConfig) if
    /// `config` does not validate.
    pub fn with_registry(config: EcsConfig, registry: Arc<TypeRegistry>) -> EcsResult<Self> {
        let components = ComponentManager::new(&config, registry)?;
        let systems = SystemManager::new(&config)?;

        tracing::info!(
            max_entities = config.max_entities,
            max_component_types = config.max_component_types,
            max_systems = config.max_systems,
            "created ECS world"
        );

        Ok(Self {
            config,
            entities: EntityManager::new(config.max_entities),
            components,
            systems,
        })
    }

    /// Capacity limits of this world.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EcsConfig {
        &self.config
    }

    /// The entity allocator.
    #[inline]
    #[must_use]
    pub const fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// The component manager.
    #[inline]
    #[must_use]
    pub const fn components(&self) -> &ComponentManager {
        &self.components
    }

    /// The component manager, mutably.
    ///
    /// Adding or removing components here bypasses signature tracking;
    /// use [`World::add_component`] and [`World::remove_component`] for
    /// membership changes.
    #[inline]
    pub fn components_mut(&mut self) -> &mut ComponentManager {
        &mut self.components
    }

    /// The system manager.
    #[inline]
    #[must_use]
    pub const fn systems(&self) -> &SystemManager {
        &self.systems
    }

    /// The system manager, mutably.
    #[inline]
    pub fn systems_mut(&mut self) -> &mut SystemManager {
        &mut self.systems
    }

    /// Enrolls component type `T`.
    ///
    /// # Errors
    ///
    /// See [`ComponentManager::enroll`].
    pub fn register_component<T: Component>(&mut self) -> EcsResult<ComponentType> {
        self.components.enroll::<T>()
    }

    /// Stable id of component type `T`.
    ///
    /// # Errors
    ///
    /// See [`ComponentManager::component_type`].
    pub fn component_type<T: Component>(&self) -> EcsResult<ComponentType> {
        self.components.component_type::<T>()
    }

    /// Registers `system` requiring every component type in `required`.
    ///
    /// Entities that already match are enrolled immediately.
    ///
    /// # Errors
    ///
    /// See [`SystemManager::register_system`].
    pub fn register_system<T: System>(
        &mut self,
        system: T,
        required: &[ComponentType],
    ) -> EcsResult<&mut T> {
        self.systems.register_system(system)?;
        self.set_system_signature::<T>(Signature::from_types(required))?;
        self.systems
            .get_system_mut::<T>()
            .ok_or(EcsError::SystemNotRegistered(std::any::type_name::<T>()))
    }

    /// Replaces the signature of system `T` and re-evaluates every entity.
    ///
    /// # Errors
    ///
    /// See [`SystemManager::set_signature`].
    pub fn set_system_signature<T: System>(&mut self, signature: Signature) -> EcsResult<()> {
        self.systems.set_signature::<T>(signature)?;
        for (entity, current) in self.entities.iter() {
            self.systems.entity_signature_changed(entity, current)?;
        }
        Ok(())
    }

    /// Allocates a new entity with no components.
    ///
    /// # Errors
    ///
    /// See [`EntityManager::create`].
    pub fn spawn(&mut self) -> EcsResult<Entity> {
        self.entities.create()
    }

    /// Destroys `entity`: its components, its system memberships, then its index.
    ///
    /// # Errors
    ///
    /// See [`EntityManager::destroy`]. Nothing is touched on error.
    pub fn despawn(&mut self, entity: Entity) -> EcsResult<()> {
        self.entities.signature(entity)?;

        self.components.destroy(entity);
        self.systems.entity_destroyed(entity);
        self.entities.destroy(entity)
    }

    /// Checks if `entity` is alive and current.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Attaches `component` to `entity` and updates system membership.
    ///
    /// # Errors
    ///
    /// Dead or stale entity, unenrolled type, duplicate component, or a
    /// full system.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> EcsResult<()> {
        let mut signature = self.entities.signature(entity)?;
        self.components.add(entity, component)?;

        signature.set(self.components.component_type::<T>()?);
        self.entities.set_signature(entity, signature)?;
        self.systems.entity_signature_changed(entity, signature)
    }

    /// Detaches the `T` of `entity` and updates system membership.
    ///
    /// # Errors
    ///
    /// Dead or stale entity, unenrolled type, or missing component.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> EcsResult<T> {
        let mut signature = self.entities.signature(entity)?;
        let component = self.components.remove::<T>(entity)?;

        signature.reset(self.components.component_type::<T>()?);
        self.entities.set_signature(entity, signature)?;
        self.systems.entity_signature_changed(entity, signature)?;
        Ok(component)
    }

    /// Returns the `T` of `entity`.
    ///
    /// # Errors
    ///
    /// Dead or stale entity, or any error of [`ComponentManager::get`].
    pub fn get_component<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        self.entities.signature(entity)?;
        self.components.get::<T>(entity)
    }

    /// Returns the `T` of `entity` mutably.
    ///
    /// # Errors
    ///
    /// Dead or stale entity, or any error of [`ComponentManager::get_mut`].
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.entities.signature(entity)?;
        self.components.get_mut::<T>(entity)
    }

    /// Checks if `entity` is alive and has a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity) && self.components.has::<T>(entity)
    }

    /// Aggregate signature of `entity`.
    ///
    /// # Errors
    ///
    /// See [`EntityManager::signature`].
    pub fn signature(&self, entity: Entity) -> EcsResult<Signature> {
        self.entities.signature(entity)
    }

    /// Runs every system once, in registration order.
    pub fn update(&mut self, delta: f32) {
        self.systems.update(&mut self.components, delta);
    }

    /// Removes every entity and component; systems and signatures stay.
    pub fn clear(&mut self) {
        self.components.clear();
        self.systems.clear();
        self.entities.clear();
        tracing::info!("cleared ECS world");
    }

    /// Number of live components across every enrolled type.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components
            .arrays()
            .map(|(_, array)| ErasedArray::len(array))
            .sum()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities)
            .field("components", &self.components)
            .field("systems", &self.systems)
            .finish()
    }
}
