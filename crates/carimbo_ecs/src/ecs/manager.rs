//! # Component Manager
//!
//! Owns one [`ComponentArray`] per enrolled component type in a fixed
//! slot table indexed by [`ComponentType`].
//!
//! Arrays are stored behind the [`ErasedArray`] trait so that
//! entity-wide operations (`destroy`, `clear`) can run over every type
//! without knowing it; typed access downcasts the slot back to
//! `ComponentArray<T>`.

use std::any::{type_name, Any};
use std::sync::Arc;

use super::component::Component;
use super::entity::Entity;
use super::registry::TypeRegistry;
use super::signature::ComponentType;
use super::storage::ComponentArray;
use crate::config::EcsConfig;
use crate::error::{EcsError, EcsResult};

/// Type-erased view of a [`ComponentArray`].
pub trait ErasedArray {
    /// Removes the component of `entity` if present; absence is not an error.
    fn destroy(&mut self, entity: Entity);

    /// Removes every component.
    fn clear(&mut self);

    /// Checks if `entity` has a component here.
    fn contains(&self, entity: Entity) -> bool;

    /// Number of live components.
    fn len(&self) -> usize;

    /// Checks if no component is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the stored component type.
    fn component_name(&self) -> &'static str;

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedArray for ComponentArray<T> {
    fn destroy(&mut self, entity: Entity) {
        if self.has(entity) {
            // Presence was just checked, removal cannot fail.
            let _ = self.remove(entity);
        }
    }

    fn clear(&mut self) {
        ComponentArray::clear(self);
    }

    fn contains(&self, entity: Entity) -> bool {
        self.has(entity)
    }

    fn len(&self) -> usize {
        ComponentArray::len(self)
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Registry of component arrays keyed by component-type id.
///
/// # Example
///
/// ```rust,ignore
/// let registry = Arc::new(TypeRegistry::default());
/// let mut components = ComponentManager::new(&EcsConfig::default(), registry)?;
///
/// components.enroll::<Position>()?;
/// components.add(entity, Position::new(0.0, 0.0))?;
/// ```
pub struct ComponentManager {
    /// One slot per component-type id; `None` until enrolled.
    slots: Box<[Option<Box<dyn ErasedArray>>]>,
    /// Shared id assignment.
    registry: Arc<TypeRegistry>,
    /// Entity capacity of every array.
    max_entities: usize,
    /// Byte budget for one component value.
    max_component_size: usize,
    /// Number of enrolled types.
    enrolled: usize,
}

impl ComponentManager {
    /// Creates an empty manager with one slot per possible component type.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: &EcsConfig, registry: Arc<TypeRegistry>) -> EcsResult<Self> {
        config.validate()?;

        let slots = (0..config.max_component_types)
            .map(|_| None)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            slots,
            registry,
            max_entities: config.max_entities,
            max_component_size: config.max_component_size,
            enrolled: 0,
        })
    }

    /// Enrolls `T`, constructing its array in the slot of its type id.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentAlreadyEnrolled`] on a second call for `T`
    /// - [`EcsError::ComponentTooLarge`] if `T` exceeds the slot budget
    /// - [`EcsError::ComponentTypesExhausted`] if no id is left for `T`
    pub fn enroll<T: Component>(&mut self) -> EcsResult<ComponentType> {
        let size = std::mem::size_of::<T>();
        if size > self.max_component_size {
            return Err(EcsError::ComponentTooLarge {
                component: type_name::<T>(),
                size,
                budget: self.max_component_size,
            });
        }

        let id = self.registry.id_of::<T>()?;
        let capacity = self.slots.len();
        let slot = self
            .slots
            .get_mut(usize::from(id))
            .ok_or(EcsError::ComponentTypesExhausted { capacity })?;

        if slot.is_some() {
            return Err(EcsError::ComponentAlreadyEnrolled(type_name::<T>()));
        }

        *slot = Some(Box::new(ComponentArray::<T>::new(self.max_entities)));
        self.enrolled += 1;

        tracing::debug!(
            component = type_name::<T>(),
            id,
            capacity = self.max_entities,
            "enrolled component type"
        );
        Ok(id)
    }

    /// Returns the stable id of `T`, assigning one on first use.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentTypesExhausted`] if `T` is new and no id is left.
    pub fn component_type<T: Component>(&self) -> EcsResult<ComponentType> {
        self.registry.id_of::<T>()
    }

    /// Checks if `T` has been enrolled in this manager.
    #[must_use]
    pub fn is_enrolled<T: Component>(&self) -> bool {
        self.registry
            .lookup::<T>()
            .and_then(|id| self.slots.get(usize::from(id)))
            .is_some_and(Option::is_some)
    }

    /// Number of enrolled component types.
    #[inline]
    #[must_use]
    pub const fn enrolled_count(&self) -> usize {
        self.enrolled
    }

    /// Entity capacity of every array.
    #[inline]
    #[must_use]
    pub const fn max_entities(&self) -> usize {
        self.max_entities
    }

    /// The id registry this manager draws from.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Typed array for `T`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotEnrolled`] if `T` was never enrolled here.
    pub fn array<T: Component>(&self) -> EcsResult<&ComponentArray<T>> {
        self.registry
            .lookup::<T>()
            .and_then(|id| self.slots.get(usize::from(id)))
            .and_then(Option::as_deref)
            .and_then(|erased| erased.as_any().downcast_ref::<ComponentArray<T>>())
            .ok_or_else(EcsError::not_enrolled::<T>)
    }

    /// Typed array for `T`, mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotEnrolled`] if `T` was never enrolled here.
    pub fn array_mut<T: Component>(&mut self) -> EcsResult<&mut ComponentArray<T>> {
        self.registry
            .lookup::<T>()
            .and_then(|id| self.slots.get_mut(usize::from(id)))
            .and_then(Option::as_deref_mut)
            .and_then(|erased| erased.as_any_mut().downcast_mut::<ComponentArray<T>>())
            .ok_or_else(EcsError::not_enrolled::<T>)
    }

    /// Attaches `component` to `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotEnrolled`] or any error of
    /// [`ComponentArray::insert`].
    pub fn add<T: Component>(&mut self, entity: Entity, component: T) -> EcsResult<()> {
        self.array_mut::<T>()?.insert(entity, component)
    }

    /// Detaches and returns the `T` of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotEnrolled`] or any error of
    /// [`ComponentArray::remove`].
    pub fn remove<T: Component>(&mut self, entity: Entity) -> EcsResult<T> {
        self.array_mut::<T>()?.remove(entity)
    }

    /// Returns the `T` of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotEnrolled`] or [`EcsError::MissingComponent`].
    pub fn get<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        self.array::<T>()?.get(entity)
    }

    /// Returns the `T` of `entity` mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotEnrolled`] or [`EcsError::MissingComponent`].
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.array_mut::<T>()?.get_mut(entity)
    }

    /// Checks if `entity` has a `T`. Unenrolled types report `false`.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.array::<T>().is_ok_and(|array| array.has(entity))
    }

    /// Erases `entity` from every array that holds it.
    pub fn destroy(&mut self, entity: Entity) {
        for array in self.slots.iter_mut().flatten() {
            array.destroy(entity);
        }
    }

    /// Clears every array.
    pub fn clear(&mut self) {
        for array in self.slots.iter_mut().flatten() {
            array.clear();
        }
    }

    /// Iterates over `(id, array)` for every enrolled type.
    pub fn arrays(&self) -> impl Iterator<Item = (ComponentType, &dyn ErasedArray)> {
        self.slots.iter().enumerate().filter_map(|(id, slot)| {
            let id = ComponentType::try_from(id).ok()?;
            slot.as_deref().map(|array| (id, array))
        })
    }
}

impl std::fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentManager")
            .field("enrolled", &self.enrolled)
            .field("slots", &self.slots.len())
            .field("max_entities", &self.max_entities)
            .finish()
    }
}
