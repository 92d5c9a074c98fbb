//! # System Manager
//!
//! Owns every registered [`System`] together with its [`Membership`] and
//! keeps the membership lists in sync with entity signatures.
//!
//! ## Execution order
//!
//! `update` runs systems in registration order. There is no dependency
//! graph: the order established at startup *is* the schedule.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use super::entity::Entity;
use super::manager::ComponentManager;
use super::signature::Signature;
use super::system::{Membership, System};
use crate::config::EcsConfig;
use crate::error::{EcsError, EcsResult};

/// A registered system and the entities it tracks.
struct Slot {
    system: Box<dyn System>,
    membership: Membership,
}

/// Fixed-capacity set of systems, run in registration order.
///
/// # Example
///
/// ```rust,ignore
/// let mut systems = SystemManager::new(&EcsConfig::default())?;
/// systems.register_system(MovementSystem)?;
/// systems.set_signature::<MovementSystem>(Signature::from_types(&[pos, vel]))?;
///
/// systems.entity_signature_changed(entity, entity_signature)?;
/// systems.update(&mut components, 1.0 / 60.0);
/// ```
pub struct SystemManager {
    /// Registered systems in registration order.
    slots: Vec<Slot>,
    /// Concrete system type -> index in `slots`.
    lookup: HashMap<TypeId, usize>,
    max_systems: usize,
    max_system_size: usize,
    system_alignment: usize,
    /// Membership capacity of every system.
    max_entities: usize,
}

impl SystemManager {
    /// Creates an empty manager with storage reserved for `max_systems`.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: &EcsConfig) -> EcsResult<Self> {
        config.validate()?;

        Ok(Self {
            slots: Vec::with_capacity(config.max_systems),
            lookup: HashMap::with_capacity(config.max_systems),
            max_systems: config.max_systems,
            max_system_size: config.max_system_size,
            system_alignment: config.system_alignment,
            max_entities: config.max_entities,
        })
    }

    /// Registers `system` and returns a reference to it.
    ///
    /// The new system starts with an empty signature and no members.
    ///
    /// # Errors
    ///
    /// - [`EcsError::SystemLimitReached`] if `max_systems` are registered
    /// - [`EcsError::SystemTooLarge`] if `T` exceeds `max_system_size`
    /// - [`EcsError::SystemAlignmentTooLarge`] if `T` exceeds `system_alignment`
    /// - [`EcsError::SystemAlreadyRegistered`] if `T` is already registered
    pub fn register_system<T: System>(&mut self, system: T) -> EcsResult<&mut T> {
        let size = std::mem::size_of::<T>();
        let align = std::mem::align_of::<T>();

        if size > self.max_system_size {
            return Err(EcsError::SystemTooLarge {
                system: type_name::<T>(),
                size,
                limit: self.max_system_size,
            });
        }
        if align > self.system_alignment {
            return Err(EcsError::SystemAlignmentTooLarge {
                system: type_name::<T>(),
                align,
                limit: self.system_alignment,
            });
        }
        if self.lookup.contains_key(&TypeId::of::<T>()) {
            return Err(EcsError::SystemAlreadyRegistered(type_name::<T>()));
        }
        if self.slots.len() >= self.max_systems {
            return Err(EcsError::SystemLimitReached(self.max_systems));
        }

        let index = self.slots.len();
        self.slots.push(Slot {
            system: Box::new(system),
            membership: Membership::new(self.max_entities),
        });
        self.lookup.insert(TypeId::of::<T>(), index);

        tracing::debug!(system = type_name::<T>(), index, "registered system");

        (*self.slots[index].system)
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(EcsError::SystemNotRegistered(type_name::<T>()))
    }

    fn slot_of<T: System>(&self) -> Option<&Slot> {
        let index = *self.lookup.get(&TypeId::of::<T>())?;
        self.slots.get(index)
    }

    fn slot_of_mut<T: System>(&mut self) -> Option<&mut Slot> {
        let index = *self.lookup.get(&TypeId::of::<T>())?;
        self.slots.get_mut(index)
    }

    /// Attaches the required-component signature to system `T`.
    ///
    /// Current members are not re-evaluated; signatures are expected to be
    /// set at startup before entities are notified.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] if `T` was never registered.
    pub fn set_signature<T: System>(&mut self, signature: Signature) -> EcsResult<()> {
        let slot = self
            .slot_of_mut::<T>()
            .ok_or(EcsError::SystemNotRegistered(type_name::<T>()))?;
        slot.membership.set_signature(signature);

        tracing::debug!(
            system = type_name::<T>(),
            required = signature.count(),
            "set system signature"
        );
        Ok(())
    }

    /// Required signature of system `T`.
    #[must_use]
    pub fn signature<T: System>(&self) -> Option<Signature> {
        self.slot_of::<T>().map(|slot| *slot.membership.signature())
    }

    /// Entities currently tracked by system `T`.
    #[must_use]
    pub fn membership<T: System>(&self) -> Option<&Membership> {
        self.slot_of::<T>().map(|slot| &slot.membership)
    }

    /// Registered system `T`.
    #[must_use]
    pub fn get_system<T: System>(&self) -> Option<&T> {
        let slot = self.slot_of::<T>()?;
        (*slot.system).as_any().downcast_ref::<T>()
    }

    /// Registered system `T`, mutably.
    pub fn get_system_mut<T: System>(&mut self) -> Option<&mut T> {
        let slot = self.slot_of_mut::<T>()?;
        (*slot.system).as_any_mut().downcast_mut::<T>()
    }

    /// Reconciles every system's membership with the new `signature` of `entity`.
    ///
    /// A system gains the entity when the signature now matches and loses
    /// it when it no longer does; otherwise nothing changes.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemFull`] if a system that should gain the entity has
    /// no room. Systems before it in registration order are already updated.
    pub fn entity_signature_changed(
        &mut self,
        entity: Entity,
        signature: Signature,
    ) -> EcsResult<()> {
        for slot in &mut self.slots {
            let membership = &mut slot.membership;
            let matches = signature.matches(membership.signature());
            let member = membership.has_entity(entity);

            if matches && !member {
                membership.add_entity(entity)?;
                tracing::trace!(?entity, system = slot.system.name(), "entity joined system");
            } else if !matches && member {
                membership.remove_entity(entity)?;
                tracing::trace!(?entity, system = slot.system.name(), "entity left system");
            }
        }
        Ok(())
    }

    /// Removes `entity` from every system that holds it.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for slot in &mut self.slots {
            if slot.membership.has_entity(entity) {
                // Membership was just checked, removal cannot fail.
                let _ = slot.membership.remove_entity(entity);
            }
        }
    }

    /// Runs every system once, in registration order.
    pub fn update(&mut self, components: &mut ComponentManager, delta: f32) {
        for slot in &mut self.slots {
            slot.system.update(&slot.membership, components, delta);
        }
    }

    /// Empties every membership list; systems and signatures are kept.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.membership.clear();
        }
    }

    /// Number of registered systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Checks if no system is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names of the registered systems in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.system.name())
    }
}

impl std::fmt::Debug for SystemManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemManager")
            .field("systems", &self.names().collect::<Vec<_>>())
            .field("max_systems", &self.max_systems)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use crate::ecs::registry::TypeRegistry;

    fn config() -> EcsConfig {
        EcsConfig::default().with_max_entities(32).with_max_systems(4)
    }

    fn components() -> ComponentManager {
        ComponentManager::new(&config(), Arc::new(TypeRegistry::default())).unwrap()
    }

    fn e(index: u32) -> Entity {
        Entity::new(index, 0)
    }

    /// Records its name into a shared log on every update.
    struct Recorder {
        label: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
        seen: usize,
    }

    impl System for Recorder {
        fn update(&mut self, members: &Membership, _: &mut ComponentManager, _: f32) {
            self.log.borrow_mut().push(self.label);
            self.seen = members.len();
        }
    }

    struct Second(Recorder);

    impl System for Second {
        fn update(&mut self, members: &Membership, components: &mut ComponentManager, delta: f32) {
            self.0.update(members, components, delta);
        }
    }

    struct Idle;

    impl System for Idle {
        fn update(&mut self, _: &Membership, _: &mut ComponentManager, _: f32) {}
    }

    #[repr(align(128))]
    struct OverAligned;

    impl System for OverAligned {
        fn update(&mut self, _: &Membership, _: &mut ComponentManager, _: f32) {}
    }

    struct Bloated([u8; 2048]);

    impl System for Bloated {
        fn update(&mut self, _: &Membership, _: &mut ComponentManager, _: f32) {
            self.0[0] = self.0[0].wrapping_add(1);
        }
    }

    fn recorder(label: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> Recorder {
        Recorder {
            label,
            log: Rc::clone(log),
            seen: 0,
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut systems = SystemManager::new(&config()).unwrap();
        systems.register_system(Idle).unwrap();

        assert_eq!(systems.len(), 1);
        assert!(systems.get_system::<Idle>().is_some());
        assert!(systems.get_system::<OverAligned>().is_none());
        assert_eq!(systems.signature::<Idle>(), Some(Signature::EMPTY));
    }

    #[test]
    fn test_register_returns_live_reference() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut systems = SystemManager::new(&config()).unwrap();
        systems.register_system(recorder("a", &log)).unwrap().label = "renamed";

        let mut components = components();
        systems.update(&mut components, 0.0);
        assert_eq!(*log.borrow(), vec!["renamed"]);
    }

    #[test]
    fn test_registration_limits() {
        let mut systems = SystemManager::new(&config().with_max_systems(1)).unwrap();
        systems.register_system(Idle).unwrap();

        assert!(matches!(
            systems.register_system(Idle),
            Err(EcsError::SystemAlreadyRegistered(_))
        ));
        assert_eq!(
            systems.register_system(Bloated([0; 2048])).map(|_| ()),
            Err(EcsError::SystemTooLarge {
                system: type_name::<Bloated>(),
                size: 2048,
                limit: 1024,
            })
        );
        assert!(matches!(
            systems.register_system(OverAligned),
            Err(EcsError::SystemAlignmentTooLarge { align: 128, .. })
        ));

        let log = Rc::new(RefCell::new(Vec::new()));
        assert_eq!(
            systems.register_system(recorder("x", &log)).map(|_| ()),
            Err(EcsError::SystemLimitReached(1))
        );
    }

    #[test]
    fn test_set_signature_requires_registration() {
        let mut systems = SystemManager::new(&config()).unwrap();
        assert!(matches!(
            systems.set_signature::<Idle>(Signature::EMPTY),
            Err(EcsError::SystemNotRegistered(_))
        ));
    }

    #[test]
    fn test_signature_propagation() {
        let mut systems = SystemManager::new(&config()).unwrap();
        systems.register_system(Idle).unwrap();
        systems
            .set_signature::<Idle>(Signature::from_types(&[0, 1]))
            .unwrap();

        let only_a = Signature::from_types(&[0]);
        let both = Signature::from_types(&[0, 1]);

        systems.entity_signature_changed(e(1), only_a).unwrap();
        assert!(!systems.membership::<Idle>().unwrap().has_entity(e(1)));

        systems.entity_signature_changed(e(1), both).unwrap();
        assert!(systems.membership::<Idle>().unwrap().has_entity(e(1)));

        // Re-notifying with a matching signature is idempotent.
        systems.entity_signature_changed(e(1), both).unwrap();
        assert_eq!(systems.membership::<Idle>().unwrap().len(), 1);

        systems.entity_signature_changed(e(1), only_a).unwrap();
        assert!(!systems.membership::<Idle>().unwrap().has_entity(e(1)));
    }

    #[test]
    fn test_destruction_cascade() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut systems = SystemManager::new(&config()).unwrap();
        systems.register_system(Idle).unwrap();
        systems.register_system(recorder("r", &log)).unwrap();
        systems
            .set_signature::<Recorder>(Signature::from_types(&[2]))
            .unwrap();

        let sig = Signature::from_types(&[2]);
        systems.entity_signature_changed(e(4), sig).unwrap();
        systems.entity_signature_changed(e(5), sig).unwrap();
        assert!(systems.membership::<Idle>().unwrap().has_entity(e(4)));
        assert!(systems.membership::<Recorder>().unwrap().has_entity(e(4)));

        systems.entity_destroyed(e(4));
        assert!(!systems.membership::<Idle>().unwrap().has_entity(e(4)));
        assert!(!systems.membership::<Recorder>().unwrap().has_entity(e(4)));
        assert!(systems.membership::<Recorder>().unwrap().has_entity(e(5)));

        // Unknown entities are ignored.
        systems.entity_destroyed(e(30));
    }

    #[test]
    fn test_update_runs_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut systems = SystemManager::new(&config()).unwrap();
        systems.register_system(Second(recorder("second", &log))).unwrap();
        systems.register_system(recorder("first", &log)).unwrap();

        let mut components = components();
        systems.update(&mut components, 0.016);
        systems.update(&mut components, 0.016);

        assert_eq!(*log.borrow(), vec!["second", "first", "second", "first"]);
        assert_eq!(
            systems.names().count(),
            2,
            "every registered system is listed"
        );
    }

    #[test]
    fn test_update_sees_current_members() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut systems = SystemManager::new(&config()).unwrap();
        systems.register_system(recorder("r", &log)).unwrap();
        systems.entity_signature_changed(e(0), Signature::EMPTY).unwrap();
        systems.entity_signature_changed(e(1), Signature::EMPTY).unwrap();

        let mut components = components();
        systems.update(&mut components, 1.0);
        assert_eq!(systems.get_system::<Recorder>().unwrap().seen, 2);

        systems.get_system_mut::<Recorder>().unwrap().seen = 0;
        systems.clear();
        systems.update(&mut components, 1.0);
        assert_eq!(systems.get_system::<Recorder>().unwrap().seen, 0);
        assert_eq!(systems.len(), 1);
    }

    #[test]
    fn test_full_system_reports_error() {
        let mut systems = SystemManager::new(&config().with_max_entities(1)).unwrap();
        systems.register_system(Idle).unwrap();

        systems.entity_signature_changed(e(0), Signature::EMPTY).unwrap();
        assert_eq!(
            systems.entity_signature_changed(e(1), Signature::EMPTY),
            Err(EcsError::SystemFull(1))
        );
    }
}
