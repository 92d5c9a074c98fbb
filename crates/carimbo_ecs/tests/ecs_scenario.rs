//! # ECS Scenario Tests
//!
//! End-to-end checks across the component manager, system manager and
//! world, driven only through the public API.
//!
//! Run with: cargo test --test ecs_scenario

use std::sync::Arc;

use carimbo_ecs::{
    Component, ComponentManager, EcsConfig, EcsError, Entity, Membership, Position, Signature,
    System, SystemManager, Transform, Transparency, TypeRegistry, Velocity, World,
};

/// Integrates positions by velocity.
struct MovementSystem;

impl System for MovementSystem {
    fn update(&mut self, members: &Membership, components: &mut ComponentManager, delta: f32) {
        for entity in members.iter() {
            let Ok(&velocity) = components.get::<Velocity>(entity) else {
                continue;
            };
            if let Ok(position) = components.get_mut::<Position>(entity) {
                position.x += velocity.dx * delta;
                position.y += velocity.dy * delta;
            }
        }
    }
}

/// Fades every member by one step per update.
struct FadeSystem;

impl System for FadeSystem {
    fn update(&mut self, members: &Membership, components: &mut ComponentManager, _: f32) {
        for entity in members.iter() {
            if let Ok(transparency) = components.get_mut::<Transparency>(entity) {
                transparency.value = transparency.value.saturating_sub(1);
            }
        }
    }
}

#[test]
fn movement_scenario_through_managers() {
    let config = EcsConfig::default().with_max_entities(64);
    let mut components = ComponentManager::new(&config, Arc::new(TypeRegistry::default())).unwrap();
    let mut systems = SystemManager::new(&config).unwrap();

    assert_eq!(components.enroll::<Position>().unwrap(), 0);
    assert_eq!(components.enroll::<Velocity>().unwrap(), 1);

    systems.register_system(MovementSystem).unwrap();
    systems
        .set_signature::<MovementSystem>(Signature::from_types(&[0, 1]))
        .unwrap();

    let e = Entity::from_bits(1);
    components.add(e, Position::new(0.0, 0.0)).unwrap();
    components.add(e, Velocity::new(1.0, 1.0)).unwrap();
    systems
        .entity_signature_changed(e, Signature::from_types(&[0, 1]))
        .unwrap();
    assert!(systems.membership::<MovementSystem>().unwrap().has_entity(e));

    systems.update(&mut components, 1.0);
    assert_eq!(*components.get::<Position>(e).unwrap(), Position::new(1.0, 1.0));

    // Losing Velocity drops the entity from the system.
    components.remove::<Velocity>(e).unwrap();
    systems
        .entity_signature_changed(e, Signature::from_types(&[0]))
        .unwrap();
    assert!(!systems.membership::<MovementSystem>().unwrap().has_entity(e));

    systems.update(&mut components, 1.0);
    assert_eq!(*components.get::<Position>(e).unwrap(), Position::new(1.0, 1.0));
}

#[test]
fn type_ids_agree_across_managers_sharing_a_registry() {
    let config = EcsConfig::default().with_max_entities(8);
    let registry = Arc::new(TypeRegistry::default());

    let mut first = ComponentManager::new(&config, Arc::clone(&registry)).unwrap();
    let mut second = ComponentManager::new(&config, Arc::clone(&registry)).unwrap();

    // Enrolled in opposite orders, ids follow first use.
    let transform = first.enroll::<Transform>().unwrap();
    let transparency = first.enroll::<Transparency>().unwrap();
    assert_eq!(second.enroll::<Transparency>().unwrap(), transparency);
    assert_eq!(second.enroll::<Transform>().unwrap(), transform);

    // A separate registry has its own numbering.
    let mut isolated = ComponentManager::new(&config, Arc::new(TypeRegistry::default())).unwrap();
    assert_eq!(isolated.enroll::<Transparency>().unwrap(), 0);
}

#[test]
fn world_despawn_cascades_everywhere() {
    let mut world = World::new(EcsConfig::default().with_max_entities(32)).unwrap();
    let position = world.register_component::<Position>().unwrap();
    let velocity = world.register_component::<Velocity>().unwrap();
    let transparency = world.register_component::<Transparency>().unwrap();

    world
        .register_system(MovementSystem, &[position, velocity])
        .unwrap();
    world.register_system(FadeSystem, &[transparency]).unwrap();

    let mover = world.spawn().unwrap();
    world.add_component(mover, Position::default()).unwrap();
    world.add_component(mover, Velocity::new(2.0, 0.0)).unwrap();
    world.add_component(mover, Transparency::default()).unwrap();

    let ghost = world.spawn().unwrap();
    world.add_component(ghost, Transparency::default()).unwrap();

    world.update(0.5);
    assert_eq!(
        *world.get_component::<Position>(mover).unwrap(),
        Position::new(1.0, 0.0)
    );
    assert_eq!(world.get_component::<Transparency>(ghost).unwrap().value, 254);

    world.despawn(mover).unwrap();
    assert!(!world.has_component::<Position>(mover));
    assert!(!world.has_component::<Transparency>(mover));
    assert!(world
        .systems()
        .membership::<MovementSystem>()
        .unwrap()
        .is_empty());
    assert_eq!(
        world.systems().membership::<FadeSystem>().unwrap().as_slice(),
        &[ghost]
    );

    // The old handle is rejected once the index is recycled.
    let recycled = world.spawn().unwrap();
    assert_eq!(recycled.index(), mover.index());
    world.add_component(recycled, Position::new(5.0, 5.0)).unwrap();
    assert!(!world.has_component::<Position>(mover));
    assert!(matches!(
        world.get_component::<Position>(mover),
        Err(EcsError::StaleEntity { .. })
    ));
    assert!(matches!(
        world.add_component(mover, Position::default()),
        Err(EcsError::StaleEntity { .. })
    ));
}

#[test]
fn world_update_runs_systems_in_registration_order() {
    struct Doubler;

    impl System for Doubler {
        fn update(&mut self, members: &Membership, components: &mut ComponentManager, _: f32) {
            for entity in members.iter() {
                if let Ok(position) = components.get_mut::<Position>(entity) {
                    position.x *= 2.0;
                }
            }
        }
    }

    let mut world = World::new(EcsConfig::default().with_max_entities(4)).unwrap();
    let position = world.register_component::<Position>().unwrap();
    let velocity = world.register_component::<Velocity>().unwrap();
    world
        .register_system(MovementSystem, &[position, velocity])
        .unwrap();
    world.register_system(Doubler, &[position]).unwrap();

    let e = world.spawn().unwrap();
    world.add_component(e, Position::new(1.0, 0.0)).unwrap();
    world.add_component(e, Velocity::new(1.0, 0.0)).unwrap();

    // Move first (1 + 1), then double.
    world.update(1.0);
    assert_eq!(
        *world.get_component::<Position>(e).unwrap(),
        Position::new(4.0, 0.0)
    );
    assert_eq!(
        world.systems().names().count(),
        2,
        "both systems are registered"
    );
}

#[test]
fn component_budget_is_enforced() {
    #[allow(dead_code)]
    struct Chunk([u8; 64]);
    impl Component for Chunk {}

    let config = EcsConfig {
        max_component_size: 32,
        ..EcsConfig::default().with_max_entities(4)
    };
    let mut world = World::new(config).unwrap();

    assert!(matches!(
        world.register_component::<Chunk>(),
        Err(EcsError::ComponentTooLarge { size: 64, budget: 32, .. })
    ));
    assert!(world.register_component::<Position>().is_ok());
}

#[test]
fn config_loads_from_file() {
    let path = std::env::temp_dir().join(format!("carimbo_ecs_{}.toml", std::process::id()));
    std::fs::write(&path, "max_entities = 512\nmax_systems = 8\n").unwrap();

    let config = EcsConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.max_entities, 512);
    assert_eq!(config.max_systems, 8);

    let world = World::new(config).unwrap();
    assert_eq!(world.entities().capacity(), 512);
}

#[test]
fn invalid_config_is_rejected_by_world() {
    let config = EcsConfig {
        system_alignment: 3,
        ..EcsConfig::default()
    };
    assert!(matches!(World::new(config), Err(EcsError::InvalidConfig(_))));
}
