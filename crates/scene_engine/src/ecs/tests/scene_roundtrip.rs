//! Scene export/load round-trips through the metadata registry

use crate::ecs::components::{RigidBodyComponent, Transform3dComponent};
use crate::ecs::test_support::Health;
use crate::ecs::{EntityId, World};
use crate::foundation::math::{Transform3d, Vec3};
use crate::metadata::MetadataRegistry;
use crate::scene_file::{load_scene_file, save_scene_file, LoadedComponent, LoadedEntity, LoadedScene};

fn registry() -> MetadataRegistry {
    let mut registry = MetadataRegistry::new();
    registry.register_component::<Transform3dComponent>();
    registry.register_component::<RigidBodyComponent>();
    registry.register_component::<Health>();
    registry
}

fn build_source_world() -> (World, crate::ecs::SceneId) {
    let mut world = World::default();
    let scene = world.create_scene("Level 1", true);

    let player = world.create_entity(EntityId::ROOT, "Player");
    world.create_component(
        player,
        Transform3dComponent::from_local(Transform3d::from_position(Vec3::new(1.0, 2.0, 3.0))),
    );
    world.create_component(player, Health::new(80.0, 100.0));

    let weapon = world.create_entity(player, "Weapon");
    world.create_component(weapon, Transform3dComponent::from_position(Vec3::new(0.0, 0.0, 1.0)));

    let crate_entity = world.create_entity(EntityId::ROOT, "Crate");
    world.create_component(crate_entity, RigidBodyComponent::default());
    world.set_entity_enabled(crate_entity, false);
    world.set_component_enabled::<RigidBodyComponent>(crate_entity, false);

    (world, scene)
}

#[test]
fn test_export_then_load_preserves_structure_and_values() {
    let registry = registry();
    let (source, scene) = build_source_world();
    let loaded = source.export_scene(scene).unwrap();

    let mut target = World::default();
    let new_scene = target.load_scene(&loaded, true, &registry);
    assert!(new_scene.is_valid());
    assert_eq!(target.scene_name(new_scene), Some("Level 1"));

    // Fresh ids, same names and parent/child order.
    let root = target.root_entity();
    let children = target.children_of(root).to_vec();
    assert_eq!(children.len(), 2);
    assert_eq!(target.entity_name(children[0]), Some("Player"));
    assert_eq!(target.entity_name(children[1]), Some("Crate"));

    let player = children[0];
    let weapon = target.children_of(player)[0];
    assert_eq!(target.entity_name(weapon), Some("Weapon"));

    // Component values survive the reflected round-trip.
    let transform = target.get_component::<Transform3dComponent>(player).unwrap();
    assert_eq!(transform.local.position, Vec3::new(1.0, 2.0, 3.0));
    let health = target.get_component::<Health>(player).unwrap();
    assert_eq!(health.current, 80.0);
    assert_eq!(health.max, 100.0);

    // Enabled flags survive on both entities and components.
    let crate_entity = children[1];
    assert!(!target.is_entity_enabled(crate_entity));
    assert_eq!(
        target.is_component_enabled::<RigidBodyComponent>(crate_entity),
        Some(false)
    );
}

#[test]
fn test_unknown_component_type_is_skipped() {
    let registry = registry();
    let mut scene = LoadedScene {
        name: "Broken".to_string(),
        entities: vec![LoadedEntity::new("Orphan")],
    };
    scene.entities[0].components.push(LoadedComponent {
        type_name: "NotARealComponent".to_string(),
        enabled: true,
        fields: Vec::new(),
    });

    let mut world = World::default();
    let id = world.load_scene(&scene, true, &registry);
    assert!(id.is_valid());

    let orphan = world.entity_by_name("Orphan");
    assert!(world.entity_exists(orphan));
    assert_eq!(world.components_len(orphan), 0);
}

#[test]
fn test_scene_file_save_and_load() {
    let registry = registry();
    let (source, scene) = build_source_world();
    let exported = source.export_scene(scene).unwrap();

    let path = std::env::temp_dir().join("scene_engine_roundtrip_test.ron");
    save_scene_file(&path, &exported).unwrap();
    let reloaded = load_scene_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let mut world = World::default();
    let id = world.load_scene(&reloaded, false, &registry);
    assert!(id.is_valid());
    // Loading without activation keeps the registry state untouched.
    assert_eq!(world.active_scene(), crate::ecs::SceneId::INVALID);

    let player = world.entity_by_name("Player");
    assert!(world.entity_exists(player));
    assert!(world.has_component::<Health>(player));
}
