//! Scene Integration Tests
//!
//! Tests for:
//! - Entity creation and removal, UUID lookup
//! - Hierarchy: set_parent, cycle rejection, world / parent-world matrices
//! - Model components: set_model, update_models, models_in_use
//! - Cloning a scene

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use uuid::Uuid;

use xenon::animation::{Animation, Keyframe};
use xenon::math::matrix_position;
use xenon::resources::HeadlessBackend;
use xenon::scene::{Model, ModelNode, Scene};

const EPSILON: f32 = 1e-5;

fn sliding_model() -> Arc<Model> {
    let mut animation = Animation::new("slide");
    animation.node_mut(0).translation = vec![
        Keyframe::linear(0.0, Vec3::ZERO),
        Keyframe::linear(1.0, Vec3::new(0.0, 0.0, 4.0)),
    ];
    animation.recompute_totals();

    Arc::new(Model {
        name: "slider".into(),
        nodes: vec![ModelNode { name: "root".into(), ..Default::default() }],
        local_transforms: vec![Mat4::IDENTITY],
        animations: vec![animation],
        ..Default::default()
    })
}

// ============================================================================
// Entities
// ============================================================================

#[test]
fn created_entities_are_found_by_uuid() {
    let mut scene = Scene::new();
    assert!(scene.is_empty());

    let key = scene.create_entity("player");
    let uuid = scene.identity(key).unwrap().uuid;
    assert_eq!(scene.entity_by_id(uuid), Some(key));
    assert_eq!(scene.identity(key).unwrap().name, "player");
    assert_eq!(scene.transform(key).unwrap().matrix, Mat4::IDENTITY);
    assert_eq!(scene.len(), 1);
}

#[test]
fn chosen_uuid_is_kept() {
    let mut scene = Scene::new();
    let uuid = Uuid::new_v4();
    let key = scene.create_entity_with_id(uuid, "door");
    assert_eq!(scene.identity(key).unwrap().uuid, uuid);

    let again = scene.create_entity_with_id(uuid, "window");
    assert_eq!(again, key);
    assert_eq!(scene.identity(key).unwrap().name, "door");
}

#[test]
fn removing_an_entity_forgets_it() {
    let mut scene = Scene::new();
    let key = scene.create_entity("crate");
    let uuid = scene.identity(key).unwrap().uuid;

    assert!(scene.remove_entity(key));
    assert!(scene.identity(key).is_none());
    assert!(scene.transform(key).is_none());
    assert_eq!(scene.entity_by_id(uuid), None);
    assert!(!scene.remove_entity(key));
}

#[test]
fn removing_a_parent_keeps_children_in_place() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let child = scene.create_entity("child");
    scene.transform_mut(parent).unwrap().matrix = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0));
    scene.transform_mut(child).unwrap().matrix = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
    scene.set_parent(child, Some(parent));

    let before = scene.world_matrix(child);
    assert!(scene.remove_entity(parent));

    assert_eq!(scene.transform(child).unwrap().parent, None);
    assert!(scene.world_matrix(child).abs_diff_eq(before, EPSILON));
    assert!(matrix_position(&before).abs_diff_eq(Vec3::new(3.0, 2.0, 0.0), EPSILON));
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn world_matrix_walks_the_whole_chain() {
    let mut scene = Scene::new();
    let a = scene.create_entity("a");
    let b = scene.create_entity("b");
    let c = scene.create_entity("c");
    scene.transform_mut(a).unwrap().matrix = Mat4::from_rotation_translation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2), Vec3::X);
    scene.transform_mut(b).unwrap().matrix = Mat4::from_translation(Vec3::X);
    scene.transform_mut(c).unwrap().matrix = Mat4::from_translation(Vec3::X);
    assert!(scene.set_parent(b, Some(a)));
    assert!(scene.set_parent(c, Some(b)));

    // a rotates +X onto +Y, so b and c stack upward from (1, 0, 0).
    assert!(matrix_position(&scene.world_matrix(c)).abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), EPSILON));
    assert!(matrix_position(&scene.parent_world_matrix(c)).abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), EPSILON));
    assert_eq!(scene.parent_world_matrix(a), Mat4::IDENTITY);
}

#[test]
fn grandchild_cannot_become_an_ancestor() {
    let mut scene = Scene::new();
    let a = scene.create_entity("a");
    let b = scene.create_entity("b");
    let c = scene.create_entity("c");
    scene.set_parent(b, Some(a));
    scene.set_parent(c, Some(b));

    assert!(!scene.set_parent(a, Some(c)));
    assert_eq!(scene.transform(a).unwrap().parent, None);

    // Detaching then re-parenting the other way round is fine.
    assert!(scene.set_parent(b, None));
    assert!(scene.set_parent(a, Some(c)));
}

#[test]
fn to_local_matrix_round_trips_through_world() {
    let mut scene = Scene::new();
    let parent = scene.create_entity("parent");
    let child = scene.create_entity("child");
    scene.transform_mut(parent).unwrap().matrix =
        Mat4::from_scale_rotation_translation(Vec3::splat(2.0), Quat::from_rotation_y(0.4), Vec3::new(1.0, 2.0, 3.0));
    scene.set_parent(child, Some(parent));

    let world = Mat4::from_translation(Vec3::new(-4.0, 0.5, 9.0));
    let local = scene.to_local_matrix(&world, child);
    scene.transform_mut(child).unwrap().matrix = local;
    assert!(scene.world_matrix(child).abs_diff_eq(world, 1e-4));
}

// ============================================================================
// Model components
// ============================================================================

#[test]
fn set_model_poses_the_instance_under_the_entity() {
    let mut scene = Scene::new();
    let key = scene.create_entity("slider");
    scene.transform_mut(key).unwrap().matrix = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));

    assert!(scene.set_model(key, sliding_model()));
    let instance = &scene.model(key).unwrap().instance;
    assert!(matrix_position(&instance.global_transforms()[0]).abs_diff_eq(Vec3::new(0.0, 5.0, 0.0), EPSILON));
}

#[test]
fn update_models_advances_and_propagates() {
    let mut scene = Scene::new();
    let key = scene.create_entity("slider");
    scene.transform_mut(key).unwrap().matrix = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
    scene.set_model(key, sliding_model());
    scene.model_mut(key).unwrap().instance.select_animation(Some(0)).unwrap();

    scene.update_models(true, 0.5);
    let global = scene.model(key).unwrap().instance.global_transforms()[0];
    assert!(matrix_position(&global).abs_diff_eq(Vec3::new(0.0, 5.0, 2.0), EPSILON));

    // Moving the entity moves the model on the next tick, even when paused.
    scene.transform_mut(key).unwrap().matrix = Mat4::IDENTITY;
    scene.update_models(false, 0.5);
    let global = scene.model(key).unwrap().instance.global_transforms()[0];
    assert!(matrix_position(&global).abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), EPSILON));
}

#[test]
fn set_model_on_a_removed_entity_fails() {
    let mut scene = Scene::new();
    let key = scene.create_entity("gone");
    scene.remove_entity(key);
    assert!(!scene.set_model(key, sliding_model()));
}

#[test]
fn models_in_use_lists_each_model_once() {
    let mut backend = HeadlessBackend::new();
    let cube = Arc::new(Model::cube(Vec3::ONE, &mut backend));
    let slider = sliding_model();

    let mut scene = Scene::new();
    for i in 0..3 {
        let key = scene.create_entity(&format!("cube {i}"));
        scene.set_model(key, cube.clone());
    }
    let key = scene.create_entity("slider");
    scene.set_model(key, slider.clone());

    let used: Vec<_> = scene.models_in_use().collect();
    assert_eq!(used.len(), 2);
    assert!(used.iter().any(|model| Arc::ptr_eq(model, &cube)));
    assert!(used.iter().any(|model| Arc::ptr_eq(model, &slider)));

    assert!(scene.clear_model(key).is_some());
    assert_eq!(scene.models_in_use().count(), 1);
}

#[test]
fn cloned_scenes_are_independent() {
    let mut scene = Scene::new();
    let key = scene.create_entity("original");
    scene.set_model(key, sliding_model());
    scene.model_mut(key).unwrap().instance.select_animation(Some(0)).unwrap();

    let mut copy = scene.clone();
    copy.update_models(true, 1.0 - 1e-3);
    copy.identity_mut(key).unwrap().name = "copy".into();

    assert_eq!(scene.identity(key).unwrap().name, "original");
    assert_eq!(scene.model(key).unwrap().instance.animation.time, 0.0);
    assert!(copy.model(key).unwrap().instance.animation.time > 0.9);
    // Both share the same immutable model.
    assert!(Arc::ptr_eq(scene.model(key).unwrap().instance.model(), copy.model(key).unwrap().instance.model()));
}
