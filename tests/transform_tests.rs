//! Transform propagation tests
//!
//! Tests for:
//! - Flat parent-first propagation under a parent world matrix
//! - Skin joint matrices (bind pose identity, joints after the skinned node)
//! - Animated poses flowing into globals and joints
//! - Bounding box union and transform

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use xenon::animation::{Animation, Keyframe};
use xenon::math::{compose_trs, matrix_position};
use xenon::resources::BoundingBox;
use xenon::scene::transform_system::{compute_global_transforms, compute_joint_matrices};
use xenon::scene::{Model, ModelInstance, ModelNode, Skin};

const EPSILON: f32 = 1e-5;

fn node(name: &str, parent: Option<usize>) -> ModelNode {
    ModelNode { name: name.into(), parent, ..Default::default() }
}

/// `hips -> spine -> head`, each offset one unit up, plus a skin over all
/// three joints with bind-pose inverse matrices.
fn rig() -> Model {
    let offset = Mat4::from_translation(Vec3::Y);
    let binds = [Mat4::from_translation(Vec3::Y), Mat4::from_translation(Vec3::Y * 2.0), Mat4::from_translation(Vec3::Y * 3.0)];
    Model {
        name: "rig".into(),
        nodes: vec![
            ModelNode { skin: Some(0), ..node("hips", None) },
            node("spine", Some(0)),
            node("head", Some(1)),
        ],
        local_transforms: vec![offset; 3],
        skins: vec![Skin {
            name: "body".into(),
            joints: vec![0, 1, 2],
            skeleton: Some(0),
            inverse_bind_matrices: binds.iter().map(Mat4::inverse).collect(),
        }],
        ..Default::default()
    }
}

// ============================================================================
// Global transforms
// ============================================================================

#[test]
fn three_node_chain_propagates_end_to_end() {
    let mut instance = ModelInstance::new(Arc::new(rig()));
    let world = compose_trs(Vec3::new(10.0, 0.0, 0.0), Quat::from_rotation_z(FRAC_PI_2), Vec3::ONE);
    instance.propagate_transforms(&world);

    let globals = instance.global_transforms();
    // Rotating +Y by 90 degrees about Z points it along -X.
    assert!(matrix_position(&globals[0]).abs_diff_eq(Vec3::new(9.0, 0.0, 0.0), EPSILON));
    assert!(matrix_position(&globals[1]).abs_diff_eq(Vec3::new(8.0, 0.0, 0.0), EPSILON));
    assert!(matrix_position(&globals[2]).abs_diff_eq(Vec3::new(7.0, 0.0, 0.0), EPSILON));
}

#[test]
fn roots_take_the_parent_world_matrix() {
    let nodes = vec![node("a", None), node("b", None), node("b-child", Some(1))];
    let locals = vec![Mat4::IDENTITY, Mat4::from_scale(Vec3::splat(2.0)), Mat4::from_translation(Vec3::X)];
    let world = Mat4::from_translation(Vec3::Z);
    let mut globals = vec![Mat4::ZERO; 3];

    compute_global_transforms(&nodes, &locals, &world, &mut globals);

    assert_eq!(globals[0], world);
    assert_eq!(globals[1], world * locals[1]);
    assert!(matrix_position(&globals[2]).abs_diff_eq(Vec3::new(2.0, 0.0, 1.0), EPSILON));
}

#[test]
fn globals_match_a_recursive_reference() {
    let model = rig();
    let mut globals = vec![Mat4::IDENTITY; 3];
    compute_global_transforms(&model.nodes, &model.local_transforms, &Mat4::IDENTITY, &mut globals);

    for (i, global) in globals.iter().enumerate() {
        let mut expected = Mat4::IDENTITY;
        let mut cursor = Some(i);
        while let Some(index) = cursor {
            expected = model.local_transforms[index] * expected;
            cursor = model.nodes[index].parent;
        }
        assert!(global.abs_diff_eq(expected, EPSILON), "node {i}");
    }
}

// ============================================================================
// Skins
// ============================================================================

#[test]
fn bind_pose_yields_identity_joint_matrices() {
    let instance = ModelInstance::new(Arc::new(rig()));
    for joint in instance.joint_matrices(0).unwrap() {
        assert!(joint.abs_diff_eq(Mat4::IDENTITY, EPSILON));
    }
    assert!(instance.joint_matrices(1).is_none());
}

#[test]
fn joints_after_the_skinned_node_see_the_current_frame() {
    let mut animation = Animation::new("nod");
    animation.node_mut(2).translation = vec![
        Keyframe::linear(0.0, Vec3::Y),
        Keyframe::linear(1.0, Vec3::new(0.0, 1.0, 5.0)),
    ];
    animation.recompute_totals();

    let mut model = rig();
    model.animations.push(animation);
    let mut instance = ModelInstance::new(Arc::new(model));
    instance.select_animation(Some(0)).unwrap();

    assert!(instance.advance_animation(true, 0.5));
    assert!(instance.animation.dirty);
    instance.propagate_transforms(&Mat4::IDENTITY);
    assert!(!instance.animation.dirty);

    // Head (node 2) comes after the skinned hips (node 0) but is current.
    let head_joint = instance.joint_matrices(0).unwrap()[2];
    assert!(matrix_position(&head_joint).abs_diff_eq(Vec3::new(0.0, 0.0, 2.5), EPSILON));
}

#[test]
fn compute_joint_matrices_resizes_output() {
    let model = rig();
    let globals = vec![Mat4::from_translation(Vec3::X); 3];
    let mut joints = vec![Vec::new()];
    compute_joint_matrices(&model.skins, &globals, &mut joints);

    assert_eq!(joints[0].len(), 3);
    assert!(matrix_position(&joints[0][1]).abs_diff_eq(Vec3::new(1.0, -2.0, 0.0), EPSILON));
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn union_only_grows() {
    let a = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
    let b = BoundingBox::new(Vec3::splat(-2.0), Vec3::splat(0.5));
    let merged = a.union(&b);

    assert!(merged.contains(&a));
    assert!(merged.contains(&b));
    assert_eq!(merged.union(&BoundingBox::empty()), merged);
    assert_eq!(BoundingBox::empty().union(&a), a);
}

#[test]
fn transformed_box_encloses_rotated_corners() {
    let unit = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
    let turned = unit.transform(&Mat4::from_rotation_z(FRAC_PI_2));
    assert!(turned.min.abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), EPSILON));
    assert!(turned.max.abs_diff_eq(Vec3::new(0.0, 1.0, 1.0), EPSILON));
    assert!(BoundingBox::empty().transform(&Mat4::from_translation(Vec3::X)).is_empty());
}
