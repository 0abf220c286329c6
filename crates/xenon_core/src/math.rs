//! Matrix component helpers.
//!
//! Local transforms are stored as full `Mat4`s (the loader may receive an
//! arbitrary matrix from the document), while animation channels and editor
//! tooling work on individual translation / rotation / scale components.
//! These helpers read or replace one component and leave the other two
//! untouched.

use glam::{Mat4, Quat, Vec3, Vec4};

/// Lower bound for keyframe interval lengths and float comparisons.
pub const EPSILON: f32 = 1e-6;

/// Builds `T × R × S`, the composition order used by model documents.
#[inline]
#[must_use]
pub fn compose_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

#[inline]
#[must_use]
pub fn matrix_position(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}

/// Replaces the translation column, keeping rotation, scale and shear.
#[inline]
#[must_use]
pub fn with_position(matrix: &Mat4, position: Vec3) -> Mat4 {
    let mut result = *matrix;
    result.w_axis = Vec4::new(position.x, position.y, position.z, matrix.w_axis.w);
    result
}

#[inline]
#[must_use]
pub fn matrix_rotation(matrix: &Mat4) -> Quat {
    let (_, rotation, _) = matrix.to_scale_rotation_translation();
    rotation
}

/// Replaces the rotation, keeping translation and scale.
///
/// The matrix is decomposed and recomposed, so any shear is dropped.
#[must_use]
pub fn with_rotation(matrix: &Mat4, rotation: Quat) -> Mat4 {
    let (scale, _, translation) = matrix.to_scale_rotation_translation();
    compose_trs(translation, rotation, scale)
}

#[inline]
#[must_use]
pub fn matrix_scale(matrix: &Mat4) -> Vec3 {
    let (scale, _, _) = matrix.to_scale_rotation_translation();
    scale
}

/// Replaces the scale, keeping translation and rotation.
#[must_use]
pub fn with_scale(matrix: &Mat4, scale: Vec3) -> Mat4 {
    let (_, rotation, translation) = matrix.to_scale_rotation_translation();
    compose_trs(translation, rotation, scale)
}
