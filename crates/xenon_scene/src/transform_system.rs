//! Transform propagation for model instances.
//!
//! Nodes are stored parent-first, so world transforms are a single forward
//! pass with no stack or recursion. Joint matrices are derived afterwards so
//! every joint sees this frame's pose regardless of where it sits relative
//! to the skinned node.

use glam::Mat4;

use crate::model::{ModelNode, Skin};

/// `globals[i] = (parent ? globals[parent] : parent_world) × locals[i]`.
pub fn compute_global_transforms(nodes: &[ModelNode], locals: &[Mat4], parent_world: &Mat4, globals: &mut [Mat4]) {
    debug_assert_eq!(nodes.len(), locals.len());
    debug_assert_eq!(nodes.len(), globals.len());

    for (i, (node, local)) in nodes.iter().zip(locals).enumerate() {
        let parent = match node.parent {
            Some(p) if p < i => globals[p],
            Some(p) => {
                log::warn!("Node {i} has parent {p} that does not precede it; treated as a root");
                *parent_world
            }
            None => *parent_world,
        };
        globals[i] = parent * *local;
    }
}

/// `joints[j] = globals[skin.joints[j]] × inverse_bind_matrices[j]` for every
/// skin.
pub fn compute_joint_matrices(skins: &[Skin], globals: &[Mat4], joint_matrices: &mut [Vec<Mat4>]) {
    for (skin, output) in skins.iter().zip(joint_matrices.iter_mut()) {
        output.resize(skin.joints.len(), Mat4::IDENTITY);
        for (j, (&joint, matrix)) in skin.joints.iter().zip(output.iter_mut()).enumerate() {
            let inverse_bind = skin.inverse_bind_matrices.get(j).copied().unwrap_or(Mat4::IDENTITY);
            *matrix = globals.get(joint).map_or(Mat4::IDENTITY, |global| *global * inverse_bind);
        }
    }
}
