use std::sync::Arc;

use glam::Mat4;
use xenon_animation::{AnimationPlaybackState, advance_animation};
use xenon_core::{Result, XenonError};

use crate::model::Model;
use crate::transform_system::{compute_global_transforms, compute_joint_matrices};

/// Per-entity state of a shared [`Model`].
///
/// The local and global transform arrays always hold exactly one matrix per
/// model node.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    model: Arc<Model>,
    current_local_transforms: Vec<Mat4>,
    current_global_transforms: Vec<Mat4>,
    skin_joint_matrices: Vec<Vec<Mat4>>,
    pub animation: AnimationPlaybackState,
}

impl ModelInstance {
    #[must_use]
    pub fn new(model: Arc<Model>) -> Self {
        let node_count = model.nodes.len();
        let mut instance = Self {
            current_local_transforms: model.local_transforms.clone(),
            current_global_transforms: vec![Mat4::IDENTITY; node_count],
            skin_joint_matrices: model.skins.iter().map(|skin| vec![Mat4::IDENTITY; skin.joints.len()]).collect(),
            animation: AnimationPlaybackState::new(node_count),
            model,
        };
        instance.propagate_transforms(&Mat4::IDENTITY);
        instance
    }

    #[must_use]
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    #[must_use]
    pub fn local_transforms(&self) -> &[Mat4] {
        &self.current_local_transforms
    }

    /// Mutable pose access. The slice length is fixed to the node count.
    pub fn local_transforms_mut(&mut self) -> &mut [Mat4] {
        self.animation.dirty = true;
        &mut self.current_local_transforms
    }

    #[must_use]
    pub fn global_transforms(&self) -> &[Mat4] {
        &self.current_global_transforms
    }

    #[must_use]
    pub fn skin_joint_matrices(&self) -> &[Vec<Mat4>] {
        &self.skin_joint_matrices
    }

    #[must_use]
    pub fn joint_matrices(&self, skin: usize) -> Option<&[Mat4]> {
        self.skin_joint_matrices.get(skin).map(Vec::as_slice)
    }

    /// Selects an animation by index, or stops playback with `None`.
    ///
    /// Rewinds time and cursors either way. The pose is left as it is.
    pub fn select_animation(&mut self, animation: Option<usize>) -> Result<()> {
        if let Some(index) = animation
            && index >= self.model.animations.len()
        {
            return Err(XenonError::IndexOutOfBounds {
                context: format!("animation of model '{}'", self.model.name),
                index,
            });
        }
        self.animation.select(animation);
        Ok(())
    }

    /// Restores the model's rest pose.
    pub fn reset_pose(&mut self) {
        self.current_local_transforms.copy_from_slice(&self.model.local_transforms);
        self.animation.reset_cursors();
        self.animation.dirty = true;
    }

    /// Samples the selected animation into the local transforms.
    ///
    /// A no-op returning `false` when no animation is selected.
    pub fn advance_animation(&mut self, is_playing: bool, delta_time: f32) -> bool {
        let Some(index) = self.animation.animation else {
            return false;
        };
        let Some(animation) = self.model.animations.get(index) else {
            log::warn!("Selected animation {index} does not exist; playback stopped");
            self.animation.select(None);
            return false;
        };

        advance_animation(
            animation,
            &mut self.animation,
            &self.model.local_transforms,
            &mut self.current_local_transforms,
            is_playing,
            delta_time,
        )
    }

    /// Recomputes global transforms under `parent_world`, then every skin's
    /// joint matrices.
    pub fn propagate_transforms(&mut self, parent_world: &Mat4) {
        compute_global_transforms(
            &self.model.nodes,
            &self.current_local_transforms,
            parent_world,
            &mut self.current_global_transforms,
        );
        compute_joint_matrices(&self.model.skins, &self.current_global_transforms, &mut self.skin_joint_matrices);
        self.animation.dirty = false;
    }
}
