//! # Xenon Engine
//!
//! Model loading, skeletal animation and transform propagation.
//!
//! This umbrella crate re-exports the workspace crates:
//!
//! - [`xenon_core`]: error type and matrix helpers
//! - [`xenon_resources`]: GPU-facing data (primitives, materials, textures)
//!   and the [`GpuBackend`] seam
//! - [`xenon_animation`]: keyframe tracks and the animation sampler
//! - [`xenon_scene`]: models, model instances and the entity scene
//! - [`xenon_assets`]: the glTF/GLB loader and the asset server
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xenon::prelude::*;
//!
//! let mut backend = HeadlessBackend::new();
//! let model = load_model("assets/fox.glb", &mut backend, &LoaderSettings::default())?;
//!
//! let mut instance = ModelInstance::new(Arc::new(model));
//! instance.select_animation(Some(0))?;
//! if instance.advance_animation(true, 1.0 / 60.0) {
//!     instance.propagate_transforms(&Mat4::IDENTITY);
//! }
//! ```

pub use xenon_animation as animation;
pub use xenon_assets as assets;
pub use xenon_core::{errors, math};
pub use xenon_resources as resources;
pub use xenon_scene as scene;

pub use xenon_animation::{Animation, AnimationPlaybackState, Interpolation, Keyframe};
pub use xenon_assets::{AssetServer, GltfLoader, LoaderSettings, ModelHandle, SceneSelection, load_model, load_model_from_slice};
pub use xenon_core::{Result, XenonError};
pub use xenon_resources::{BoundingBox, GpuBackend, HeadlessBackend, Material, Primitive};
#[cfg(feature = "wgpu-backend")]
pub use xenon_resources::WgpuBackend;
pub use xenon_resources::primitives::Facing;
pub use xenon_scene::{EntityKey, Model, ModelInstance, Scene};

pub mod prelude {
    pub use crate::{
        Animation, AssetServer, BoundingBox, EntityKey, Facing, GpuBackend, HeadlessBackend, LoaderSettings,
        Model, ModelInstance, Result, Scene, XenonError, load_model, load_model_from_slice,
    };
    pub use glam::{Mat4, Quat, Vec3};
}
