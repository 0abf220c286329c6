//! Models and the scene graph.
//!
//! A [`Model`] is immutable once built and shared through `Arc`. Each scene
//! entity that shows a model owns a [`ModelInstance`] holding its own pose,
//! and the [`Scene`] drives all instances once per frame.

pub mod instance;
pub mod model;
pub mod scene;
pub mod transform_system;

pub use instance::ModelInstance;
pub use model::{Model, ModelNode, PrimitiveRange, Skin};
pub use scene::{EntityKey, IdentityComponent, ModelComponent, Scene, TransformComponent};
