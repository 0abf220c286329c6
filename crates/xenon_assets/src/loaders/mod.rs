//! Document loaders.

pub mod gltf;

pub use self::gltf::{GltfLoader, load_model, load_model_from_slice};
