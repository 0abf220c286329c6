//! Asset loading.
//!
//! [`GltfLoader`] turns a glTF or GLB document into a [`Model`]; the
//! [`AssetServer`] keeps loaded models alive behind handles and defers GPU
//! release until no instance uses them.
//!
//! [`Model`]: xenon_scene::Model

pub mod io;
pub mod loaders;
pub mod server;
pub mod settings;
pub mod storage;

pub use io::{AssetReader, FileAssetReader};
pub use loaders::{GltfLoader, load_model, load_model_from_slice};
pub use server::{AssetServer, ModelHandle};
pub use settings::{LoaderSettings, SceneSelection};
pub use storage::AssetStorage;
