//! Model storage with deferred GPU release.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::new_key_type;
use uuid::Uuid;
use xenon_core::{Result, XenonError};
use xenon_resources::GpuBackend;
use xenon_scene::Model;

use crate::loaders::load_model;
use crate::settings::LoaderSettings;
use crate::storage::AssetStorage;

new_key_type! {
    pub struct ModelHandle;
}

/// Owns loaded models.
///
/// Instances hold their own `Arc<Model>`, so unloading a model that is still
/// on screen only drops the server's reference; its GPU objects are freed by
/// [`AssetServer::collect_garbage`] once the last instance lets go.
#[derive(Default)]
pub struct AssetServer {
    models: AssetStorage<ModelHandle, Model>,
    pending_release: Mutex<Vec<Arc<Model>>>,
}

impl AssetServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn path_key(path: &Path) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, path.to_string_lossy().as_bytes())
    }

    /// Imports the document at `path`. Every call re-imports; the path then
    /// refers to the newest import.
    pub fn load_model(
        &self,
        path: impl AsRef<Path>,
        backend: &mut dyn GpuBackend,
        settings: &LoaderSettings,
    ) -> Result<ModelHandle> {
        let path = path.as_ref();
        let model = load_model(path, backend, settings)?;
        Ok(self.models.insert_with_uuid(Self::path_key(path), model))
    }

    /// Stores an already built model, e.g. a procedural one.
    pub fn add_model(&self, model: Model) -> ModelHandle {
        self.models.add(model)
    }

    #[must_use]
    pub fn get_model(&self, handle: ModelHandle) -> Option<Arc<Model>> {
        self.models.get(handle)
    }

    #[must_use]
    pub fn handle_for_path(&self, path: impl AsRef<Path>) -> Option<ModelHandle> {
        self.models.get_handle_by_uuid(&Self::path_key(path.as_ref()))
    }

    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Number of unloaded models still waiting for their last user.
    #[must_use]
    pub fn pending_release_count(&self) -> usize {
        self.pending_release.lock().len()
    }

    /// Removes a model. Its GPU objects are released now if nothing else
    /// holds it, otherwise on a later [`collect_garbage`](Self::collect_garbage).
    pub fn unload_model(&self, handle: ModelHandle, backend: &mut dyn GpuBackend) -> Result<()> {
        let model = self
            .models
            .remove(handle)
            .ok_or_else(|| XenonError::AssetNotFound(format!("{handle:?}")))?;

        match Arc::try_unwrap(model) {
            Ok(model) => model.release(backend),
            Err(shared) => {
                log::debug!(
                    "Model '{}' still has {} users; release deferred",
                    shared.name,
                    Arc::strong_count(&shared) - 1
                );
                self.pending_release.lock().push(shared);
            }
        }
        Ok(())
    }

    /// Releases every unloaded model whose last user is gone. Returns how
    /// many were released.
    pub fn collect_garbage(&self, backend: &mut dyn GpuBackend) -> usize {
        let pending = std::mem::take(&mut *self.pending_release.lock());
        let mut still_shared = Vec::new();
        let mut released = 0;

        for model in pending {
            match Arc::try_unwrap(model) {
                Ok(model) => {
                    model.release(backend);
                    released += 1;
                }
                Err(shared) => still_shared.push(shared),
            }
        }

        self.pending_release.lock().extend(still_shared);
        released
    }
}
