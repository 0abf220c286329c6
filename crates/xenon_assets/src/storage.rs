use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};
use uuid::Uuid;

struct StorageInner<H: Key, T> {
    map: SlotMap<H, Arc<T>>,
    lookup: FxHashMap<Uuid, H>,
}

impl<H: Key, T> Default for StorageInner<H, T> {
    fn default() -> Self {
        Self { map: SlotMap::default(), lookup: FxHashMap::default() }
    }
}

/// Thread-safe handle → `Arc<T>` storage with an optional UUID index.
pub struct AssetStorage<H: Key, T> {
    inner: RwLock<StorageInner<H, T>>,
}

impl<H: Key, T> Default for AssetStorage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Key, T> AssetStorage<H, T> {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: RwLock::default() }
    }

    pub fn add(&self, asset: impl Into<T>) -> H {
        self.inner.write().map.insert(Arc::new(asset.into()))
    }

    /// Adds `asset` and points `uuid` at it, replacing whatever `uuid`
    /// pointed at before. The previous entry stays stored under its handle.
    pub fn insert_with_uuid(&self, uuid: Uuid, asset: impl Into<T>) -> H {
        let mut guard = self.inner.write();
        let handle = guard.map.insert(Arc::new(asset.into()));
        guard.lookup.insert(uuid, handle);
        handle
    }

    #[must_use]
    pub fn get(&self, handle: H) -> Option<Arc<T>> {
        self.inner.read().map.get(handle).cloned()
    }

    #[must_use]
    pub fn get_handle_by_uuid(&self, uuid: &Uuid) -> Option<H> {
        self.inner.read().lookup.get(uuid).copied()
    }

    #[must_use]
    pub fn contains(&self, handle: H) -> bool {
        self.inner.read().map.contains_key(handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes the entry and every UUID pointing at it, handing back the
    /// storage's reference.
    pub fn remove(&self, handle: H) -> Option<Arc<T>> {
        let mut guard = self.inner.write();
        let asset = guard.map.remove(handle)?;
        guard.lookup.retain(|_, h| *h != handle);
        Some(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::new_key_type;

    new_key_type! {
        struct TestHandle;
    }

    #[test]
    fn uuid_follows_the_latest_insert() {
        let storage: AssetStorage<TestHandle, String> = AssetStorage::new();
        let id = Uuid::new_v4();
        let old = storage.insert_with_uuid(id, "old");
        let new = storage.insert_with_uuid(id, "new");

        assert_eq!(storage.get_handle_by_uuid(&id), Some(new));
        assert_eq!(storage.get(old).as_deref().map(String::as_str), Some("old"));
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn remove_drops_the_uuid_entry() {
        let storage: AssetStorage<TestHandle, String> = AssetStorage::new();
        let id = Uuid::new_v4();
        let handle = storage.insert_with_uuid(id, "asset");

        assert!(storage.remove(handle).is_some());
        assert!(!storage.contains(handle));
        assert_eq!(storage.get_handle_by_uuid(&id), None);
        assert!(storage.remove(handle).is_none());
    }
}
