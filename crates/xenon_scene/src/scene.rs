//! Entity scene graph.
//!
//! Entities live in a slotmap arena with components in secondary maps.
//! Parents are referenced by entity UUID so a scene survives being cloned
//! or rebuilt with fresh keys. The entity hierarchy is independent of any
//! model's internal node hierarchy: an entity's world matrix becomes the
//! root transform of its model instance.

use std::sync::Arc;

use glam::Mat4;
use rustc_hash::FxHashMap;
use slotmap::{SecondaryMap, SlotMap, new_key_type};
use smallvec::SmallVec;
use uuid::Uuid;

use crate::instance::ModelInstance;
use crate::model::Model;

new_key_type! {
    pub struct EntityKey;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityComponent {
    pub uuid: Uuid,
    pub name: String,
    pub tags: SmallVec<[String; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponent {
    /// Local matrix, relative to the parent entity.
    pub matrix: Mat4,
    pub parent: Option<Uuid>,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self { matrix: Mat4::IDENTITY, parent: None }
    }
}

#[derive(Debug, Clone)]
pub struct ModelComponent {
    pub instance: ModelInstance,
    pub wireframe: bool,
}

/// Every entity has an identity and a transform; models are optional.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    entities: SlotMap<EntityKey, ()>,
    identities: SecondaryMap<EntityKey, IdentityComponent>,
    transforms: SecondaryMap<EntityKey, TransformComponent>,
    models: SecondaryMap<EntityKey, ModelComponent>,
    by_uuid: FxHashMap<Uuid, EntityKey>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.entities.keys()
    }

    pub fn create_entity(&mut self, name: &str) -> EntityKey {
        self.create_entity_with_id(Uuid::new_v4(), name)
    }

    /// Creates an entity with a caller-chosen UUID. If the UUID is already
    /// taken, the existing entity is returned unchanged.
    pub fn create_entity_with_id(&mut self, uuid: Uuid, name: &str) -> EntityKey {
        if let Some(&existing) = self.by_uuid.get(&uuid) {
            log::warn!("Entity {uuid} already exists; not creating '{name}'");
            return existing;
        }

        let key = self.entities.insert(());
        self.identities.insert(
            key,
            IdentityComponent { uuid, name: name.to_owned(), tags: SmallVec::new() },
        );
        self.transforms.insert(key, TransformComponent::default());
        self.by_uuid.insert(uuid, key);
        key
    }

    /// Removes an entity. Its children are detached and keep their current
    /// world matrix as their new local matrix.
    pub fn remove_entity(&mut self, key: EntityKey) -> bool {
        let Some(identity) = self.identities.get(key) else {
            return false;
        };
        let uuid = identity.uuid;

        let children: Vec<EntityKey> = self
            .transforms
            .iter()
            .filter(|(_, transform)| transform.parent == Some(uuid))
            .map(|(child, _)| child)
            .collect();
        for child in children {
            let world = self.world_matrix(child);
            if let Some(transform) = self.transforms.get_mut(child) {
                transform.matrix = world;
                transform.parent = None;
            }
        }

        self.entities.remove(key);
        self.identities.remove(key);
        self.transforms.remove(key);
        self.models.remove(key);
        self.by_uuid.remove(&uuid);
        true
    }

    #[must_use]
    pub fn entity_by_id(&self, uuid: Uuid) -> Option<EntityKey> {
        self.by_uuid.get(&uuid).copied()
    }

    #[must_use]
    pub fn identity(&self, key: EntityKey) -> Option<&IdentityComponent> {
        self.identities.get(key)
    }

    pub fn identity_mut(&mut self, key: EntityKey) -> Option<&mut IdentityComponent> {
        self.identities.get_mut(key)
    }

    #[must_use]
    pub fn transform(&self, key: EntityKey) -> Option<&TransformComponent> {
        self.transforms.get(key)
    }

    pub fn transform_mut(&mut self, key: EntityKey) -> Option<&mut TransformComponent> {
        self.transforms.get_mut(key)
    }

    #[must_use]
    pub fn model(&self, key: EntityKey) -> Option<&ModelComponent> {
        self.models.get(key)
    }

    pub fn model_mut(&mut self, key: EntityKey) -> Option<&mut ModelComponent> {
        self.models.get_mut(key)
    }

    /// Re-parents `child` under `parent` (or makes it a root with `None`).
    ///
    /// The local matrix is left as is. Returns `false` without changing
    /// anything if either entity is unknown or the link would form a cycle.
    pub fn set_parent(&mut self, child: EntityKey, parent: Option<EntityKey>) -> bool {
        let Some(child_uuid) = self.identities.get(child).map(|identity| identity.uuid) else {
            return false;
        };

        let parent_uuid = match parent {
            None => None,
            Some(parent) => {
                let Some(identity) = self.identities.get(parent) else {
                    log::warn!("set_parent: unknown parent entity {parent:?}");
                    return false;
                };
                if self.is_ancestor_or_self(child_uuid, parent) {
                    log::warn!("set_parent: parenting {child_uuid} under {} would form a cycle", identity.uuid);
                    return false;
                }
                Some(identity.uuid)
            }
        };

        match self.transforms.get_mut(child) {
            Some(transform) => {
                transform.parent = parent_uuid;
                true
            }
            None => false,
        }
    }

    /// Whether `ancestor` appears on the parent chain starting at `entity`.
    fn is_ancestor_or_self(&self, ancestor: Uuid, entity: EntityKey) -> bool {
        let mut current = Some(entity);
        let mut steps = 0;
        while let Some(key) = current {
            if self.identities.get(key).is_some_and(|identity| identity.uuid == ancestor) {
                return true;
            }
            steps += 1;
            if steps > self.entities.len() {
                return true;
            }
            current = self
                .transforms
                .get(key)
                .and_then(|transform| transform.parent)
                .and_then(|uuid| self.by_uuid.get(&uuid).copied());
        }
        false
    }

    /// Local matrices composed from the root down to `key`.
    ///
    /// Walks the parent chain iteratively. A parent UUID with no entity ends
    /// the walk there, with a warning.
    #[must_use]
    pub fn world_matrix(&self, key: EntityKey) -> Mat4 {
        let mut world = Mat4::IDENTITY;
        let mut current = Some(key);
        let mut steps = 0;

        while let Some(entity) = current {
            let Some(transform) = self.transforms.get(entity) else {
                break;
            };
            world = transform.matrix * world;

            steps += 1;
            if steps > self.entities.len() {
                log::warn!("Entity hierarchy contains a cycle; world matrix truncated");
                break;
            }

            current = match transform.parent {
                None => None,
                Some(parent) => {
                    let found = self.by_uuid.get(&parent).copied();
                    if found.is_none() {
                        log::warn!("Entity parent {parent} does not exist");
                    }
                    found
                }
            };
        }
        world
    }

    /// World matrix of `key`'s parent, identity for roots.
    #[must_use]
    pub fn parent_world_matrix(&self, key: EntityKey) -> Mat4 {
        self.transforms
            .get(key)
            .and_then(|transform| transform.parent)
            .and_then(|parent| self.by_uuid.get(&parent).copied())
            .map_or(Mat4::IDENTITY, |parent| self.world_matrix(parent))
    }

    /// Converts a world-space matrix into `key`'s parent space.
    #[must_use]
    pub fn to_local_matrix(&self, world: &Mat4, key: EntityKey) -> Mat4 {
        self.parent_world_matrix(key).inverse() * *world
    }

    /// Gives `key` a fresh instance of `model`, replacing any previous one.
    pub fn set_model(&mut self, key: EntityKey, model: Arc<Model>) -> bool {
        if !self.entities.contains_key(key) {
            return false;
        }
        let mut instance = ModelInstance::new(model);
        instance.propagate_transforms(&self.world_matrix(key));
        self.models.insert(key, ModelComponent { instance, wireframe: false });
        true
    }

    pub fn clear_model(&mut self, key: EntityKey) -> Option<ModelComponent> {
        self.models.remove(key)
    }

    /// Per-frame tick: advances every instance's animation, then propagates
    /// its transforms under the owning entity's world matrix.
    pub fn update_models(&mut self, is_playing: bool, delta_time: f32) {
        let keys: Vec<EntityKey> = self.models.keys().collect();
        for key in keys {
            let world = self.world_matrix(key);
            if let Some(component) = self.models.get_mut(key) {
                component.instance.advance_animation(is_playing, delta_time);
                component.instance.propagate_transforms(&world);
            }
        }
    }

    /// Distinct models referenced by any entity.
    pub fn models_in_use(&self) -> impl Iterator<Item = &Arc<Model>> + '_ {
        let mut seen = Vec::new();
        self.models.values().map(|component| component.instance.model()).filter(move |model| {
            let ptr = Arc::as_ptr(model);
            if seen.contains(&ptr) {
                false
            } else {
                seen.push(ptr);
                true
            }
        })
    }
}
