//! ECS World: entity table, component stores, and scene registry
//!
//! The world is pure data plus structural operations; systems and frame
//! dispatch live in the [`scheduler`](super::scheduler). All failure paths
//! follow the same policy: invalid handles and rejected operations return
//! sentinels or `None`, log a warning, and leave state unchanged. Nothing
//! in here panics in non-test code.

use super::component::{AnyComponentStore, Component, ComponentKey, TypedStore};
use super::entity::{ComponentAttachment, EntityId, EntityRecord};
use super::scene::{SceneId, SceneRecord};
use super::snapshot::ResetPoint;
use crate::metadata::{MetadataRegistry, Reflect};
use crate::physics::PhysicsEngine3d;
use crate::scene_file::{LoadedComponent, LoadedEntity, LoadedScene};
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;

/// Name given to the synthetic root entity of every scene
pub const SCENE_ROOT_NAME: &str = "Root";

/// Structural limits for one world
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum number of entity records (live plus retired)
    pub max_entities: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: 10_000,
        }
    }
}

/// ECS world containing all entities, components, and scenes
pub struct World {
    config: WorldConfig,
    entities: Vec<EntityRecord>,
    name_index: HashMap<String, EntityId>,
    stores: HashMap<TypeId, Box<dyn AnyComponentStore>>,
    scenes: Vec<SceneRecord>,
    active_scene: SceneId,
    pending_entity_destroys: Vec<EntityId>,
    pending_component_destroys: Vec<(EntityId, TypeId)>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    /// Create an empty world with the given limits
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            entities: Vec::new(),
            name_index: HashMap::new(),
            stores: HashMap::new(),
            scenes: Vec::new(),
            active_scene: SceneId::INVALID,
            pending_entity_destroys: Vec::new(),
            pending_component_destroys: Vec::new(),
        }
    }

    // ---- entity table -------------------------------------------------

    /// Create an entity under `parent`
    ///
    /// `parent` may be [`EntityId::ROOT`] to attach under the active
    /// scene's root. Returns [`EntityId::INVALID`] when the parent does
    /// not exist or the entity budget is exhausted.
    pub fn create_entity(&mut self, parent: EntityId, name: &str) -> EntityId {
        let Some(parent_index) = self.resolve(parent) else {
            log::warn!("create_entity: parent {parent} does not exist");
            return EntityId::INVALID;
        };

        let scene = self.entities[parent_index].scene;
        let id = self.alloc_entity(name.to_string(), EntityId::from_index(parent_index), scene);
        if id.is_valid() {
            self.entities[parent_index].children.push(id);
        }
        id
    }

    /// Destroy an entity and all of its descendants, depth-first
    ///
    /// Attached components are destroyed in reverse attachment order
    /// through their store's destroy path. Scene roots cannot be destroyed
    /// here; use [`World::destroy_scene`].
    pub fn destroy_entity(&mut self, id: EntityId, physics: &mut dyn PhysicsEngine3d) -> bool {
        let Some(index) = self.resolve(id) else {
            log::warn!("destroy_entity: {id} does not exist");
            return false;
        };
        if self.entities[index].parent == EntityId::INVALID {
            log::warn!("destroy_entity: {id} is a scene root; use destroy_scene");
            return false;
        }

        let concrete = EntityId::from_index(index);
        let parent = self.entities[index].parent;
        if let Some(parent_index) = parent.index() {
            self.entities[parent_index]
                .children
                .retain(|child| *child != concrete);
        }
        self.destroy_subtree(index, physics);
        true
    }

    /// Queue an entity for destruction at the end of the current phase
    ///
    /// This is the structural-mutation discipline for systems: destruction
    /// requested during iteration is deferred until the scheduler flushes
    /// the queue, so no store is compacted mid-iteration.
    pub fn queue_destroy_entity(&mut self, id: EntityId) {
        match self.resolve(id) {
            Some(index) => self
                .pending_entity_destroys
                .push(EntityId::from_index(index)),
            None => log::warn!("queue_destroy_entity: {id} does not exist"),
        }
    }

    /// Whether an entity id resolves to a live record
    pub fn entity_exists(&self, id: EntityId) -> bool {
        self.resolve(id).is_some()
    }

    /// Number of live entities, scene roots included
    pub fn entity_count(&self) -> usize {
        self.entities.iter().filter(|record| record.alive).count()
    }

    /// Iterate over all live entity ids
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, record)| record.alive)
            .map(|(index, _)| EntityId::from_index(index))
    }

    /// Entity enabled flag; `false` (with a warning) for unknown ids
    pub fn is_entity_enabled(&self, id: EntityId) -> bool {
        match self.resolve(id) {
            Some(index) => self.entities[index].enabled,
            None => {
                log::warn!("is_entity_enabled: {id} does not exist");
                false
            }
        }
    }

    /// Set an entity's enabled flag
    pub fn set_entity_enabled(&mut self, id: EntityId, enabled: bool) -> bool {
        match self.resolve(id) {
            Some(index) => {
                self.entities[index].enabled = enabled;
                true
            }
            None => {
                log::warn!("set_entity_enabled: {id} does not exist");
                false
            }
        }
    }

    /// Flip an entity's enabled flag
    pub fn set_entity_enabled_opposite(&mut self, id: EntityId) -> bool {
        match self.resolve(id) {
            Some(index) => {
                let record = &mut self.entities[index];
                record.enabled = !record.enabled;
                true
            }
            None => {
                log::warn!("set_entity_enabled_opposite: {id} does not exist");
                false
            }
        }
    }

    /// Entity name
    pub fn entity_name(&self, id: EntityId) -> Option<&str> {
        match self.resolve(id) {
            Some(index) => Some(self.entities[index].name.as_str()),
            None => {
                log::warn!("entity_name: {id} does not exist");
                None
            }
        }
    }

    /// Rename an entity
    ///
    /// The name-to-id index is updated in the same operation: lookups by
    /// the old name stop resolving before lookups by the new name start.
    pub fn set_entity_name(&mut self, id: EntityId, name: &str) -> bool {
        let Some(index) = self.resolve(id) else {
            log::warn!("set_entity_name: {id} does not exist");
            return false;
        };

        let concrete = EntityId::from_index(index);
        let old = std::mem::replace(&mut self.entities[index].name, name.to_string());
        if self.name_index.get(&old) == Some(&concrete) {
            self.name_index.remove(&old);
        }
        self.name_index.insert(name.to_string(), concrete);
        true
    }

    /// Look up an entity by name
    ///
    /// When several live entities share a name, the most recently
    /// registered one wins. Returns [`EntityId::INVALID`] when no entity
    /// has the name.
    pub fn entity_by_name(&self, name: &str) -> EntityId {
        self.name_index
            .get(name)
            .copied()
            .filter(|id| self.resolve(*id).is_some())
            .unwrap_or(EntityId::INVALID)
    }

    /// Parent of an entity; [`EntityId::INVALID`] for scene roots
    pub fn parent_of(&self, id: EntityId) -> EntityId {
        match self.resolve(id) {
            Some(index) => self.entities[index].parent,
            None => EntityId::INVALID,
        }
    }

    /// Children of an entity, in attachment order
    pub fn children_of(&self, id: EntityId) -> &[EntityId] {
        match self.resolve(id) {
            Some(index) => &self.entities[index].children,
            None => &[],
        }
    }

    /// Scene an entity belongs to
    pub fn scene_of(&self, id: EntityId) -> SceneId {
        match self.resolve(id) {
            Some(index) => self.entities[index].scene,
            None => SceneId::INVALID,
        }
    }

    /// Move an entity under a new parent in the same scene
    ///
    /// Rejected (with a warning) when either id is invalid, the move would
    /// create a cycle, or the parent belongs to a different scene.
    pub fn reparent_entity(&mut self, id: EntityId, new_parent: EntityId) -> bool {
        let (Some(index), Some(parent_index)) = (self.resolve(id), self.resolve(new_parent)) else {
            log::warn!("reparent_entity: {id} or {new_parent} does not exist");
            return false;
        };
        let concrete = EntityId::from_index(index);
        let concrete_parent = EntityId::from_index(parent_index);

        if self.entities[index].parent == EntityId::INVALID {
            log::warn!("reparent_entity: {id} is a scene root");
            return false;
        }
        if self.entities[index].scene != self.entities[parent_index].scene {
            log::warn!("reparent_entity: {id} and {new_parent} are in different scenes");
            return false;
        }

        // Walking up from the new parent must not reach the moved entity.
        let mut cursor = concrete_parent;
        while let Some(cursor_index) = cursor.index() {
            if cursor == concrete {
                log::warn!("reparent_entity: {new_parent} is a descendant of {id}");
                return false;
            }
            cursor = self.entities[cursor_index].parent;
        }

        let old_parent = self.entities[index].parent;
        if let Some(old_index) = old_parent.index() {
            self.entities[old_index]
                .children
                .retain(|child| *child != concrete);
        }
        self.entities[parent_index].children.push(concrete);
        self.entities[index].parent = concrete_parent;
        true
    }

    // ---- component store ----------------------------------------------

    /// Attach a component to an entity
    ///
    /// Rejected (with a warning, returning `None`) when the entity does
    /// not exist or already holds a component of this type; the existing
    /// instance is left unmodified. The returned key stays valid until the
    /// component is destroyed; keys are generation-counted, so a key held
    /// across a destroy is detectably stale.
    pub fn create_component<T: Component>(
        &mut self,
        entity: EntityId,
        component: T,
    ) -> Option<ComponentKey> {
        let Some(index) = self.resolve(entity) else {
            log::warn!(
                "create_component: {entity} does not exist; {} not attached",
                component.type_name()
            );
            return None;
        };

        let type_id = TypeId::of::<T>();
        if self.entities[index]
            .components
            .iter()
            .any(|attachment| attachment.type_id == type_id)
        {
            log::warn!(
                "create_component: entity '{}' already has a {} component",
                self.entities[index].name,
                component.type_name()
            );
            return None;
        }

        let type_name = component.type_name();
        let store = self
            .stores
            .entry(type_id)
            .or_insert_with(|| Box::new(TypedStore::<T>::new(type_name)));
        let store = store.as_any_mut().downcast_mut::<TypedStore<T>>()?;

        let owner = EntityId::from_index(index);
        let key = store.insert(owner, component);
        self.entities[index].components.push(ComponentAttachment {
            type_id,
            type_name,
            key,
        });
        Some(key)
    }

    /// Get a component by type
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        let key = self.component_key::<T>(entity)?;
        self.typed_store::<T>()?.get(key).map(|entry| &entry.data)
    }

    /// Get a mutable component by type
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        let key = self.component_key::<T>(entity)?;
        self.typed_store_mut::<T>()?
            .get_mut(key)
            .map(|entry| &mut entry.data)
    }

    /// Whether an entity holds a component of type `T`
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        self.component_key::<T>(entity).is_some()
    }

    /// Store key of an entity's `T` component
    pub fn component_key<T: Component>(&self, entity: EntityId) -> Option<ComponentKey> {
        let index = self.resolve(entity)?;
        let type_id = TypeId::of::<T>();
        self.entities[index]
            .components
            .iter()
            .find(|attachment| attachment.type_id == type_id)
            .map(|attachment| attachment.key)
    }

    /// Owner of a component key, `None` when the key is stale
    pub fn component_owner<T: Component>(&self, key: ComponentKey) -> Option<EntityId> {
        self.typed_store::<T>()?.get(key).map(|entry| entry.owner)
    }

    /// Destroy an entity's `T` component
    pub fn destroy_component<T: Component>(
        &mut self,
        entity: EntityId,
        physics: &mut dyn PhysicsEngine3d,
    ) -> bool {
        let Some(index) = self.resolve(entity) else {
            log::warn!("destroy_component: {entity} does not exist");
            return false;
        };
        self.destroy_component_by_type_id(index, TypeId::of::<T>(), physics)
    }

    /// Queue destruction of an entity's `T` component for the end of the
    /// current phase
    pub fn queue_destroy_component<T: Component>(&mut self, entity: EntityId) {
        match self.resolve(entity) {
            Some(index) => self
                .pending_component_destroys
                .push((EntityId::from_index(index), TypeId::of::<T>())),
            None => log::warn!("queue_destroy_component: {entity} does not exist"),
        }
    }

    /// Number of components attached to an entity
    pub fn components_len(&self, entity: EntityId) -> usize {
        match self.resolve(entity) {
            Some(index) => self.entities[index].components.len(),
            None => 0,
        }
    }

    /// Reflected view of an entity's component by attachment position
    ///
    /// Positions shift when a component is destroyed; callers re-fetch
    /// after any mutation.
    pub fn component_by_index(&self, entity: EntityId, index: usize) -> Option<&dyn Reflect> {
        let attachment = *self.attachment(entity, index)?;
        self.stores.get(&attachment.type_id)?.reflect(attachment.key)
    }

    /// Mutable reflected view of an entity's component by attachment position
    pub fn component_by_index_mut(
        &mut self,
        entity: EntityId,
        index: usize,
    ) -> Option<&mut dyn Reflect> {
        let attachment = *self.attachment(entity, index)?;
        self.stores
            .get_mut(&attachment.type_id)?
            .reflect_mut(attachment.key)
    }

    /// Type name of an entity's component by attachment position
    pub fn component_type_name_by_index(
        &self,
        entity: EntityId,
        index: usize,
    ) -> Option<&'static str> {
        self.attachment(entity, index)
            .map(|attachment| attachment.type_name)
    }

    /// Destroy an entity's component by attachment position
    pub fn destroy_component_by_index(
        &mut self,
        entity: EntityId,
        index: usize,
        physics: &mut dyn PhysicsEngine3d,
    ) -> bool {
        let Some(entity_index) = self.resolve(entity) else {
            log::warn!("destroy_component_by_index: {entity} does not exist");
            return false;
        };
        let Some(attachment) = self.entities[entity_index].components.get(index) else {
            log::warn!("destroy_component_by_index: no component {index} on {entity}");
            return false;
        };
        let type_id = attachment.type_id;
        self.destroy_component_by_type_id(entity_index, type_id, physics)
    }

    /// Enabled flag of a component by attachment position
    pub fn component_enabled_by_index(&self, entity: EntityId, index: usize) -> Option<bool> {
        let attachment = self.attachment(entity, index)?;
        self.stores.get(&attachment.type_id)?.is_enabled(attachment.key)
    }

    /// Set the enabled flag of a component by attachment position
    pub fn set_component_enabled_by_index(
        &mut self,
        entity: EntityId,
        index: usize,
        enabled: bool,
    ) -> bool {
        let Some(attachment) = self.attachment(entity, index).copied() else {
            log::warn!("set_component_enabled_by_index: no component {index} on {entity}");
            return false;
        };
        match self.stores.get_mut(&attachment.type_id) {
            Some(store) => store.set_enabled(attachment.key, enabled),
            None => false,
        }
    }

    /// Enabled flag of an entity's `T` component
    pub fn is_component_enabled<T: Component>(&self, entity: EntityId) -> Option<bool> {
        let key = self.component_key::<T>(entity)?;
        self.typed_store::<T>()?.get(key).map(|entry| entry.enabled)
    }

    /// Set the enabled flag of an entity's `T` component
    ///
    /// A flag flip only; storage is never reallocated.
    pub fn set_component_enabled<T: Component>(&mut self, entity: EntityId, enabled: bool) -> bool {
        let Some(key) = self.component_key::<T>(entity) else {
            log::warn!("set_component_enabled: {entity} has no such component");
            return false;
        };
        match self.typed_store_mut::<T>() {
            Some(store) => match store.get_mut(key) {
                Some(entry) => {
                    entry.enabled = enabled;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Number of live components of type `T` across all scenes
    pub fn store_len<T: Component>(&self) -> usize {
        self.typed_store::<T>().map_or(0, |store| store.entries.len())
    }

    /// Iterate enabled `T` components of dispatchable entities
    ///
    /// Dispatchable means: entity is alive, enabled, and in the active
    /// scene; the component's own enabled flag is set.
    pub fn view<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.typed_store::<T>()
            .into_iter()
            .flat_map(|store| store.entries.values())
            .filter(move |entry| entry.enabled && self.is_dispatchable(entry.owner))
            .map(|entry| (entry.owner, &entry.data))
    }

    /// Mutably visit enabled `T` components of dispatchable entities
    ///
    /// Same filtering as [`World::view`]. Structural mutation from inside
    /// the closure must go through the `queue_destroy_*` operations.
    pub fn for_each_mut<T: Component>(&mut self, mut f: impl FnMut(EntityId, &mut T)) {
        let World {
            ref entities,
            ref mut stores,
            active_scene,
            ..
        } = *self;

        let Some(store) = stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<TypedStore<T>>())
        else {
            return;
        };

        for entry in store.entries.values_mut() {
            if !entry.enabled {
                continue;
            }
            let dispatchable = entry
                .owner
                .index()
                .and_then(|index| entities.get(index))
                .is_some_and(|record| {
                    record.alive && record.enabled && record.scene == active_scene
                });
            if dispatchable {
                f(entry.owner, &mut entry.data);
            }
        }
    }

    // ---- scene registry -----------------------------------------------

    /// Create a scene with a fresh synthetic root entity
    ///
    /// Returns [`SceneId::INVALID`] when the entity budget cannot cover
    /// the root record.
    pub fn create_scene(&mut self, name: &str, set_active: bool) -> SceneId {
        let scene_id = SceneId::from_index(self.scenes.len());
        let root = self.alloc_entity(SCENE_ROOT_NAME.to_string(), EntityId::INVALID, scene_id);
        if !root.is_valid() {
            log::error!("create_scene: could not allocate root entity for '{name}'");
            return SceneId::INVALID;
        }

        self.scenes.push(SceneRecord {
            name: name.to_string(),
            root,
            created: true,
        });
        if set_active {
            self.active_scene = scene_id;
        }
        scene_id
    }

    /// Make a scene the dispatch target
    ///
    /// The previously active scene keeps all of its data and is simply
    /// skipped by dispatch.
    pub fn set_active_scene(&mut self, id: SceneId) -> bool {
        match self.scene_index(id) {
            Some(_) => {
                self.active_scene = id;
                true
            }
            None => {
                log::warn!("set_active_scene: {id} does not exist");
                false
            }
        }
    }

    /// Currently active scene, [`SceneId::INVALID`] when none
    pub fn active_scene(&self) -> SceneId {
        self.active_scene
    }

    /// Name of the active scene
    pub fn active_scene_name(&self) -> Option<&str> {
        self.scene_name(self.active_scene)
    }

    /// Name of a scene
    pub fn scene_name(&self, id: SceneId) -> Option<&str> {
        self.scene_index(id)
            .map(|index| self.scenes[index].name.as_str())
    }

    /// Rename a scene
    pub fn set_scene_name(&mut self, id: SceneId, name: &str) -> bool {
        match self.scene_index(id) {
            Some(index) => {
                self.scenes[index].name = name.to_string();
                true
            }
            None => {
                log::warn!("set_scene_name: {id} does not exist");
                false
            }
        }
    }

    /// Root entity of a scene
    pub fn scene_root(&self, id: SceneId) -> EntityId {
        self.scene_index(id)
            .map_or(EntityId::INVALID, |index| self.scenes[index].root)
    }

    /// Root entity of the active scene
    pub fn root_entity(&self) -> EntityId {
        self.scene_root(self.active_scene)
    }

    /// Iterate live scenes as `(id, name)` in creation order
    pub fn scenes(&self) -> impl Iterator<Item = (SceneId, &str)> + '_ {
        self.scenes
            .iter()
            .enumerate()
            .filter(|(_, record)| record.created)
            .map(|(index, record)| (SceneId::from_index(index), record.name.as_str()))
    }

    /// Destroy a scene and its whole entity subtree
    pub fn destroy_scene(&mut self, id: SceneId, physics: &mut dyn PhysicsEngine3d) -> bool {
        let Some(index) = self.scene_index(id) else {
            log::warn!("destroy_scene: {id} does not exist");
            return false;
        };

        let root = self.scenes[index].root;
        if let Some(root_index) = root.index() {
            self.destroy_subtree(root_index, physics);
        }
        self.scenes[index].created = false;
        self.scenes[index].root = EntityId::INVALID;
        if self.active_scene == id {
            self.active_scene = SceneId::INVALID;
        }
        true
    }

    /// Reconstruct a scene from its loaded file representation
    ///
    /// Entities receive fresh ids; parent/child order is preserved as
    /// given. Component payloads are resolved through the metadata
    /// registry; unknown type names are skipped with a warning.
    pub fn load_scene(
        &mut self,
        loaded: &LoadedScene,
        set_active: bool,
        registry: &MetadataRegistry,
    ) -> SceneId {
        let scene = self.create_scene(&loaded.name, set_active);
        if !scene.is_valid() {
            return scene;
        }

        let root = self.scene_root(scene);
        for entity in &loaded.entities {
            self.load_entity(root, entity, registry);
        }
        scene
    }

    /// Export a scene to its file representation
    pub fn export_scene(&self, id: SceneId) -> Option<LoadedScene> {
        let index = self.scene_index(id)?;
        let root_index = self.scenes[index].root.index()?;

        Some(LoadedScene {
            name: self.scenes[index].name.clone(),
            entities: self.entities[root_index]
                .children
                .clone()
                .into_iter()
                .filter_map(|child| self.export_entity(child))
                .collect(),
        })
    }

    // ---- snapshots ----------------------------------------------------

    /// Capture a deep value-copy of the world's state
    pub fn create_reset_point(&self) -> ResetPoint {
        ResetPoint {
            entities: self.entities.clone(),
            name_index: self.name_index.clone(),
            stores: self
                .stores
                .iter()
                .map(|(type_id, store)| (*type_id, store.snapshot()))
                .collect(),
            scenes: self.scenes.clone(),
            active_scene: self.active_scene,
        }
    }

    /// Replace the world's state with a snapshot's contents
    ///
    /// Live components release their external resources first, then the
    /// snapshot is copied in and every restored component re-establishes
    /// its external resources. The reset point is not consumed; restoring
    /// the same point again reproduces the same state.
    pub fn restore_reset_point(
        &mut self,
        point: &ResetPoint,
        physics: &mut dyn PhysicsEngine3d,
    ) {
        for store in self.stores.values_mut() {
            store.release_external(physics);
        }

        self.entities = point.entities.clone();
        self.name_index = point.name_index.clone();
        self.stores = point
            .stores
            .iter()
            .map(|(type_id, store)| (*type_id, store.snapshot()))
            .collect();
        self.scenes = point.scenes.clone();
        self.active_scene = point.active_scene;
        self.pending_entity_destroys.clear();
        self.pending_component_destroys.clear();

        for store in self.stores.values_mut() {
            store.restore_external(physics);
        }
    }

    /// Apply all queued destructions
    ///
    /// Called by the scheduler at the end of every phase dispatch.
    pub fn flush_pending(&mut self, physics: &mut dyn PhysicsEngine3d) {
        let components = std::mem::take(&mut self.pending_component_destroys);
        for (entity, type_id) in components {
            if let Some(index) = self.resolve(entity) {
                self.destroy_component_by_type_id(index, type_id, physics);
            }
        }

        let entities = std::mem::take(&mut self.pending_entity_destroys);
        for entity in entities {
            if self.resolve(entity).is_some() {
                self.destroy_entity(entity, physics);
            }
        }
    }

    // ---- internals ----------------------------------------------------

    /// Resolve an id to a live record index
    ///
    /// [`EntityId::ROOT`] resolves to the active scene's root.
    fn resolve(&self, id: EntityId) -> Option<usize> {
        let id = if id == EntityId::ROOT {
            self.scene_root(self.active_scene)
        } else {
            id
        };
        let index = id.index()?;
        let record = self.entities.get(index)?;
        if record.alive {
            Some(index)
        } else {
            None
        }
    }

    fn scene_index(&self, id: SceneId) -> Option<usize> {
        let index = id.index()?;
        let record = self.scenes.get(index)?;
        if record.created {
            Some(index)
        } else {
            None
        }
    }

    fn is_dispatchable(&self, id: EntityId) -> bool {
        id.index()
            .and_then(|index| self.entities.get(index))
            .is_some_and(|record| {
                record.alive && record.enabled && record.scene == self.active_scene
            })
    }

    fn alloc_entity(&mut self, name: String, parent: EntityId, scene: SceneId) -> EntityId {
        if self.entities.len() >= self.config.max_entities {
            log::error!(
                "entity budget exhausted ({} records); '{name}' not created",
                self.config.max_entities
            );
            return EntityId::INVALID;
        }

        let id = EntityId::from_index(self.entities.len());
        self.entities.push(EntityRecord::new(name.clone(), parent, scene));
        self.name_index.insert(name, id);
        id
    }

    fn attachment(&self, entity: EntityId, index: usize) -> Option<&ComponentAttachment> {
        let entity_index = self.resolve(entity)?;
        self.entities[entity_index].components.get(index)
    }

    fn destroy_component_by_type_id(
        &mut self,
        entity_index: usize,
        type_id: TypeId,
        physics: &mut dyn PhysicsEngine3d,
    ) -> bool {
        let Some(position) = self.entities[entity_index]
            .components
            .iter()
            .position(|attachment| attachment.type_id == type_id)
        else {
            log::warn!(
                "destroy_component: entity '{}' has no such component",
                self.entities[entity_index].name
            );
            return false;
        };

        let attachment = self.entities[entity_index].components.remove(position);
        match self.stores.get_mut(&attachment.type_id) {
            Some(store) => store.destroy(attachment.key, physics),
            None => false,
        }
    }

    /// Destroy a record and all of its descendants; the caller detaches
    /// the subtree root from its parent
    fn destroy_subtree(&mut self, index: usize, physics: &mut dyn PhysicsEngine3d) {
        let children = std::mem::take(&mut self.entities[index].children);
        for child in children {
            if let Some(child_index) = child.index() {
                if self.entities[child_index].alive {
                    self.destroy_subtree(child_index, physics);
                }
            }
        }

        let attachments = std::mem::take(&mut self.entities[index].components);
        for attachment in attachments.iter().rev() {
            if let Some(store) = self.stores.get_mut(&attachment.type_id) {
                store.destroy(attachment.key, physics);
            }
        }

        let id = EntityId::from_index(index);
        let record = &mut self.entities[index];
        record.alive = false;
        record.enabled = false;
        record.parent = EntityId::INVALID;
        let name = std::mem::take(&mut record.name);
        if self.name_index.get(&name) == Some(&id) {
            self.name_index.remove(&name);
        }
    }

    fn load_entity(&mut self, parent: EntityId, loaded: &LoadedEntity, registry: &MetadataRegistry) {
        let id = self.create_entity(parent, &loaded.name);
        if !id.is_valid() {
            return;
        }
        self.set_entity_enabled(id, loaded.enabled);

        for component in &loaded.components {
            let Some(info) = registry.component_by_name(&component.type_name) else {
                log::warn!(
                    "load_scene: unknown component type '{}' on entity '{}'",
                    component.type_name,
                    loaded.name
                );
                continue;
            };
            if info.spawn_default(self, id).is_none() {
                continue;
            }

            let position = self.components_len(id) - 1;
            for (field, value) in &component.fields {
                let applied = self
                    .component_by_index_mut(id, position)
                    .is_some_and(|reflect| reflect.set_field(field, value.clone()));
                if !applied {
                    log::warn!(
                        "load_scene: field '{field}' rejected by component '{}'",
                        component.type_name
                    );
                }
            }
            if !component.enabled {
                self.set_component_enabled_by_index(id, position, false);
            }
        }

        for child in &loaded.children {
            self.load_entity(id, child, registry);
        }
    }

    fn export_entity(&self, id: EntityId) -> Option<LoadedEntity> {
        let index = self.resolve(id)?;
        let record = &self.entities[index];

        Some(LoadedEntity {
            name: record.name.clone(),
            enabled: record.enabled,
            components: record
                .components
                .iter()
                .filter_map(|attachment| {
                    let store = self.stores.get(&attachment.type_id)?;
                    let reflect = store.reflect(attachment.key)?;
                    Some(LoadedComponent {
                        type_name: attachment.type_name.to_string(),
                        enabled: store.is_enabled(attachment.key).unwrap_or(true),
                        fields: reflect
                            .fields()
                            .iter()
                            .filter_map(|field| {
                                reflect.field(field.name).map(|value| (field.name.to_string(), value))
                            })
                            .collect(),
                    })
                })
                .collect(),
            children: record
                .children
                .iter()
                .filter_map(|child| self.export_entity(*child))
                .collect(),
        })
    }

    fn typed_store<T: Component>(&self) -> Option<&TypedStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|store| store.as_any().downcast_ref())
    }

    fn typed_store_mut<T: Component>(&mut self) -> Option<&mut TypedStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Transform3dComponent;
    use crate::ecs::test_support::Health;
    use crate::physics::HeadlessPhysics;

    fn world_with_scene() -> World {
        let mut world = World::default();
        world.create_scene("Main", true);
        world
    }

    #[test]
    fn test_create_entity_under_root() {
        let mut world = world_with_scene();
        let entity = world.create_entity(EntityId::ROOT, "Player");

        assert!(entity.is_valid());
        assert!(world.entity_exists(entity));
        assert_eq!(world.parent_of(entity), world.root_entity());
        assert_eq!(world.children_of(world.root_entity()), &[entity]);
    }

    #[test]
    fn test_create_entity_with_dead_parent_fails() {
        let mut world = world_with_scene();
        let mut physics = HeadlessPhysics::default();
        let parent = world.create_entity(EntityId::ROOT, "Parent");
        world.destroy_entity(parent, &mut physics);

        let child = world.create_entity(parent, "Child");
        assert_eq!(child, EntityId::INVALID);
    }

    #[test]
    fn test_create_entity_without_active_scene_fails() {
        let mut world = World::default();
        let entity = world.create_entity(EntityId::ROOT, "Orphan");
        assert_eq!(entity, EntityId::INVALID);
    }

    #[test]
    fn test_entity_budget_exhaustion() {
        let mut world = World::new(WorldConfig { max_entities: 2 });
        world.create_scene("Main", true); // root consumes one record
        let first = world.create_entity(EntityId::ROOT, "A");
        let second = world.create_entity(EntityId::ROOT, "B");

        assert!(first.is_valid());
        assert_eq!(second, EntityId::INVALID);
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn test_destroy_entity_recursive() {
        let mut world = world_with_scene();
        let mut physics = HeadlessPhysics::default();

        let e1 = world.create_entity(EntityId::ROOT, "e1");
        let e2 = world.create_entity(e1, "e2");
        world.create_component(e2, Health::default());

        assert!(world.destroy_entity(e1, &mut physics));
        assert!(!world.entity_exists(e1));
        assert!(!world.entity_exists(e2));
        assert_eq!(world.children_of(world.root_entity()).len(), 0);
        assert_eq!(world.store_len::<Health>(), 0);
    }

    #[test]
    fn test_destroyed_ids_are_retired() {
        let mut world = world_with_scene();
        let mut physics = HeadlessPhysics::default();

        let first = world.create_entity(EntityId::ROOT, "First");
        world.destroy_entity(first, &mut physics);
        let second = world.create_entity(EntityId::ROOT, "Second");

        assert_ne!(first, second);
        assert!(!world.entity_exists(first));
        assert!(world.entity_exists(second));
    }

    #[test]
    fn test_rename_updates_name_lookup_atomically() {
        let mut world = world_with_scene();
        let entity = world.create_entity(EntityId::ROOT, "OldName");

        assert!(world.set_entity_name(entity, "NewName"));
        assert_eq!(world.entity_by_name("NewName"), entity);
        assert_eq!(world.entity_by_name("OldName"), EntityId::INVALID);
        assert_eq!(world.entity_name(entity), Some("NewName"));
        assert!(world.entity_exists(entity));
    }

    #[test]
    fn test_duplicate_component_rejected() {
        let mut world = world_with_scene();
        let entity = world.create_entity(EntityId::ROOT, "Player");

        let first = world.create_component(entity, Health::new(75.0, 100.0));
        assert!(first.is_some());

        let second = world.create_component(entity, Health::new(1.0, 1.0));
        assert!(second.is_none());

        // Original instance untouched
        let health = world.get_component::<Health>(entity).unwrap();
        assert_eq!(health.current, 75.0);
        assert_eq!(health.max, 100.0);
    }

    #[test]
    fn test_create_then_get_returns_default() {
        let mut world = world_with_scene();
        let entity = world.create_entity(EntityId::ROOT, "Player");
        world.create_component(entity, Health::default());

        assert_eq!(
            world.get_component::<Health>(entity),
            Some(&Health::default())
        );
    }

    #[test]
    fn test_component_key_goes_stale_after_destroy() {
        let mut world = world_with_scene();
        let mut physics = HeadlessPhysics::default();

        let a = world.create_entity(EntityId::ROOT, "A");
        let b = world.create_entity(EntityId::ROOT, "B");
        let key_a = world.create_component(a, Health::default()).unwrap();
        world.create_component(b, Health::default());

        assert_eq!(world.component_owner::<Health>(key_a), Some(a));
        world.destroy_component::<Health>(a, &mut physics);

        // The store compacted, but the old key does not alias B's component.
        assert_eq!(world.component_owner::<Health>(key_a), None);
        assert_eq!(world.store_len::<Health>(), 1);
    }

    #[test]
    fn test_component_by_index_access() {
        let mut world = world_with_scene();
        let mut physics = HeadlessPhysics::default();

        let entity = world.create_entity(EntityId::ROOT, "Player");
        world.create_component(entity, Transform3dComponent::default());
        world.create_component(entity, Health::default());

        assert_eq!(world.components_len(entity), 2);
        assert_eq!(
            world.component_type_name_by_index(entity, 0),
            Some("Transform3d")
        );
        assert_eq!(world.component_type_name_by_index(entity, 1), Some("Health"));

        assert!(world.destroy_component_by_index(entity, 0, &mut physics));
        // Positions shift; callers re-fetch after mutation.
        assert_eq!(world.components_len(entity), 1);
        assert_eq!(world.component_type_name_by_index(entity, 0), Some("Health"));
    }

    #[test]
    fn test_component_enable_disable() {
        let mut world = world_with_scene();
        let entity = world.create_entity(EntityId::ROOT, "Player");
        world.create_component(entity, Health::default());

        assert_eq!(world.is_component_enabled::<Health>(entity), Some(true));
        assert!(world.set_component_enabled::<Health>(entity, false));
        assert_eq!(world.is_component_enabled::<Health>(entity), Some(false));

        // Disabled components are skipped by iteration ...
        assert_eq!(world.view::<Health>().count(), 0);
        // ... but the entity itself stays enabled and visible.
        assert!(world.is_entity_enabled(entity));
        world.create_component(entity, Transform3dComponent::default());
        assert_eq!(world.view::<Transform3dComponent>().count(), 1);
    }

    #[test]
    fn test_view_skips_disabled_entities_and_inactive_scenes() {
        let mut world = world_with_scene();
        let a = world.create_entity(EntityId::ROOT, "A");
        world.create_component(a, Health::default());

        let other = world.create_scene("Other", false);
        let other_root = world.scene_root(other);
        let b = world.create_entity(other_root, "B");
        world.create_component(b, Health::default());

        assert_eq!(world.view::<Health>().count(), 1);

        world.set_entity_enabled(a, false);
        assert_eq!(world.view::<Health>().count(), 0);

        world.set_active_scene(other);
        assert_eq!(world.view::<Health>().count(), 1);
    }

    #[test]
    fn test_scene_switching_preserves_inactive_scene() {
        let mut world = World::default();
        let first = world.create_scene("First", true);
        let a = world.create_entity(EntityId::ROOT, "A");

        let second = world.create_scene("Second", false);
        assert!(world.set_active_scene(second));
        assert_eq!(world.active_scene(), second);

        // Entity of the inactive scene still exists by id.
        assert!(world.entity_exists(a));
        assert!(world.set_active_scene(first));
        assert_eq!(world.active_scene_name(), Some("First"));
    }

    #[test]
    fn test_destroy_scene() {
        let mut world = World::default();
        let mut physics = HeadlessPhysics::default();

        let scene = world.create_scene("Doomed", true);
        let entity = world.create_entity(EntityId::ROOT, "A");

        assert!(world.destroy_scene(scene, &mut physics));
        assert!(!world.entity_exists(entity));
        assert_eq!(world.active_scene(), SceneId::INVALID);
        assert_eq!(world.scenes().count(), 0);
    }

    #[test]
    fn test_reparent_entity_rejects_cycles() {
        let mut world = world_with_scene();
        let parent = world.create_entity(EntityId::ROOT, "Parent");
        let child = world.create_entity(parent, "Child");

        assert!(!world.reparent_entity(parent, child));
        assert!(world.reparent_entity(child, EntityId::ROOT));
        assert_eq!(world.parent_of(child), world.root_entity());
        assert_eq!(world.children_of(parent).len(), 0);
    }

    #[test]
    fn test_reset_point_roundtrip() {
        let mut world = world_with_scene();
        let mut physics = HeadlessPhysics::default();

        let parent = world.create_entity(EntityId::ROOT, "Parent");
        let child = world.create_entity(parent, "Child");
        world.create_component(child, Health::new(50.0, 100.0));

        let point = world.create_reset_point();

        // Mutate heavily: rename, destroy, create, edit fields.
        world.set_entity_name(parent, "Renamed");
        world.destroy_entity(child, &mut physics);
        let extra = world.create_entity(EntityId::ROOT, "Extra");
        world.create_component(extra, Health::default());

        world.restore_reset_point(&point, &mut physics);

        assert_eq!(world.entity_count(), 3); // root + parent + child
        assert!(!world.entity_exists(extra));
        assert_eq!(world.entity_name(parent), Some("Parent"));
        assert_eq!(world.entity_by_name("Parent"), parent);
        assert_eq!(world.parent_of(child), parent);
        assert_eq!(
            world.get_component::<Health>(child),
            Some(&Health::new(50.0, 100.0))
        );
    }

    #[test]
    fn test_reset_point_restore_is_repeatable() {
        let mut world = world_with_scene();
        let mut physics = HeadlessPhysics::default();
        let entity = world.create_entity(EntityId::ROOT, "Keep");
        let point = world.create_reset_point();

        world.destroy_entity(entity, &mut physics);
        world.restore_reset_point(&point, &mut physics);
        assert!(world.entity_exists(entity));

        world.destroy_entity(entity, &mut physics);
        world.restore_reset_point(&point, &mut physics);
        assert!(world.entity_exists(entity));
    }

    #[test]
    fn test_queued_destroys_apply_on_flush() {
        let mut world = world_with_scene();
        let mut physics = HeadlessPhysics::default();

        let entity = world.create_entity(EntityId::ROOT, "Doomed");
        world.create_component(entity, Health::default());
        world.queue_destroy_entity(entity);

        // Nothing happens until the scheduler flushes.
        assert!(world.entity_exists(entity));

        world.flush_pending(&mut physics);
        assert!(!world.entity_exists(entity));
        assert_eq!(world.store_len::<Health>(), 0);
    }

    #[test]
    fn test_shared_name_survives_other_entry_destroy() {
        // Destroying an entity removes its name from the index only if the
        // index still points at it.
        let mut world = world_with_scene();
        let mut physics = HeadlessPhysics::default();

        let first = world.create_entity(EntityId::ROOT, "Shared");
        let second = world.create_entity(EntityId::ROOT, "Shared");
        world.destroy_entity(first, &mut physics);

        assert_eq!(world.entity_by_name("Shared"), second);
    }
}
