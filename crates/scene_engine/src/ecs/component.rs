//! Component trait and per-type storage
//!
//! Each component type lives in its own dense, insertion-ordered store
//! backed by a [`DenseSlotMap`]. Keys are generation-counted, so an index
//! held across a destroy-and-compact is detectably stale instead of
//! silently pointing at a different component.

use super::entity::EntityId;
use crate::metadata::Reflect;
use crate::physics::PhysicsEngine3d;
use slotmap::{new_key_type, DenseSlotMap};
use std::any::{Any, TypeId};

new_key_type! {
    /// Generation-counted key into a per-type component store
    pub struct ComponentKey;
}

/// Typed data payload attached to exactly one entity
///
/// Components are plain reflectable data. Types that embed handles to
/// external engine resources override the lifecycle hooks: `on_destroy`
/// releases the resource, and `on_restore` recreates it after a snapshot
/// restore (raw handles are owned by the collaborator and must never be
/// copied back to life).
pub trait Component: Reflect + Clone + Send + Sync + 'static {
    /// Release external resources owned by this component
    fn on_destroy(&mut self, _physics: &mut dyn PhysicsEngine3d) {}

    /// Recreate external resources after a snapshot restore
    fn on_restore(&mut self, _physics: &mut dyn PhysicsEngine3d) {}
}

/// One stored component with its bookkeeping flags
#[derive(Debug, Clone)]
pub(crate) struct ComponentEntry<T> {
    pub owner: EntityId,
    pub enabled: bool,
    pub data: T,
}

/// Object-safe face of a typed component store
///
/// The world keeps stores behind this trait; typed access downcasts via
/// [`AnyComponentStore::as_any`].
pub(crate) trait AnyComponentStore {
    fn type_id(&self) -> TypeId;
    fn type_name(&self) -> &'static str;
    fn len(&self) -> usize;
    fn owner(&self, key: ComponentKey) -> Option<EntityId>;
    fn is_enabled(&self, key: ComponentKey) -> Option<bool>;
    fn set_enabled(&mut self, key: ComponentKey, enabled: bool) -> bool;
    fn reflect(&self, key: ComponentKey) -> Option<&dyn Reflect>;
    fn reflect_mut(&mut self, key: ComponentKey) -> Option<&mut dyn Reflect>;

    /// Destroy one component, running its `on_destroy` hook
    fn destroy(&mut self, key: ComponentKey, physics: &mut dyn PhysicsEngine3d) -> bool;

    /// Run `on_destroy` over every live entry without removing them
    ///
    /// Used before a snapshot restore replaces the live stores wholesale.
    fn release_external(&mut self, physics: &mut dyn PhysicsEngine3d);

    /// Run `on_restore` over every live entry
    fn restore_external(&mut self, physics: &mut dyn PhysicsEngine3d);

    /// Deep value-copy of this store
    fn snapshot(&self) -> Box<dyn AnyComponentStore>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense storage for all components of one type
pub(crate) struct TypedStore<T: Component> {
    pub entries: DenseSlotMap<ComponentKey, ComponentEntry<T>>,
    type_name: &'static str,
}

impl<T: Component> TypedStore<T> {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            entries: DenseSlotMap::with_key(),
            type_name,
        }
    }

    pub fn insert(&mut self, owner: EntityId, data: T) -> ComponentKey {
        self.entries.insert(ComponentEntry {
            owner,
            enabled: true,
            data,
        })
    }

    pub fn get(&self, key: ComponentKey) -> Option<&ComponentEntry<T>> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: ComponentKey) -> Option<&mut ComponentEntry<T>> {
        self.entries.get_mut(key)
    }
}

impl<T: Component> AnyComponentStore for TypedStore<T> {
    fn type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn owner(&self, key: ComponentKey) -> Option<EntityId> {
        self.entries.get(key).map(|entry| entry.owner)
    }

    fn is_enabled(&self, key: ComponentKey) -> Option<bool> {
        self.entries.get(key).map(|entry| entry.enabled)
    }

    fn set_enabled(&mut self, key: ComponentKey, enabled: bool) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    fn reflect(&self, key: ComponentKey) -> Option<&dyn Reflect> {
        self.entries.get(key).map(|entry| &entry.data as &dyn Reflect)
    }

    fn reflect_mut(&mut self, key: ComponentKey) -> Option<&mut dyn Reflect> {
        self.entries
            .get_mut(key)
            .map(|entry| &mut entry.data as &mut dyn Reflect)
    }

    fn destroy(&mut self, key: ComponentKey, physics: &mut dyn PhysicsEngine3d) -> bool {
        match self.entries.remove(key) {
            Some(mut entry) => {
                entry.data.on_destroy(physics);
                true
            }
            None => false,
        }
    }

    fn release_external(&mut self, physics: &mut dyn PhysicsEngine3d) {
        for (_, entry) in &mut self.entries {
            entry.data.on_destroy(physics);
        }
    }

    fn restore_external(&mut self, physics: &mut dyn PhysicsEngine3d) {
        for (_, entry) in &mut self.entries {
            entry.data.on_restore(physics);
        }
    }

    fn snapshot(&self) -> Box<dyn AnyComponentStore> {
        Box::new(Self {
            entries: self.entries.clone(),
            type_name: self.type_name,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
