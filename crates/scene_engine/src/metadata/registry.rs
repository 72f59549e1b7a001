//! Type registry backing editor dropdowns and scene file loading
//!
//! Components and systems register here once at startup. Entries keep
//! registration order so editor listings are stable across runs.

use super::{FieldInfo, Reflect};
use crate::ecs::component::{Component, ComponentKey};
use crate::ecs::entity::EntityId;
use crate::ecs::system::System;
use crate::ecs::world::World;
use std::any::TypeId;
use std::collections::HashMap;

/// Registered metadata for one component type
pub struct ComponentInfo {
    /// Stable type name (matches [`Reflect::type_name`])
    pub name: &'static str,

    /// Rust type identifier
    pub type_id: TypeId,

    /// Field layout of the component
    pub fields: &'static [FieldInfo],

    spawn_default: fn(&mut World, EntityId) -> Option<ComponentKey>,
}

impl ComponentInfo {
    /// Attach a default-constructed instance of this component type
    ///
    /// Returns `None` under the same conditions as
    /// [`World::create_component`] (invalid entity, duplicate type).
    pub fn spawn_default(&self, world: &mut World, entity: EntityId) -> Option<ComponentKey> {
        (self.spawn_default)(world, entity)
    }
}

/// Registered metadata for one system type
pub struct SystemInfo {
    /// Stable type name
    pub name: &'static str,

    /// Rust type identifier
    pub type_id: TypeId,

    create: fn() -> Box<dyn System>,
}

impl SystemInfo {
    /// Instantiate this system type
    pub fn create(&self) -> Box<dyn System> {
        (self.create)()
    }
}

/// Registry of component and system types known to the runtime
#[derive(Default)]
pub struct MetadataRegistry {
    components: Vec<ComponentInfo>,
    component_by_name: HashMap<&'static str, usize>,
    component_by_type: HashMap<TypeId, usize>,
    systems: Vec<SystemInfo>,
    system_by_name: HashMap<&'static str, usize>,
}

fn spawn_default_component<T: Component + Default>(
    world: &mut World,
    entity: EntityId,
) -> Option<ComponentKey> {
    world.create_component(entity, T::default())
}

fn create_default_system<T: System + Default>() -> Box<dyn System> {
    Box::new(T::default())
}

impl MetadataRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Rust type identifier for a component or system type
    pub fn type_id_of<T: 'static>() -> TypeId {
        TypeId::of::<T>()
    }

    /// Register a component type
    ///
    /// Re-registering the same type is a logged no-op; the first
    /// registration wins so editor indices stay stable.
    pub fn register_component<T: Component + Default>(&mut self) {
        let probe = T::default();
        let name = probe.type_name();
        let type_id = TypeId::of::<T>();

        if self.component_by_type.contains_key(&type_id) {
            log::warn!("component type '{}' is already registered", name);
            return;
        }

        let index = self.components.len();
        self.components.push(ComponentInfo {
            name,
            type_id,
            fields: probe.fields(),
            spawn_default: spawn_default_component::<T>,
        });
        self.component_by_name.insert(name, index);
        self.component_by_type.insert(type_id, index);
    }

    /// Register a system type
    pub fn register_system<T: System + Default>(&mut self, name: &'static str) {
        let type_id = TypeId::of::<T>();
        if self.systems.iter().any(|info| info.type_id == type_id) {
            log::warn!("system type '{}' is already registered", name);
            return;
        }

        let index = self.systems.len();
        self.systems.push(SystemInfo {
            name,
            type_id,
            create: create_default_system::<T>,
        });
        self.system_by_name.insert(name, index);
    }

    /// All registered component types, in registration order
    pub fn components(&self) -> &[ComponentInfo] {
        &self.components
    }

    /// All registered system types, in registration order
    pub fn systems(&self) -> &[SystemInfo] {
        &self.systems
    }

    /// Look up component metadata by type name
    pub fn component_by_name(&self, name: &str) -> Option<&ComponentInfo> {
        self.component_by_name
            .get(name)
            .map(|&index| &self.components[index])
    }

    /// Look up component metadata by type identifier
    pub fn component_by_type(&self, type_id: TypeId) -> Option<&ComponentInfo> {
        self.component_by_type
            .get(&type_id)
            .map(|&index| &self.components[index])
    }

    /// Look up system metadata by type name
    pub fn system_by_name(&self, name: &str) -> Option<&SystemInfo> {
        self.system_by_name
            .get(name)
            .map(|&index| &self.systems[index])
    }
}
