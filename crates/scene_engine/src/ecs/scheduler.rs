//! System scheduling and per-frame dispatch
//!
//! The scheduler keeps systems in registration order and walks that order
//! once per phase entry point, invoking only enabled systems flagged for
//! the phase. Registration order is significant: hierarchy propagation is
//! registered before anything that reads world-space transforms in the
//! same phase.

use super::system::{Phase, PhaseMask, System};
use super::world::World;
use crate::metadata::MetadataRegistry;
use crate::physics::PhysicsEngine3d;
use std::any::TypeId;

/// Editor-facing view of one registered system
#[derive(Debug, Clone, Copy)]
pub struct SystemView<'a> {
    /// Registered type name
    pub name: &'a str,

    /// Whether the system currently dispatches
    pub enabled: bool,

    /// Phases the system participates in
    pub phases: PhaseMask,

    /// Whether the system runs for background runtimes
    pub required: bool,
}

struct SystemSlot {
    type_id: TypeId,
    name: &'static str,
    enabled: bool,
    phases: PhaseMask,
    required: bool,
    system: Box<dyn System>,
}

/// Ordered list of systems plus the per-phase dispatch entry points
#[derive(Default)]
pub struct SystemScheduler {
    systems: Vec<SystemSlot>,
}

impl SystemScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system instance, appended to the dispatch order
    ///
    /// One instance per type: a duplicate registration is rejected with a
    /// warning and the existing instance keeps its position.
    pub fn add_system<T: System>(&mut self, name: &'static str, system: T) -> bool {
        let type_id = TypeId::of::<T>();
        if self.systems.iter().any(|slot| slot.type_id == type_id) {
            log::warn!("add_system: system '{name}' is already registered");
            return false;
        }

        let phases = system.phases();
        let required = system.always_required();
        self.systems.push(SystemSlot {
            type_id,
            name,
            enabled: true,
            phases,
            required,
            system: Box::new(system),
        });
        true
    }

    /// Instantiate and register a system through the metadata registry
    ///
    /// Path taken by the editor's "Add System" dialog.
    pub fn create_system_by_name(&mut self, name: &str, registry: &MetadataRegistry) -> bool {
        let Some(info) = registry.system_by_name(name) else {
            log::warn!("create_system_by_name: unknown system type '{name}'");
            return false;
        };
        if self.systems.iter().any(|slot| slot.type_id == info.type_id) {
            log::warn!("create_system_by_name: system '{name}' is already registered");
            return false;
        }

        let system = info.create();
        let phases = system.phases();
        let required = system.always_required();
        self.systems.push(SystemSlot {
            type_id: info.type_id,
            name: info.name,
            enabled: true,
            phases,
            required,
            system,
        });
        true
    }

    /// Number of registered systems
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether no systems are registered
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Iterate registered systems in dispatch order
    pub fn systems(&self) -> impl Iterator<Item = SystemView<'_>> + '_ {
        self.systems.iter().map(|slot| SystemView {
            name: slot.name,
            enabled: slot.enabled,
            phases: slot.phases,
            required: slot.required,
        })
    }

    /// Set a system's enabled flag by type
    pub fn set_system_enabled<T: System>(&mut self, enabled: bool) -> bool {
        let type_id = TypeId::of::<T>();
        match self.systems.iter_mut().find(|slot| slot.type_id == type_id) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => {
                log::warn!("set_system_enabled: system type is not registered");
                false
            }
        }
    }

    /// Set a system's enabled flag by list position
    pub fn set_system_enabled_by_index(&mut self, index: usize, enabled: bool) -> bool {
        match self.systems.get_mut(index) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => {
                log::warn!("set_system_enabled_by_index: no system at {index}");
                false
            }
        }
    }

    /// Remove a system by list position
    ///
    /// Positions of later systems shift down; callers re-fetch after
    /// mutation.
    pub fn destroy_system_by_index(&mut self, index: usize) -> bool {
        if index < self.systems.len() {
            self.systems.remove(index);
            true
        } else {
            log::warn!("destroy_system_by_index: no system at {index}");
            false
        }
    }

    /// Dispatch one phase over the system list
    ///
    /// Queued structural destruction is flushed once the walk completes,
    /// so stores stay stable for every system in the phase.
    pub fn run_phase(
        &mut self,
        phase: Phase,
        world: &mut World,
        physics: &mut dyn PhysicsEngine3d,
        dt: f32,
    ) {
        let mask = phase.mask();
        for slot in &mut self.systems {
            if slot.enabled && slot.phases.intersects(mask) {
                slot.system.run(world, physics, dt);
            }
        }
        world.flush_pending(physics);
    }

    /// PreUpdate entry point
    pub fn pre_update(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d, dt: f32) {
        self.run_phase(Phase::PreUpdate, world, physics, dt);
    }

    /// Update entry point
    pub fn update(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d, dt: f32) {
        self.run_phase(Phase::Update, world, physics, dt);
    }

    /// PostUpdate entry point
    pub fn post_update(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d, dt: f32) {
        self.run_phase(Phase::PostUpdate, world, physics, dt);
    }

    /// PrePhysics entry point
    pub fn pre_physics(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d, dt: f32) {
        self.run_phase(Phase::PrePhysics, world, physics, dt);
    }

    /// PostPhysics entry point
    pub fn post_physics(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d, dt: f32) {
        self.run_phase(Phase::PostPhysics, world, physics, dt);
    }

    /// PreRender entry point
    pub fn pre_render(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d, dt: f32) {
        self.run_phase(Phase::PreRender, world, physics, dt);
    }

    /// Render entry point
    pub fn render(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d, dt: f32) {
        self.run_phase(Phase::Render, world, physics, dt);
    }

    /// PostRender entry point
    pub fn post_render(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d, dt: f32) {
        self.run_phase(Phase::PostRender, world, physics, dt);
    }

    /// Reduced dispatch for runtimes that are not the focused one
    ///
    /// Runs only systems marked always-required, once each, so background
    /// runtimes keep their housekeeping (hierarchy propagation) without
    /// paying for a full gameplay update.
    pub fn run_required_only(
        &mut self,
        world: &mut World,
        physics: &mut dyn PhysicsEngine3d,
        dt: f32,
    ) {
        for slot in &mut self.systems {
            if slot.enabled && slot.required {
                slot.system.run(world, physics, dt);
            }
        }
        world.flush_pending(physics);
    }
}
