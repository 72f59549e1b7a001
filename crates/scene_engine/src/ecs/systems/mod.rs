//! Built-in systems
//!
//! Registered by the runtime before any application systems so that
//! housekeeping (hierarchy propagation, body sync) runs first in its
//! phase.

pub mod physics_sync;
pub mod transform_hierarchy;

pub use physics_sync::PhysicsBodySyncSystem;
pub use transform_hierarchy::{TransformHierarchy2dSystem, TransformHierarchy3dSystem};
