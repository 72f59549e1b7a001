//! Physics engine collaborator interface
//!
//! The ECS core does not simulate physics. Components that embed physics
//! state (see [`RigidBodyComponent`](crate::ecs::components::RigidBodyComponent))
//! own the obligation to create and destroy bodies through this interface;
//! the external driver steps the simulation between the PrePhysics and
//! PostPhysics dispatch phases.

use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Generation-counted handle to a physics body
    ///
    /// Handles are owned by the physics engine; the ECS never persists
    /// them across a snapshot restore (bodies are recreated instead).
    pub struct BodyHandle;
}

/// Construction parameters for a rigid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    /// Body mass in kilograms
    pub mass: f32,

    /// Multiplier applied to global gravity for this body
    pub gravity_scale: f32,

    /// Kinematic bodies are moved by gameplay code, not the simulation
    pub kinematic: bool,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            mass: 1.0,
            gravity_scale: 1.0,
            kinematic: false,
        }
    }
}

/// Interface to the external 3D physics engine
pub trait PhysicsEngine3d {
    /// Create a body and return its handle
    fn create_body(&mut self, desc: &RigidBodyDesc) -> BodyHandle;

    /// Destroy a body; returns `false` for a stale or unknown handle
    fn destroy_body(&mut self, handle: BodyHandle) -> bool;

    /// Whether a handle still refers to a live body
    fn body_exists(&self, handle: BodyHandle) -> bool;

    /// Number of live bodies
    fn body_count(&self) -> usize;

    /// Advance the simulation by `dt` seconds
    fn step_simulation(&mut self, dt: f32);
}

/// Body bookkeeping without simulation
///
/// Backend used by the sandbox and tests: it hands out handles and tracks
/// body lifetime so the create/destroy/recreate contract can be observed,
/// but `step_simulation` only counts steps.
pub struct HeadlessPhysics {
    bodies: SlotMap<BodyHandle, RigidBodyDesc>,
    gravity: Vec3,
    steps: u64,
}

impl HeadlessPhysics {
    /// Create a backend with the given global gravity
    pub fn new(gravity: Vec3) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            gravity,
            steps: 0,
        }
    }

    /// Global gravity vector
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Number of simulation steps taken so far
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Default for HeadlessPhysics {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -9.81, 0.0))
    }
}

impl PhysicsEngine3d for HeadlessPhysics {
    fn create_body(&mut self, desc: &RigidBodyDesc) -> BodyHandle {
        self.bodies.insert(desc.clone())
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies.remove(handle).is_some()
    }

    fn body_exists(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn step_simulation(&mut self, _dt: f32) {
        self.steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_lifetime() {
        let mut physics = HeadlessPhysics::default();
        let handle = physics.create_body(&RigidBodyDesc::default());

        assert!(physics.body_exists(handle));
        assert_eq!(physics.body_count(), 1);

        assert!(physics.destroy_body(handle));
        assert!(!physics.body_exists(handle));
        assert_eq!(physics.body_count(), 0);

        // Stale handles stay dead
        assert!(!physics.destroy_body(handle));
    }

    #[test]
    fn test_stale_handle_not_revived_by_new_body() {
        let mut physics = HeadlessPhysics::default();
        let first = physics.create_body(&RigidBodyDesc::default());
        physics.destroy_body(first);

        let second = physics.create_body(&RigidBodyDesc::default());
        assert!(physics.body_exists(second));
        assert!(!physics.body_exists(first));
    }
}
