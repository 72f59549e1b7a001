//! Rigid body component coupling an entity to the physics engine
//!
//! The handle inside this component is owned by the physics engine. The
//! component carries the callback obligation for it: destruction removes
//! the body, and a snapshot restore recreates it instead of copying the
//! raw handle back to life.

use crate::ecs::component::Component;
use crate::metadata::{FieldInfo, FieldKind, FieldValue, Reflect};
use crate::physics::{BodyHandle, PhysicsEngine3d, RigidBodyDesc};

/// Physics rigid body attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyComponent {
    /// Body construction parameters
    pub desc: RigidBodyDesc,

    /// Live handle, `None` until the body sync system creates the body
    pub(crate) body: Option<BodyHandle>,
}

impl Default for RigidBodyComponent {
    fn default() -> Self {
        Self::new(RigidBodyDesc::default())
    }
}

impl RigidBodyComponent {
    /// Create a body component from construction parameters
    pub fn new(desc: RigidBodyDesc) -> Self {
        Self { desc, body: None }
    }

    /// Handle of the live body, if one has been created
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }
}

const RIGID_BODY_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("mass", FieldKind::F32),
    FieldInfo::new("gravity_scale", FieldKind::F32),
    FieldInfo::new("kinematic", FieldKind::Bool),
];

impl Reflect for RigidBodyComponent {
    fn type_name(&self) -> &'static str {
        "RigidBody"
    }

    fn fields(&self) -> &'static [FieldInfo] {
        RIGID_BODY_FIELDS
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "mass" => Some(FieldValue::F32(self.desc.mass)),
            "gravity_scale" => Some(FieldValue::F32(self.desc.gravity_scale)),
            "kinematic" => Some(FieldValue::Bool(self.desc.kinematic)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("mass", FieldValue::F32(mass)) => {
                self.desc.mass = mass;
                true
            }
            ("gravity_scale", FieldValue::F32(scale)) => {
                self.desc.gravity_scale = scale;
                true
            }
            ("kinematic", FieldValue::Bool(kinematic)) => {
                self.desc.kinematic = kinematic;
                true
            }
            _ => false,
        }
    }
}

impl Component for RigidBodyComponent {
    fn on_destroy(&mut self, physics: &mut dyn PhysicsEngine3d) {
        if let Some(handle) = self.body.take() {
            physics.destroy_body(handle);
        }
    }

    fn on_restore(&mut self, physics: &mut dyn PhysicsEngine3d) {
        // The snapshotted handle belongs to a body that no longer exists;
        // recreate the body rather than adopting the stale handle.
        if self.body.take().is_some() {
            self.body = Some(physics.create_body(&self.desc));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::HeadlessPhysics;

    #[test]
    fn test_on_destroy_releases_body() {
        let mut physics = HeadlessPhysics::default();
        let mut component = RigidBodyComponent::default();
        component.body = Some(physics.create_body(&component.desc));

        component.on_destroy(&mut physics);
        assert_eq!(component.body(), None);
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_on_restore_recreates_rather_than_copies() {
        let mut physics = HeadlessPhysics::default();
        let mut component = RigidBodyComponent::default();
        let original = physics.create_body(&component.desc);
        component.body = Some(original);

        // Simulate the play session tearing the body down.
        physics.destroy_body(original);

        component.on_restore(&mut physics);
        let restored = component.body().unwrap();
        assert_ne!(restored, original);
        assert!(physics.body_exists(restored));
    }

    #[test]
    fn test_on_restore_without_body_is_a_no_op() {
        let mut physics = HeadlessPhysics::default();
        let mut component = RigidBodyComponent::default();

        component.on_restore(&mut physics);
        assert_eq!(component.body(), None);
        assert_eq!(physics.body_count(), 0);
    }
}
