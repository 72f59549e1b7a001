//! Rigid body creation sync
//!
//! Runs in PrePhysics and makes sure every enabled rigid body component in
//! the active scene has a live body before the external physics step.
//! Body creation happens only here; component creation never calls into
//! the physics engine.

use crate::ecs::components::RigidBodyComponent;
use crate::ecs::system::{PhaseMask, System};
use crate::ecs::world::World;
use crate::physics::PhysicsEngine3d;

/// Creates missing physics bodies for rigid body components
#[derive(Debug, Default)]
pub struct PhysicsBodySyncSystem;

impl System for PhysicsBodySyncSystem {
    fn phases(&self) -> PhaseMask {
        PhaseMask::PRE_PHYSICS
    }

    fn run(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d, _dt: f32) {
        world.for_each_mut::<RigidBodyComponent>(|entity, body| {
            let live = body.body.is_some_and(|handle| physics.body_exists(handle));
            if !live {
                body.body = Some(physics.create_body(&body.desc));
                log::debug!("created physics body for {entity}");
            }
        });
    }
}
