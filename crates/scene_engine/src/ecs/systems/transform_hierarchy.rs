//! Transform hierarchy propagation
//!
//! Recomputes world transforms top-down from the active scene root every
//! frame: `world = parent_world ∘ local`, with the root's world transform
//! equal to its local transform. A full recompute per frame keeps the pass
//! correct without dirty tracking.
//!
//! Both systems run in PostUpdate and must be registered before any
//! system that reads world transforms in that phase.

use crate::ecs::component::Component;
use crate::ecs::components::{Transform2dComponent, Transform3dComponent};
use crate::ecs::entity::EntityId;
use crate::ecs::system::{PhaseMask, System};
use crate::ecs::world::World;
use crate::foundation::math::{Transform2d, Transform3d};
use crate::physics::PhysicsEngine3d;

/// Propagates 3D transforms down the active scene's hierarchy
#[derive(Debug, Default)]
pub struct TransformHierarchy3dSystem;

impl System for TransformHierarchy3dSystem {
    fn phases(&self) -> PhaseMask {
        PhaseMask::POST_UPDATE
    }

    fn always_required(&self) -> bool {
        true
    }

    fn run(&mut self, world: &mut World, _physics: &mut dyn PhysicsEngine3d, _dt: f32) {
        let root = world.root_entity();
        if root == EntityId::INVALID {
            return;
        }
        propagate_3d(world, root, &Transform3d::identity());
    }
}

fn propagate_3d(world: &mut World, entity: EntityId, parent_world: &Transform3d) {
    if !world.is_entity_enabled(entity) {
        return;
    }

    let world_transform = if component_updatable::<Transform3dComponent>(world, entity) {
        match world.get_component_mut::<Transform3dComponent>(entity) {
            Some(transform) => {
                transform.world = parent_world.combine(&transform.local);
                transform.world.clone()
            }
            None => parent_world.clone(),
        }
    } else {
        // No transform (or a disabled one): children compose against the
        // nearest propagated ancestor transform.
        parent_world.clone()
    };

    for child in world.children_of(entity).to_vec() {
        propagate_3d(world, child, &world_transform);
    }
}

/// Propagates 2D transforms down the active scene's hierarchy
#[derive(Debug, Default)]
pub struct TransformHierarchy2dSystem;

impl System for TransformHierarchy2dSystem {
    fn phases(&self) -> PhaseMask {
        PhaseMask::POST_UPDATE
    }

    fn always_required(&self) -> bool {
        true
    }

    fn run(&mut self, world: &mut World, _physics: &mut dyn PhysicsEngine3d, _dt: f32) {
        let root = world.root_entity();
        if root == EntityId::INVALID {
            return;
        }
        propagate_2d(world, root, &Transform2d::identity());
    }
}

fn propagate_2d(world: &mut World, entity: EntityId, parent_world: &Transform2d) {
    if !world.is_entity_enabled(entity) {
        return;
    }

    let world_transform = if component_updatable::<Transform2dComponent>(world, entity) {
        match world.get_component_mut::<Transform2dComponent>(entity) {
            Some(transform) => {
                transform.world = parent_world.combine(&transform.local);
                transform.world.clone()
            }
            None => parent_world.clone(),
        }
    } else {
        parent_world.clone()
    };

    for child in world.children_of(entity).to_vec() {
        propagate_2d(world, child, &world_transform);
    }
}

fn component_updatable<T: Component>(world: &World, entity: EntityId) -> bool {
    world.is_component_enabled::<T>(entity) == Some(true)
}
