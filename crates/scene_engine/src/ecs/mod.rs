//! Entity-Component-System implementation
//!
//! The runtime underlying both the engine and the editor: a
//! scene-graph-aware [`World`] storing reflectable component data per
//! entity, a [`SystemScheduler`] dispatching typed systems over that data
//! once per phase per frame, and a [`PlaySession`] that snapshots and
//! restores the world around editor play sessions.

pub mod component;
pub mod components;
pub mod entity;
pub mod play;
pub mod scene;
pub mod scheduler;
pub mod snapshot;
pub mod system;
pub mod systems;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests;

pub use component::{Component, ComponentKey};
pub use entity::EntityId;
pub use play::{PlaySession, PlayState};
pub use scene::SceneId;
pub use scheduler::{SystemScheduler, SystemView};
pub use snapshot::ResetPoint;
pub use system::{Phase, PhaseMask, System};
pub use world::{World, WorldConfig, SCENE_ROOT_NAME};
