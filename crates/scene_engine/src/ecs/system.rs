//! System trait and lifecycle phases

use super::world::World;
use crate::physics::PhysicsEngine3d;
use bitflags::bitflags;

bitflags! {
    /// Set of lifecycle phases a system participates in
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PhaseMask: u8 {
        /// Input processing, entity lifecycle management
        const PRE_UPDATE = 1 << 0;
        /// Game logic
        const UPDATE = 1 << 1;
        /// Animation, transform hierarchy updates
        const POST_UPDATE = 1 << 2;
        /// Pushing component state into the physics engine
        const PRE_PHYSICS = 1 << 3;
        /// Reading simulation results back into components
        const POST_PHYSICS = 1 << 4;
        /// Visibility and render-queue preparation
        const PRE_RENDER = 1 << 5;
        /// Render command generation
        const RENDER = 1 << 6;
        /// Post-frame cleanup
        const POST_RENDER = 1 << 7;
    }
}

/// One named point in the frame at which systems may run
///
/// The external driver calls the scheduler's phases strictly in this
/// order, with the physics step between PrePhysics and PostPhysics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Input processing, entity lifecycle management
    PreUpdate,
    /// Game logic
    Update,
    /// Animation, transform hierarchy updates
    PostUpdate,
    /// Pushing component state into the physics engine
    PrePhysics,
    /// Reading simulation results back into components
    PostPhysics,
    /// Visibility and render-queue preparation
    PreRender,
    /// Render command generation
    Render,
    /// Post-frame cleanup
    PostRender,
}

impl Phase {
    /// Mask bit for this phase
    pub fn mask(self) -> PhaseMask {
        match self {
            Self::PreUpdate => PhaseMask::PRE_UPDATE,
            Self::Update => PhaseMask::UPDATE,
            Self::PostUpdate => PhaseMask::POST_UPDATE,
            Self::PrePhysics => PhaseMask::PRE_PHYSICS,
            Self::PostPhysics => PhaseMask::POST_PHYSICS,
            Self::PreRender => PhaseMask::PRE_RENDER,
            Self::Render => PhaseMask::RENDER,
            Self::PostRender => PhaseMask::POST_RENDER,
        }
    }
}

/// Per-type logic unit invoked during scheduled phases
///
/// Systems are instantiated once per runtime, never per entity. A system's
/// own errors are programming errors: the scheduler never catches panics
/// and never auto-disables a system.
pub trait System: 'static {
    /// Phases this system participates in
    fn phases(&self) -> PhaseMask;

    /// Whether this system must also run for unfocused/background runtimes
    ///
    /// Housekeeping systems (hierarchy propagation) return `true` so that
    /// background runtimes do not stall with stale state.
    fn always_required(&self) -> bool {
        false
    }

    /// Run the system for one phase dispatch
    fn run(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d, dt: f32);
}
