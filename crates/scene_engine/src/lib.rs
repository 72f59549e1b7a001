//! # Scene Engine
//!
//! A scene-graph-aware Entity-Component-System runtime for a game engine
//! and its editor.
//!
//! ## Features
//!
//! - **Entity hierarchy**: named, enableable entities in per-scene trees
//! - **Typed components**: dense per-type stores with generation-counted
//!   keys and reflected field access for editor tooling
//! - **Phased systems**: insertion-ordered dispatch across the fixed
//!   frame phases (PreUpdate through PostRender)
//! - **Scenes**: multiple coexisting scenes, one active dispatch target
//! - **Play sessions**: snapshot on play, restore on stop - simulation is
//!   fully undoable in the editor
//! - **External collaborators**: physics, renderer, and reflection data
//!   are consumed through narrow interfaces, never owned by the core
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let runtime = engine.active_runtime_mut();
//!         runtime.world.create_scene("Main", true);
//!         let player = runtime.world.create_entity(EntityId::ROOT, "Player");
//!         runtime
//!             .world
//!             .create_component(player, Transform3dComponent::default());
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         if engine.delta_time() > 1.0 {
//!             engine.quit();
//!         }
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let mut app = MyApp;
//!     Engine::run(config, &mut app)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod ecs;
pub mod foundation;
pub mod metadata;
pub mod physics;
pub mod scene_file;

mod application;
mod config;
mod engine;

pub use application::{AppError, Application};
pub use config::{Config, ConfigError, EngineConfig, PhysicsConfig};
pub use engine::{Engine, EngineError, Runtime, RuntimeHandle, MAIN_RUNTIME};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        application::{AppError, Application},
        config::{Config, EngineConfig},
        ecs::{
            components::{RigidBodyComponent, Transform2dComponent, Transform3dComponent},
            Component, ComponentKey, EntityId, Phase, PhaseMask, PlaySession, PlayState,
            ResetPoint, SceneId, System, SystemScheduler, World, WorldConfig,
        },
        engine::{Engine, EngineError, Runtime, RuntimeHandle},
        foundation::math::{Quat, Transform2d, Transform3d, Vec2, Vec3},
        metadata::{FieldInfo, FieldKind, FieldValue, MetadataRegistry, Reflect},
        physics::{BodyHandle, HeadlessPhysics, PhysicsEngine3d, RigidBodyDesc},
        scene_file::{LoadedComponent, LoadedEntity, LoadedScene},
    };
}
