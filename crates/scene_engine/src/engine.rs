//! Core engine implementation
//!
//! [`Engine`] is the explicit context object owning every runtime; there
//! is no global state. Each [`Runtime`] bundles one ECS instance (world,
//! scheduler, play session, physics collaborator) and owns the fixed
//! per-frame phase order. The focused runtime gets a full frame; all
//! other runtimes only run their required systems so they never stall.

use crate::application::{AppError, Application};
use crate::config::{ConfigError, EngineConfig};
use crate::ecs::components::{RigidBodyComponent, Transform2dComponent, Transform3dComponent};
use crate::ecs::systems::{
    PhysicsBodySyncSystem, TransformHierarchy2dSystem, TransformHierarchy3dSystem,
};
use crate::ecs::{PlaySession, PlayState, SystemScheduler, World};
use crate::foundation::time::Timer;
use crate::metadata::MetadataRegistry;
use crate::physics::{HeadlessPhysics, PhysicsEngine3d};
use thiserror::Error;

/// Handle to a runtime owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeHandle(usize);

/// Handle of the runtime created by [`Engine::new`]
pub const MAIN_RUNTIME: RuntimeHandle = RuntimeHandle(0);

/// One ECS instance with its scheduler, play session, and physics
pub struct Runtime {
    /// Entity, component, and scene storage
    pub world: World,

    /// Ordered system list and dispatch entry points
    pub scheduler: SystemScheduler,

    /// Play/stop workflow state
    pub play: PlaySession,

    /// Component and system type registry
    pub registry: MetadataRegistry,

    physics: Box<dyn PhysicsEngine3d>,
}

impl Runtime {
    /// Create a runtime with the headless physics backend
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_physics(
            config,
            Box::new(HeadlessPhysics::new(config.physics.gravity)),
        )
    }

    /// Create a runtime with a caller-provided physics backend
    ///
    /// Built-in component and system types are registered up front, and
    /// the housekeeping systems are added first so they precede any
    /// application system in their phase.
    pub fn with_physics(config: &EngineConfig, physics: Box<dyn PhysicsEngine3d>) -> Self {
        let mut registry = MetadataRegistry::new();
        registry.register_component::<Transform3dComponent>();
        registry.register_component::<Transform2dComponent>();
        registry.register_component::<RigidBodyComponent>();
        registry.register_system::<TransformHierarchy3dSystem>("TransformHierarchy3d");
        registry.register_system::<TransformHierarchy2dSystem>("TransformHierarchy2d");
        registry.register_system::<PhysicsBodySyncSystem>("PhysicsBodySync");

        let mut scheduler = SystemScheduler::new();
        scheduler.add_system("TransformHierarchy3d", TransformHierarchy3dSystem);
        scheduler.add_system("TransformHierarchy2d", TransformHierarchy2dSystem);
        scheduler.add_system("PhysicsBodySync", PhysicsBodySyncSystem);

        Self {
            world: World::new(config.world.clone()),
            scheduler,
            play: PlaySession::new(),
            registry,
            physics,
        }
    }

    /// Run one full frame in the fixed phase order
    ///
    /// PreUpdate → Update → PostUpdate → PrePhysics → physics step →
    /// PostPhysics → PreRender → Render → PostRender. Gameplay phases are
    /// dispatched only while playing; in the editing and paused states the
    /// required systems still run so the scene stays coherent for render
    /// phases.
    pub fn frame(&mut self, dt: f32) {
        let Self {
            world,
            scheduler,
            play,
            physics,
            ..
        } = self;
        let physics = physics.as_mut();

        if play.gameplay_active() {
            scheduler.pre_update(world, physics, dt);
            scheduler.update(world, physics, dt);
            scheduler.post_update(world, physics, dt);
            scheduler.pre_physics(world, physics, dt);
            physics.step_simulation(dt);
            scheduler.post_physics(world, physics, dt);
        } else {
            scheduler.run_required_only(world, physics, dt);
        }

        scheduler.pre_render(world, physics, dt);
        scheduler.render(world, physics, dt);
        scheduler.post_render(world, physics, dt);
    }

    /// Reduced frame for unfocused runtimes: required systems only
    pub fn background_frame(&mut self, dt: f32) {
        let Self {
            world,
            scheduler,
            physics,
            ..
        } = self;
        scheduler.run_required_only(world, physics.as_mut(), dt);
    }

    /// Start a play session (snapshot taken)
    pub fn begin_play(&mut self) -> bool {
        self.play.begin_play(&self.world)
    }

    /// Pause the running play session
    pub fn pause(&mut self) -> bool {
        self.play.pause()
    }

    /// Resume a paused play session
    pub fn resume(&mut self) -> bool {
        self.play.resume()
    }

    /// Stop the play session and restore the snapshot
    pub fn stop_play(&mut self) -> bool {
        self.play.stop(&mut self.world, self.physics.as_mut())
    }

    /// Current play state
    pub fn play_state(&self) -> PlayState {
        self.play.state()
    }

    /// Physics collaborator
    pub fn physics(&self) -> &dyn PhysicsEngine3d {
        self.physics.as_ref()
    }

    /// Split borrow for operations that need world and physics together
    /// (entity/component/scene destruction, snapshot restore)
    pub fn world_and_physics(&mut self) -> (&mut World, &mut dyn PhysicsEngine3d) {
        (&mut self.world, self.physics.as_mut())
    }
}

/// Main engine struct
///
/// The engine owns its runtimes and drives them once per frame; the
/// application owns the engine.
pub struct Engine {
    runtimes: Vec<Runtime>,
    active: usize,
    timer: Timer,
    config: EngineConfig,
    running: bool,
}

impl Engine {
    /// Create a new engine with one main runtime
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        log::info!("Initializing engine '{}'...", config.app_name);

        if config.world.max_entities == 0 {
            return Err(EngineError::InitializationFailed(
                "world.max_entities must be at least 1".to_string(),
            ));
        }

        let main = Runtime::new(&config);
        Ok(Self {
            runtimes: vec![main],
            active: 0,
            timer: Timer::new(),
            config,
            running: true,
        })
    }

    /// Run the engine main loop with the given application
    pub fn run<T: Application>(config: EngineConfig, app: &mut T) -> Result<(), EngineError> {
        let mut engine = Self::new(config)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");

        while engine.running {
            engine.timer.update();
            let delta_time = engine.timer.delta_time();

            app.update(&mut engine, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {e}")))?;

            engine.update(delta_time);
        }

        app.cleanup(&mut engine);

        log::info!("Engine shutdown complete");
        Ok(())
    }

    /// Advance every runtime by one frame
    ///
    /// The focused runtime gets the full phase order; the others run
    /// required systems only.
    pub fn update(&mut self, delta_time: f32) {
        for (index, runtime) in self.runtimes.iter_mut().enumerate() {
            if index == self.active {
                runtime.frame(delta_time);
            } else {
                runtime.background_frame(delta_time);
            }
        }
    }

    /// Register an additional runtime
    pub fn add_runtime(&mut self, runtime: Runtime, set_active: bool) -> RuntimeHandle {
        let handle = RuntimeHandle(self.runtimes.len());
        self.runtimes.push(runtime);
        if set_active {
            self.active = handle.0;
        }
        handle
    }

    /// Switch the focused runtime
    pub fn set_active_runtime(&mut self, handle: RuntimeHandle) -> bool {
        if handle.0 < self.runtimes.len() {
            self.active = handle.0;
            true
        } else {
            log::warn!("set_active_runtime: no runtime for handle {}", handle.0);
            false
        }
    }

    /// Handle of the focused runtime
    pub fn active_runtime_handle(&self) -> RuntimeHandle {
        RuntimeHandle(self.active)
    }

    /// The focused runtime
    pub fn active_runtime(&self) -> &Runtime {
        &self.runtimes[self.active]
    }

    /// Mutable access to the focused runtime
    pub fn active_runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtimes[self.active]
    }

    /// A runtime by handle
    pub fn runtime(&self, handle: RuntimeHandle) -> Option<&Runtime> {
        self.runtimes.get(handle.0)
    }

    /// Mutable access to a runtime by handle
    pub fn runtime_mut(&mut self, handle: RuntimeHandle) -> Option<&mut Runtime> {
        self.runtimes.get_mut(handle.0)
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }

    /// Whether the main loop keeps running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
