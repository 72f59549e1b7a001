//! Sandbox demo application
//!
//! Builds a small scene (a spinning pedestal with a physics crate),
//! simulates it through a play/pause/resume/stop cycle, and verifies that
//! stopping reverts every mutation the simulation made.

use scene_engine::prelude::*;

/// Spins the owning entity around its local Y axis
#[derive(Debug, Clone, PartialEq)]
struct SpinComponent {
    /// Angular speed in radians per second
    speed: f32,
}

impl Default for SpinComponent {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

const SPIN_FIELDS: &[FieldInfo] = &[FieldInfo::new("speed", FieldKind::F32)];

impl Reflect for SpinComponent {
    fn type_name(&self) -> &'static str {
        "Spin"
    }

    fn fields(&self) -> &'static [FieldInfo] {
        SPIN_FIELDS
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "speed" => Some(FieldValue::F32(self.speed)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("speed", FieldValue::F32(speed)) => {
                self.speed = speed;
                true
            }
            _ => false,
        }
    }
}

impl Component for SpinComponent {}

/// Applies spin components to local transforms every Update
#[derive(Debug, Default)]
struct SpinSystem;

impl System for SpinSystem {
    fn phases(&self) -> PhaseMask {
        PhaseMask::UPDATE
    }

    fn run(&mut self, world: &mut World, _physics: &mut dyn PhysicsEngine3d, dt: f32) {
        let spinners: Vec<(EntityId, f32)> = world
            .view::<SpinComponent>()
            .map(|(entity, spin)| (entity, spin.speed))
            .collect();

        for (entity, speed) in spinners {
            if let Some(transform) = world.get_component_mut::<Transform3dComponent>(entity) {
                transform.local.rotation =
                    Quat::from_axis_angle(&Vec3::y_axis(), speed * dt) * transform.local.rotation;
            }
        }
    }
}

struct SandboxApp {
    frames: u32,
    pedestal: EntityId,
}

impl Default for SandboxApp {
    fn default() -> Self {
        Self {
            frames: 0,
            pedestal: EntityId::INVALID,
        }
    }
}

impl Application for SandboxApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let runtime = engine.active_runtime_mut();

        runtime.registry.register_component::<SpinComponent>();
        runtime.registry.register_system::<SpinSystem>("Spin");
        runtime
            .scheduler
            .create_system_by_name("Spin", &runtime.registry);

        runtime.world.create_scene("Sandbox", true);

        self.pedestal = runtime.world.create_entity(EntityId::ROOT, "Pedestal");
        runtime.world.create_component(
            self.pedestal,
            Transform3dComponent::from_position(Vec3::new(0.0, 1.0, 0.0)),
        );
        runtime
            .world
            .create_component(self.pedestal, SpinComponent::default());

        let ornament = runtime.world.create_entity(self.pedestal, "Ornament");
        runtime.world.create_component(
            ornament,
            Transform3dComponent::from_position(Vec3::new(0.0, 0.5, 0.0)),
        );

        let crate_entity = runtime.world.create_entity(EntityId::ROOT, "Crate");
        runtime.world.create_component(
            crate_entity,
            Transform3dComponent::from_position(Vec3::new(2.0, 0.0, 0.0)),
        );
        runtime
            .world
            .create_component(crate_entity, RigidBodyComponent::default());

        log::info!(
            "scene built: {} entities, {} systems",
            runtime.world.entity_count(),
            runtime.scheduler.len()
        );

        runtime.begin_play();
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        self.frames += 1;
        let runtime = engine.active_runtime_mut();

        match self.frames {
            120 => {
                runtime.pause();
                log::info!("paused after {} frames", self.frames);
            }
            150 => {
                runtime.resume();
                log::info!("resumed");
            }
            300 => {
                let spun = runtime
                    .world
                    .get_component::<Transform3dComponent>(self.pedestal)
                    .map(|transform| transform.local.rotation);
                runtime.stop_play();
                let reverted = runtime
                    .world
                    .get_component::<Transform3dComponent>(self.pedestal)
                    .map(|transform| transform.local.rotation);

                log::info!("play rotation: {spun:?}");
                log::info!("after stop:    {reverted:?}");
                log::info!(
                    "bodies after stop: {} (state fully reverted: {})",
                    runtime.physics().body_count(),
                    spun != reverted
                );
                engine.quit();
            }
            _ => {}
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let runtime = engine.active_runtime();
        log::info!(
            "shutting down with {} entities in '{}'",
            runtime.world.entity_count(),
            runtime.world.active_scene_name().unwrap_or("<none>")
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = EngineConfig::default();
    let mut app = SandboxApp::default();
    Engine::run(config, &mut app)?;
    Ok(())
}
