//! Play/stop workflow backing the editor's simulate-then-revert loop

use super::snapshot::ResetPoint;
use super::world::World;
use crate::physics::PhysicsEngine3d;

/// State of the play workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    /// Authoring: gameplay phases are not dispatched
    Editing,
    /// Simulating: full phase dispatch
    Playing,
    /// Simulation frozen; state preserved, dispatch suspended
    Paused,
}

/// Coordinates the Edit → Playing → Paused → Edit transitions
///
/// Entering play captures a [`ResetPoint`]; stopping restores and discards
/// it, so a play session is fully undoable. Resuming from pause reuses the
/// snapshot taken at play start.
pub struct PlaySession {
    state: PlayState,
    reset_point: Option<ResetPoint>,
}

impl Default for PlaySession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaySession {
    /// Create a session in the editing state
    pub fn new() -> Self {
        Self {
            state: PlayState::Editing,
            reset_point: None,
        }
    }

    /// Current workflow state
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Whether gameplay phases should be dispatched this frame
    pub fn gameplay_active(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Edit → Playing: snapshot the world and start simulating
    pub fn begin_play(&mut self, world: &World) -> bool {
        if self.state != PlayState::Editing {
            log::warn!("begin_play: already in a play session");
            return false;
        }
        self.reset_point = Some(world.create_reset_point());
        self.state = PlayState::Playing;
        log::info!("play session started");
        true
    }

    /// Playing → Paused
    pub fn pause(&mut self) -> bool {
        if self.state != PlayState::Playing {
            log::warn!("pause: not playing");
            return false;
        }
        self.state = PlayState::Paused;
        true
    }

    /// Paused → Playing, reusing the snapshot from play start
    pub fn resume(&mut self) -> bool {
        if self.state != PlayState::Paused {
            log::warn!("resume: not paused");
            return false;
        }
        self.state = PlayState::Playing;
        true
    }

    /// Playing/Paused → Editing: restore the snapshot and discard it
    pub fn stop(&mut self, world: &mut World, physics: &mut dyn PhysicsEngine3d) -> bool {
        if self.state == PlayState::Editing {
            log::warn!("stop: no play session is active");
            return false;
        }
        if let Some(point) = self.reset_point.take() {
            world.restore_reset_point(&point, physics);
        }
        self.state = PlayState::Editing;
        log::info!("play session stopped, state restored");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::test_support::Health;
    use crate::ecs::EntityId;
    use crate::physics::HeadlessPhysics;

    #[test]
    fn test_play_stop_reverts_mutations() {
        let mut world = World::default();
        let mut physics = HeadlessPhysics::default();
        world.create_scene("Main", true);
        let entity = world.create_entity(EntityId::ROOT, "Player");
        world.create_component(entity, Health::new(100.0, 100.0));

        let mut session = PlaySession::new();
        assert!(session.begin_play(&world));
        assert!(session.gameplay_active());

        // Simulated damage during play.
        world.get_component_mut::<Health>(entity).unwrap().current = 10.0;

        assert!(session.stop(&mut world, &mut physics));
        assert_eq!(session.state(), PlayState::Editing);
        assert_eq!(
            world.get_component::<Health>(entity).unwrap().current,
            100.0
        );
    }

    #[test]
    fn test_pause_resume_keeps_snapshot_and_state() {
        let mut world = World::default();
        let mut physics = HeadlessPhysics::default();
        world.create_scene("Main", true);
        let entity = world.create_entity(EntityId::ROOT, "Player");
        world.create_component(entity, Health::new(100.0, 100.0));

        let mut session = PlaySession::new();
        session.begin_play(&world);
        world.get_component_mut::<Health>(entity).unwrap().current = 42.0;

        assert!(session.pause());
        assert!(!session.gameplay_active());
        // Pausing freezes state without restoring it.
        assert_eq!(world.get_component::<Health>(entity).unwrap().current, 42.0);

        assert!(session.resume());
        assert!(session.gameplay_active());

        // Stop still reverts to the snapshot taken at play start.
        session.stop(&mut world, &mut physics);
        assert_eq!(
            world.get_component::<Health>(entity).unwrap().current,
            100.0
        );
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let mut world = World::default();
        let mut physics = HeadlessPhysics::default();
        world.create_scene("Main", true);

        let mut session = PlaySession::new();
        assert!(!session.pause());
        assert!(!session.resume());
        assert!(!session.stop(&mut world, &mut physics));

        session.begin_play(&world);
        assert!(!session.begin_play(&world));
        assert!(!session.resume());
    }
}
