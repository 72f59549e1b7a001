//! Shared fixtures for ECS tests

use super::component::Component;
use super::system::{PhaseMask, System};
use super::world::World;
use crate::metadata::{FieldInfo, FieldKind, FieldValue, Reflect};
use crate::physics::PhysicsEngine3d;
use std::cell::RefCell;
use std::rc::Rc;

/// Minimal gameplay component used across the test suite
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(current: f32, max: f32) -> Self {
        Self { current, max }
    }
}

const HEALTH_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("current", FieldKind::F32),
    FieldInfo::new("max", FieldKind::F32),
];

impl Reflect for Health {
    fn type_name(&self) -> &'static str {
        "Health"
    }

    fn fields(&self) -> &'static [FieldInfo] {
        HEALTH_FIELDS
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "current" => Some(FieldValue::F32(self.current)),
            "max" => Some(FieldValue::F32(self.max)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("current", FieldValue::F32(v)) => {
                self.current = v;
                true
            }
            ("max", FieldValue::F32(v)) => {
                self.max = v;
                true
            }
            _ => false,
        }
    }
}

impl Component for Health {}

/// Shared invocation log for dispatch-order assertions
#[derive(Clone, Default)]
pub struct SharedOrder(Rc<RefCell<Vec<u32>>>);

impl SharedOrder {
    pub fn push(&self, id: u32) {
        self.0.borrow_mut().push(id);
    }

    /// Drain and return the recorded order
    pub fn take(&self) -> Vec<u32> {
        self.0.borrow_mut().drain(..).collect()
    }
}

/// Update-phase system that records its invocations
///
/// The const parameter keeps each probe a distinct system type, since the
/// scheduler allows one instance per type.
pub struct OrderProbeSystem<const ID: u32> {
    log: SharedOrder,
}

impl<const ID: u32> OrderProbeSystem<ID> {
    pub fn new(log: &SharedOrder) -> Self {
        Self { log: log.clone() }
    }
}

impl<const ID: u32> System for OrderProbeSystem<ID> {
    fn phases(&self) -> PhaseMask {
        PhaseMask::UPDATE
    }

    fn run(&mut self, _world: &mut World, _physics: &mut dyn PhysicsEngine3d, _dt: f32) {
        self.log.push(ID);
    }
}
