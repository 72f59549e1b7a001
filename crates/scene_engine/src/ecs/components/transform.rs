//! Spatial transform components
//!
//! Pure data components: `local` is authored relative to the parent
//! entity, `world` is derived by the hierarchy propagation systems every
//! frame and should be treated as read-only outside them.

use crate::ecs::component::Component;
use crate::foundation::math::{Transform2d, Transform3d, Vec2, Vec3};
use crate::metadata::{FieldInfo, FieldKind, FieldValue, Reflect};

/// 3D spatial transform of an entity
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transform3dComponent {
    /// Transform relative to the parent entity
    pub local: Transform3d,

    /// Derived world-space transform
    pub world: Transform3d,
}

impl Transform3dComponent {
    /// Create from a local transform; the world transform is derived on
    /// the next propagation pass
    pub fn from_local(local: Transform3d) -> Self {
        Self {
            local,
            world: Transform3d::identity(),
        }
    }

    /// Create from a local position
    pub fn from_position(position: Vec3) -> Self {
        Self::from_local(Transform3d::from_position(position))
    }
}

const TRANSFORM3D_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("local", FieldKind::Transform3d),
    FieldInfo::new("world", FieldKind::Transform3d),
];

impl Reflect for Transform3dComponent {
    fn type_name(&self) -> &'static str {
        "Transform3d"
    }

    fn fields(&self) -> &'static [FieldInfo] {
        TRANSFORM3D_FIELDS
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "local" => Some(FieldValue::Transform3d(self.local.clone())),
            "world" => Some(FieldValue::Transform3d(self.world.clone())),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("local", FieldValue::Transform3d(transform)) => {
                self.local = transform;
                true
            }
            ("world", FieldValue::Transform3d(transform)) => {
                self.world = transform;
                true
            }
            _ => false,
        }
    }
}

impl Component for Transform3dComponent {}

/// 2D spatial transform of an entity
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transform2dComponent {
    /// Transform relative to the parent entity
    pub local: Transform2d,

    /// Derived world-space transform
    pub world: Transform2d,
}

impl Transform2dComponent {
    /// Create from a local transform
    pub fn from_local(local: Transform2d) -> Self {
        Self {
            local,
            world: Transform2d::identity(),
        }
    }

    /// Create from a local position
    pub fn from_position(position: Vec2) -> Self {
        Self::from_local(Transform2d::from_position(position))
    }
}

const TRANSFORM2D_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("local", FieldKind::Transform2d),
    FieldInfo::new("world", FieldKind::Transform2d),
];

impl Reflect for Transform2dComponent {
    fn type_name(&self) -> &'static str {
        "Transform2d"
    }

    fn fields(&self) -> &'static [FieldInfo] {
        TRANSFORM2D_FIELDS
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "local" => Some(FieldValue::Transform2d(self.local.clone())),
            "world" => Some(FieldValue::Transform2d(self.world.clone())),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("local", FieldValue::Transform2d(transform)) => {
                self.local = transform;
                true
            }
            ("world", FieldValue::Transform2d(transform)) => {
                self.world = transform;
                true
            }
            _ => false,
        }
    }
}

impl Component for Transform2dComponent {}
