//! Metadata and reflection service
//!
//! The engine core does not generate reflection data; component and system
//! types describe themselves through the [`Reflect`] capability trait and
//! register with a [`MetadataRegistry`](registry::MetadataRegistry) at
//! startup. Editor property panels, scene file round-trips, and
//! create-by-name operations all consume this service instead of walking
//! raw byte offsets.

pub mod registry;

pub use registry::{ComponentInfo, MetadataRegistry, SystemInfo};

use crate::foundation::math::{Quat, Transform2d, Transform3d, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Coarse kind of a reflected field, used by editor property widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Boolean flag
    Bool,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 32-bit integer
    U32,
    /// 32-bit float
    F32,
    /// UTF-8 string
    Str,
    /// 2D vector
    Vec2,
    /// 3D vector
    Vec3,
    /// Rotation quaternion
    Quat,
    /// 2D transform
    Transform2d,
    /// 3D transform
    Transform3d,
}

/// Static description of a single reflected field
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    /// Field name as exposed to the editor and scene files
    pub name: &'static str,

    /// Kind of value the field holds
    pub kind: FieldKind,
}

impl FieldInfo {
    /// Create a new field description
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Tagged value of a reflected field
///
/// This is the exchange type between component data and its external
/// inspectors: the editor reads and writes fields as `FieldValue`s, and
/// scene files persist them through serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Boolean flag
    Bool(bool),
    /// Signed 32-bit integer
    I32(i32),
    /// Unsigned 32-bit integer
    U32(u32),
    /// 32-bit float
    F32(f32),
    /// UTF-8 string
    Str(String),
    /// 2D vector
    Vec2(Vec2),
    /// 3D vector
    Vec3(Vec3),
    /// Rotation quaternion
    Quat(Quat),
    /// 2D transform
    Transform2d(Transform2d),
    /// 3D transform
    Transform3d(Transform3d),
}

impl FieldValue {
    /// Kind of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::I32(_) => FieldKind::I32,
            Self::U32(_) => FieldKind::U32,
            Self::F32(_) => FieldKind::F32,
            Self::Str(_) => FieldKind::Str,
            Self::Vec2(_) => FieldKind::Vec2,
            Self::Vec3(_) => FieldKind::Vec3,
            Self::Quat(_) => FieldKind::Quat,
            Self::Transform2d(_) => FieldKind::Transform2d,
            Self::Transform3d(_) => FieldKind::Transform3d,
        }
    }
}

/// Field-level inspection capability
///
/// Every component type implements this trait so the editor can enumerate
/// and edit its data without knowing the concrete type. Implementations
/// reject values of the wrong kind by returning `false` from
/// [`Reflect::set_field`].
pub trait Reflect: 'static {
    /// Stable type name used in editor listings and scene files
    fn type_name(&self) -> &'static str;

    /// Field layout of this type
    fn fields(&self) -> &'static [FieldInfo];

    /// Read a field by name
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Write a field by name
    ///
    /// Returns `false` when the field does not exist or the value kind does
    /// not match the field kind; the component is left unmodified.
    fn set_field(&mut self, name: &str, value: FieldValue) -> bool;
}
