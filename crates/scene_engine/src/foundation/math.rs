//! Math utilities and types
//!
//! Provides fundamental math types for the scene hierarchy and systems:
//! vector/quaternion aliases over nalgebra plus the 2D and 3D transform
//! types used by the hierarchy propagation systems.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale in 3D space
///
/// Local transforms are stored relative to the parent entity; world
/// transforms are produced by composing local transforms down the
/// hierarchy with [`Transform3d::combine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform3d {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform3d {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform3d {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Combine this transform with a child-relative transform
    ///
    /// Returns the transform that first applies `other` in this transform's
    /// local space, then this transform. This is the parent∘child
    /// composition used by hierarchy propagation.
    pub fn combine(&self, other: &Transform3d) -> Transform3d {
        Transform3d {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }

    /// Get the inverse transform
    pub fn inverse(&self) -> Transform3d {
        let inv_scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        let inv_rotation = self.rotation.inverse();
        let inv_position = inv_rotation * (-self.position.component_mul(&inv_scale));

        Transform3d {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }
}

/// Transform representing position, rotation, and scale in 2D space
///
/// Rotation is an angle in radians, counter-clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform2d {
    /// Position in 2D space
    pub position: Vec2,

    /// Rotation angle in radians
    pub rotation: f32,

    /// Scale factors
    pub scale: Vec2,
}

impl Default for Transform2d {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Transform2d {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Rotate a vector by this transform's rotation angle
    pub fn rotate_vector(&self, v: Vec2) -> Vec2 {
        let (sin, cos) = self.rotation.sin_cos();
        Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
    }

    /// Combine this transform with a child-relative transform
    ///
    /// Same parent∘child composition as [`Transform3d::combine`], with the
    /// rotation expressed as an angle sum.
    pub fn combine(&self, other: &Transform2d) -> Transform2d {
        Transform2d {
            position: self.position + self.rotate_vector(self.scale.component_mul(&other.position)),
            rotation: self.rotation + other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_transform3d_identity() {
        let transform = Transform3d::identity();

        assert_eq!(transform.position, Vec3::zeros());
        assert_relative_eq!(transform.rotation, Quat::identity(), epsilon = EPSILON);
        assert_eq!(transform.scale, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_transform3d_combine_translation_only() {
        let parent = Transform3d::from_position(Vec3::new(1.0, 2.0, 3.0));
        let child = Transform3d::from_position(Vec3::new(0.5, 0.0, -1.0));

        let combined = parent.combine(&child);
        assert_relative_eq!(combined.position, Vec3::new(1.5, 2.0, 2.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transform3d_combine_with_rotation() {
        // Child at (0,0,1) under a parent rotated 90 degrees around Y and
        // translated to (1,0,0): the child ends up at (2,0,0) in world space.
        let parent = Transform3d::from_position_rotation(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), constants::HALF_PI),
        );
        let child = Transform3d::from_position(Vec3::new(0.0, 0.0, 1.0));

        let combined = parent.combine(&child);
        assert_relative_eq!(combined.position, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transform3d_combine_applies_parent_scale() {
        let parent = Transform3d {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        let child = Transform3d::from_position(Vec3::new(1.0, 0.0, 0.0));

        let combined = parent.combine(&child);
        assert_relative_eq!(combined.position, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(combined.scale, Vec3::new(2.0, 2.0, 2.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transform3d_inverse_roundtrip() {
        let original = Transform3d {
            position: Vec3::new(2.0, 3.0, 1.0),
            rotation: Quat::from_axis_angle(&Vec3::y_axis(), 0.785),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };

        let should_be_identity = original.combine(&original.inverse());

        assert_relative_eq!(should_be_identity.position, Vec3::zeros(), epsilon = EPSILON);
        assert_relative_eq!(
            should_be_identity.scale,
            Vec3::new(1.0, 1.0, 1.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_transform2d_combine_with_rotation() {
        // Child at (1,0) under a parent rotated 90 degrees CCW lands at (0,1).
        let parent = Transform2d {
            position: Vec2::zeros(),
            rotation: constants::HALF_PI,
            scale: Vec2::new(1.0, 1.0),
        };
        let child = Transform2d::from_position(Vec2::new(1.0, 0.0));

        let combined = parent.combine(&child);
        assert_relative_eq!(combined.position.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(combined.position.y, 1.0, epsilon = EPSILON);
        assert_relative_eq!(combined.rotation, constants::HALF_PI, epsilon = EPSILON);
    }

    #[test]
    fn test_transform2d_combine_translation_only() {
        let parent = Transform2d::from_position(Vec2::new(3.0, -1.0));
        let child = Transform2d::from_position(Vec2::new(1.0, 1.0));

        let combined = parent.combine(&child);
        assert_relative_eq!(combined.position, Vec2::new(4.0, 0.0), epsilon = EPSILON);
    }
}
