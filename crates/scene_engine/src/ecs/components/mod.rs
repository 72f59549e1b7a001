//! Built-in component types
//!
//! Game-specific components live in the application crate; these are the
//! types the engine itself needs (spatial hierarchy, physics coupling).

pub mod rigid_body;
pub mod transform;

pub use rigid_body::RigidBodyComponent;
pub use transform::{Transform2dComponent, Transform3dComponent};
