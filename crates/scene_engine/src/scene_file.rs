//! Scene file representation and RON persistence
//!
//! The loader produces a [`LoadedScene`] tree from persisted storage; the
//! world consumes it via [`World::load_scene`](crate::ecs::World::load_scene)
//! and produces it back via [`World::export_scene`](crate::ecs::World::export_scene).
//! Component payloads are stored as reflected field lists, so the file
//! format needs no per-type serialization code.

use crate::metadata::FieldValue;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Persisted form of one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedComponent {
    /// Registered type name (resolved through the metadata registry)
    pub type_name: String,

    /// Component enabled flag
    pub enabled: bool,

    /// Reflected field values, in field-layout order
    pub fields: Vec<(String, FieldValue)>,
}

/// Persisted form of one entity subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedEntity {
    /// Entity name
    pub name: String,

    /// Entity enabled flag
    pub enabled: bool,

    /// Attached components, in attachment order
    pub components: Vec<LoadedComponent>,

    /// Child entities, in child order
    pub children: Vec<LoadedEntity>,
}

impl LoadedEntity {
    /// Create an enabled entity with no components or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            components: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Persisted form of one scene
///
/// The scene root is synthetic and not stored; `entities` are the root's
/// direct children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedScene {
    /// Scene name
    pub name: String,

    /// Top-level entities of the scene
    pub entities: Vec<LoadedEntity>,
}

/// Scene file errors
#[derive(Error, Debug)]
pub enum SceneFileError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Load a scene description from a RON file
pub fn load_scene_file(path: impl AsRef<Path>) -> Result<LoadedScene, SceneFileError> {
    let contents = std::fs::read_to_string(path)?;
    ron::from_str(&contents).map_err(|e| SceneFileError::Parse(e.to_string()))
}

/// Save a scene description to a RON file
pub fn save_scene_file(path: impl AsRef<Path>, scene: &LoadedScene) -> Result<(), SceneFileError> {
    let contents = ron::ser::to_string_pretty(scene, ron::ser::PrettyConfig::default())
        .map_err(|e| SceneFileError::Serialize(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}
