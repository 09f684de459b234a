//! Scene setup: YAML configuration and the static catalog of renderable
//! objects derived from the map and the loaded textures.
//!
//! # Invariants
//! - The catalog is built exactly once, after every texture has loaded.
//! - Objects are immutable once built; textures are shared read-only.

mod catalog;
mod config;

pub use catalog::{GameObject, Rotation, SceneCatalog};
pub use config::{
    CameraConfig, ControlsConfig, PropConfig, RotationConfig, SceneConfig, StartPose,
    TREE_TEXTURE, WALL_TEXTURE,
};

use std::path::PathBuf;

/// Errors from loading a scene or building its catalog.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid map: {0}")]
    Map(#[from] fpview_map::MapError),
    #[error("start pose must be finite, got ({x}, {y}) facing {facing_degrees} deg")]
    InvalidStart { x: f32, y: f32, facing_degrees: f32 },
    #[error("invalid camera: {0}")]
    InvalidCamera(String),
    #[error("invalid controls: {0}")]
    InvalidControls(String),
    #[error("start position ({x}, {y}) is not on a floor cell")]
    StartBlocked { x: f32, y: f32 },
    #[error("scene needs a texture named {0:?}")]
    MissingTexture(String),
}

pub fn crate_info() -> &'static str {
    concat!("fpview-scene v", env!("CARGO_PKG_VERSION"))
}
