use fpview_assets::TextureRequest;
use fpview_common::{MeshKind, Pose};
use fpview_input::KeyMap;
use fpview_kernel::{ControlScheme, MotionRates};
use fpview_map::GridMap;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::SceneError;

const DEFAULT_SCENE: &str = include_str!("../scenes/default.yaml");

/// Texture name used for derived wall faces.
pub const WALL_TEXTURE: &str = "wall";
/// Texture name used for trees placed from `T` map cells.
pub const TREE_TEXTURE: &str = "tree";

/// Everything needed to set up a viewer session, loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    /// Layout rows, top row is `y = 0`.
    pub map: Vec<String>,
    pub start: StartPose,
    /// Texture name to path, relative to the assets directory.
    pub textures: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub props: Vec<PropConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartPose {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub facing_degrees: f32,
}

impl StartPose {
    pub fn pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.facing_degrees.to_radians())
    }

    // Grid lookups floor NaN to cell 0, so the floor-cell check alone lets it through.
    fn validate(&self) -> Result<(), SceneError> {
        if self.x.is_finite() && self.y.is_finite() && self.facing_degrees.is_finite() {
            Ok(())
        } else {
            Err(SceneError::InvalidStart {
                x: self.x,
                y: self.y,
                facing_degrees: self.facing_degrees,
            })
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub scheme: ControlScheme,
    #[serde(flatten)]
    pub rates: MotionRates,
    /// Raw key code overrides applied on top of arrows + WASD.
    pub bindings: KeyMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Eye height above the ground plane.
    pub eye_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.01,
            far: 100.0,
            eye_height: 0.0,
        }
    }
}

/// A free-standing object that does not take part in collision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropConfig {
    pub mesh: MeshKind,
    pub texture: String,
    pub position: Vec2,
    #[serde(default = "unit_size")]
    pub size: Vec2,
    #[serde(default)]
    pub rotation: Option<RotationConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RotationConfig {
    pub degrees: f32,
    #[serde(default = "up_axis")]
    pub axis: Vec3,
    /// Offset of the pivot from the object's center.
    #[serde(default)]
    pub pivot: Vec3,
}

impl CameraConfig {
    fn validate(&self) -> Result<(), SceneError> {
        let invalid = |msg: String| Err(SceneError::InvalidCamera(msg));
        if !(self.fov_degrees.is_finite() && self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return invalid(format!("fov_degrees must be in (0, 180), got {}", self.fov_degrees));
        }
        if !(self.near.is_finite() && self.near > 0.0) {
            return invalid(format!("near must be positive, got {}", self.near));
        }
        if !(self.far.is_finite() && self.far > self.near) {
            return invalid(format!("far must exceed near ({}), got {}", self.near, self.far));
        }
        if !self.eye_height.is_finite() {
            return invalid(format!("eye_height must be finite, got {}", self.eye_height));
        }
        Ok(())
    }
}

fn validate_rates(rates: &MotionRates) -> Result<(), SceneError> {
    for (name, value) in [
        ("movement_rate", rates.movement_rate),
        ("rotation_rate", rates.rotation_rate),
        ("mouse_sensitivity", rates.mouse_sensitivity),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(SceneError::InvalidControls(format!(
                "{name} must be finite and non-negative, got {value}"
            )));
        }
    }
    Ok(())
}

fn unit_size() -> Vec2 {
    Vec2::ONE
}

fn up_axis() -> Vec3 {
    Vec3::Z
}

impl SceneConfig {
    /// The built-in 8x8 scene.
    pub fn builtin() -> Result<Self, SceneError> {
        Self::from_yaml(DEFAULT_SCENE)
    }

    pub fn from_yaml(text: &str) -> Result<Self, SceneError> {
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_yaml(&text)?;
        tracing::info!(path = %path.display(), "scene loaded");
        Ok(cfg)
    }

    /// Parse the layout rows into a grid.
    pub fn grid(&self) -> Result<GridMap, SceneError> {
        Ok(GridMap::from_rows(&self.map)?)
    }

    /// One request per configured texture, in name order.
    pub fn texture_requests(&self) -> Vec<TextureRequest> {
        self.textures
            .iter()
            .map(|(name, path)| TextureRequest::new(name.clone(), path.clone()))
            .collect()
    }

    /// Default bindings with the configured overrides applied.
    pub fn keymap(&self) -> KeyMap {
        let mut keymap = KeyMap::default();
        keymap.extend(&self.controls.bindings);
        keymap
    }

    fn validate(&self) -> Result<(), SceneError> {
        let map = self.grid()?;

        self.start.validate()?;
        self.camera.validate()?;
        validate_rates(&self.controls.rates)?;

        let start = self.start.pose();
        if map.cell_at_position(start.position).is_blocked() {
            return Err(SceneError::StartBlocked {
                x: self.start.x,
                y: self.start.y,
            });
        }

        if map.blocked_count() > map.tree_cells().len() && !self.textures.contains_key(WALL_TEXTURE) {
            return Err(SceneError::MissingTexture(WALL_TEXTURE.into()));
        }
        if !map.tree_cells().is_empty() && !self.textures.contains_key(TREE_TEXTURE) {
            return Err(SceneError::MissingTexture(TREE_TEXTURE.into()));
        }
        for prop in &self.props {
            if !self.textures.contains_key(&prop.texture) {
                return Err(SceneError::MissingTexture(prop.texture.clone()));
            }
        }
        Ok(())
    }
}
