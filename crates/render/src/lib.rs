//! Rendering adapter: transform builder plus a renderer-agnostic draw list.
//!
//! # Invariants
//! - Renderers never mutate the scene or the pose.
//! - Model matrices compose as translate * rotate-about-pivot * scale.
//! - Transform building never fails; degenerate rotations become identity.

mod renderer;
mod transform;

pub use renderer::{DebugTextRenderer, DrawCall, Renderer, Uniforms, draw_calls};
pub use transform::{
    DrawTransforms, Projection, TransformBuilder, model_matrix, rotation_matrix,
};

pub fn crate_info() -> &'static str {
    concat!("fpview-render v", env!("CARGO_PKG_VERSION"))
}
