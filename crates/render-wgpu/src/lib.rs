//! wgpu render backend for the viewer.
//!
//! Draws textured unit quads and crossed-plane billboards from the draw list
//! built by `fpview-render`. Texture bind groups are indexed by `TextureId`.
//!
//! # Invariants
//! - The renderer never mutates the scene or the pose.
//! - Draw calls execute in submission order.
//! - Nothing is drawn with a texture that was not uploaded.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::WgpuRenderer;
