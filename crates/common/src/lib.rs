//! Shared types for the fpview workspace.

mod types;

pub use types::{Key, MeshKind, Pose, TextureId};
