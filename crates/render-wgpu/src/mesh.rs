use bytemuck::{Pod, Zeroable};
use fpview_common::MeshKind;
use std::ops::Range;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Both unit meshes packed into one vertex/index buffer pair.
///
/// A quad is 1x1 in the local XZ plane, centered on the origin, facing Y.
/// Crossed quads add a second plane in YZ through the same center.
pub(crate) struct MeshSet {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
    quad: Range<u32>,
    crossed: Range<u32>,
}

impl MeshSet {
    pub fn new() -> Self {
        let p = 0.5_f32;
        #[rustfmt::skip]
        let vertices = vec![
            // XZ plane
            Vertex { position: [-p, 0.0,  p], uv: [0.0, 0.0] },
            Vertex { position: [ p, 0.0,  p], uv: [1.0, 0.0] },
            Vertex { position: [ p, 0.0, -p], uv: [1.0, 1.0] },
            Vertex { position: [-p, 0.0, -p], uv: [0.0, 1.0] },
            // YZ plane
            Vertex { position: [0.0, -p,  p], uv: [0.0, 0.0] },
            Vertex { position: [0.0,  p,  p], uv: [1.0, 0.0] },
            Vertex { position: [0.0,  p, -p], uv: [1.0, 1.0] },
            Vertex { position: [0.0, -p, -p], uv: [0.0, 1.0] },
        ];
        #[rustfmt::skip]
        let indices: Vec<u16> = vec![
            0, 1, 2, 2, 3, 0,
            4, 5, 6, 6, 7, 4,
        ];
        Self {
            vertices,
            indices,
            quad: 0..6,
            crossed: 0..12,
        }
    }

    /// Index range to draw for a mesh kind.
    pub fn indices_for(&self, mesh: MeshKind) -> Range<u32> {
        match mesh {
            MeshKind::Quad => self.quad.clone(),
            MeshKind::CrossedQuads => self.crossed.clone(),
        }
    }
}
