use fpview_common::{MeshKind, Pose, TextureId};
use fpview_scene::SceneCatalog;
use glam::Mat4;

use crate::TransformBuilder;

/// Per-draw shader inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    pub texture: TextureId,
    /// Projection times view.
    pub projection: Mat4,
    pub model: Mat4,
}

/// One mesh to draw with its uniform bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshKind,
    pub uniforms: Uniforms,
}

/// Build draw calls for every catalog object, in catalog order.
pub fn draw_calls(builder: &TransformBuilder, pose: &Pose, catalog: &SceneCatalog) -> Vec<DrawCall> {
    let projection = builder.view_projection(pose);
    catalog
        .objects()
        .iter()
        .map(|object| DrawCall {
            mesh: object.mesh,
            uniforms: Uniforms {
                texture: object.texture,
                projection,
                model: crate::model_matrix(object),
            },
        })
        .collect()
}

/// Renderer-agnostic interface. Backends execute draw calls in submission
/// order and never feed anything back into the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from an ordered draw list.
    fn render(&self, draws: &[DrawCall]) -> Self::Output;
}

/// Text backend: describes each draw call. Used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, draws: &[DrawCall]) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Frame (draws={}) ===\n", draws.len()));

        for (i, draw) in draws.iter().enumerate() {
            let p = draw.uniforms.model.w_axis;
            let mesh = match draw.mesh {
                MeshKind::Quad => "quad",
                MeshKind::CrossedQuads => "cross",
            };
            out.push_str(&format!(
                "  [{i:>3}] {mesh:<5} tex={} pos=({:.2}, {:.2}, {:.2})\n",
                draw.uniforms.texture.0, p.x, p.y, p.z
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpview_assets::{SolidTextureLoader, load_batch};
    use fpview_scene::SceneConfig;

    fn builtin_catalog() -> SceneCatalog {
        let cfg = SceneConfig::builtin().unwrap();
        let map = cfg.grid().unwrap();
        let textures = load_batch(&SolidTextureLoader::new(), &cfg.texture_requests()).unwrap();
        SceneCatalog::build(&cfg, &map, &textures).unwrap()
    }

    #[test]
    fn one_draw_per_object_in_order() {
        let catalog = builtin_catalog();
        let builder = TransformBuilder::default();
        let pose = Pose::new(1.5, 1.5, 0.0);
        let draws = draw_calls(&builder, &pose, &catalog);

        assert_eq!(draws.len(), catalog.len());
        for (draw, object) in draws.iter().zip(catalog.objects()) {
            assert_eq!(draw.mesh, object.mesh);
            assert_eq!(draw.uniforms.texture, object.texture);
            assert_eq!(draw.uniforms.projection, builder.view_projection(&pose));
            assert_eq!(draw.uniforms.model, builder.build(&pose, object).model);
        }
    }

    #[test]
    fn empty_catalog_has_no_draws() {
        let draws = draw_calls(
            &TransformBuilder::default(),
            &Pose::default(),
            &SceneCatalog::default(),
        );
        assert!(draws.is_empty());
        let text = DebugTextRenderer::new().render(&draws);
        assert!(text.contains("draws=0"));
    }

    #[test]
    fn debug_renderer_lists_draws() {
        let catalog = builtin_catalog();
        let draws = draw_calls(&TransformBuilder::default(), &Pose::default(), &catalog);
        let text = DebugTextRenderer::new().render(&draws);
        assert!(text.contains("draws=31"));
        assert!(text.contains("cross"));
        assert!(text.contains("pos=(3.50, 2.50, 0.00)"));
    }
}
