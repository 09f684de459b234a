/// WGSL shader for textured scene objects.
///
/// Projection (view included) and model matrices arrive per instance. Texels
/// with alpha below one half are discarded so tree cutouts need no sorting.
pub const SCENE_SHADER: &str = r#"
@group(0) @binding(0)
var object_texture: texture_2d<f32>;
@group(0) @binding(1)
var object_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

struct InstanceInput {
    @location(2) projection_0: vec4<f32>,
    @location(3) projection_1: vec4<f32>,
    @location(4) projection_2: vec4<f32>,
    @location(5) projection_3: vec4<f32>,
    @location(6) model_0: vec4<f32>,
    @location(7) model_1: vec4<f32>,
    @location(8) model_2: vec4<f32>,
    @location(9) model_3: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let projection = mat4x4<f32>(
        instance.projection_0,
        instance.projection_1,
        instance.projection_2,
        instance.projection_3,
    );
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );

    var out: VertexOutput;
    out.clip_position = projection * model * vec4<f32>(vertex.position, 1.0);
    out.uv = vertex.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(object_texture, object_sampler, in.uv);
    if color.a < 0.5 {
        discard;
    }
    return color;
}
"#;
