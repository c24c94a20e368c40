/// WGSL shader for every mesh node, solid or wireframe.
///
/// `instance.params.x` selects the shading model:
/// 0 = lit by the scene lights, 1 = view-space normal colours, 2 = flat colour.
pub const SCENE_SHADER: &str = r#"
const MAX_LIGHTS: u32 = 4u;
const INV_PI: f32 = 0.31830988618;

struct Uniforms {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    // xyz = ambient radiance, w = directional light count
    ambient: vec4<f32>,
    // direction toward each light
    light_dirs: array<vec4<f32>, 4>,
    // rgb * intensity
    light_colors: array<vec4<f32>, 4>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) @interpolate(flat) shading: u32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = instance.color;
    out.shading = u32(instance.params.x);
    return out;
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    var n = normalize(in.world_normal);
    if !front {
        n = -n;
    }

    if in.shading == 1u {
        let view_n = normalize((uniforms.view * vec4<f32>(n, 0.0)).xyz);
        return vec4<f32>(view_n * 0.5 + vec3<f32>(0.5), 1.0);
    }
    if in.shading == 2u {
        return in.color;
    }

    var radiance = uniforms.ambient.xyz;
    let count = min(u32(uniforms.ambient.w), MAX_LIGHTS);
    for (var i = 0u; i < count; i++) {
        let l = normalize(uniforms.light_dirs[i].xyz);
        radiance += uniforms.light_colors[i].rgb * max(dot(n, l), 0.0);
    }
    return vec4<f32>(in.color.rgb * radiance * INV_PI, in.color.a);
}
"#;
