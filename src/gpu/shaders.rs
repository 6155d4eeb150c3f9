//! WGSL sources.

/// Instanced hexagon sprites, one instance per particle.
///
/// Vertex buffer 0 holds positions, buffer 1 colors. Quads are expanded in
/// view space so sprites keep a fixed world size.
pub const POINTS_SHADER: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    model: mat4x4<f32>,
    point_size: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let corner = quad_vertices[vertex_index];

    var view_pos = uniforms.view * uniforms.model * vec4<f32>(position, 1.0);
    view_pos.x += corner.x * uniforms.point_size * 0.5;
    view_pos.y += corner.y * uniforms.point_size * 0.5;

    var out: VertexOutput;
    out.clip_position = uniforms.proj * view_pos;
    out.color = color;
    out.uv = corner;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // hexagon with a vertex on +x
    let q = abs(in.uv);
    let d = max(q.y, dot(q, vec2<f32>(0.8660254, 0.5)));
    let edge = 1.0 - smoothstep(0.8, 0.8660254, d);
    let alpha = in.color.a * edge;
    if alpha < 0.1 {
        discard;
    }
    return vec4<f32>(in.color.rgb, alpha);
}
"#;

/// Line lists for silk and cilia.
pub const LINES_SHADER: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    model: mat4x4<f32>,
    point_size: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.proj * uniforms.view * uniforms.model * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if in.color.a <= 0.0 {
        discard;
    }
    return in.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_points_shader_valid() {
        validate_wgsl(POINTS_SHADER).unwrap();
    }

    #[test]
    fn test_lines_shader_valid() {
        validate_wgsl(LINES_SHADER).unwrap();
    }
}
