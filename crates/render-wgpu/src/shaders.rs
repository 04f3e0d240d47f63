//! WGSL shader sources, keyed by logical identifier.

/// Vertex and fragment stage sources for one program.
#[derive(Debug, Clone, Copy)]
pub struct ShaderPair {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

/// Looks up the stages for a logical shader id.
pub fn shader_source(id: &str) -> Option<ShaderPair> {
    match id {
        "scenery" => Some(ShaderPair {
            vertex: SCENERY_VERT,
            fragment: SCENERY_FRAG,
        }),
        "instance" => Some(ShaderPair {
            vertex: INSTANCE_VERT,
            fragment: INSTANCE_FRAG,
        }),
        "instance-lines" => Some(ShaderPair {
            vertex: INSTANCE_VERT,
            fragment: LINE_FRAG,
        }),
        _ => None,
    }
}

/// Vertex stage for static scenery: position + normal through the MVP.
pub const SCENERY_VERT: &str = r#"
struct Globals {
    mvp: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = globals.mvp * vec4<f32>(vertex.position, 1.0);
    out.normal = vertex.normal;
    return out;
}
"#;

/// Fragment stage for scenery: single fixed light, no material system.
pub const SCENERY_FRAG: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let diffuse = max(dot(normalize(in.normal), light_dir), 0.0);
    let lighting = 0.3 + diffuse * 0.7;
    return vec4<f32>(vec3<f32>(0.55, 0.57, 0.6) * lighting, 1.0);
}
"#;

/// Vertex stage for instance geometry: displaces each vertex by its
/// scaled effect and carries the normalized magnitude to the fragment.
pub const INSTANCE_VERT: &str = r#"
struct Globals {
    mvp: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct EffectParams {
    max_effect: f32,
    scale: f32,
    _pad: vec2<f32>,
};

@group(1) @binding(0)
var<uniform> effect: EffectParams;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) effect: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) intensity: f32,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let displaced = vertex.position + vec3<f32>(vertex.effect * effect.scale, 0.0);

    var out: VertexOutput;
    out.clip_position = globals.mvp * vec4<f32>(displaced, 1.0);
    out.intensity = length(vertex.effect) / max(effect.max_effect, 1e-6);
    return out;
}
"#;

/// Fragment stage for filled instance geometry: cold-to-hot ramp on the
/// effect intensity.
pub const INSTANCE_FRAG: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) intensity: f32,
};

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let t = clamp(in.intensity, 0.0, 1.0);
    let cold = vec3<f32>(0.1, 0.2, 0.8);
    let hot = vec3<f32>(0.9, 0.15, 0.1);
    return vec4<f32>(mix(cold, hot, t), 1.0);
}
"#;

/// Fragment stage for the wireframe index set: solid dark lines.
pub const LINE_FRAG: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) intensity: f32,
};

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(0.1, 0.1, 0.1, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve() {
        for id in ["scenery", "instance", "instance-lines"] {
            let pair = shader_source(id).expect(id);
            assert!(pair.vertex.contains("@vertex"));
            assert!(pair.fragment.contains("@fragment"));
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(shader_source("bloom").is_none());
    }

    #[test]
    fn stages_share_the_varying_block() {
        // line and fill fragments must agree with the instance vertex output
        assert!(INSTANCE_VERT.contains("intensity"));
        assert!(INSTANCE_FRAG.contains("intensity"));
        assert!(LINE_FRAG.contains("intensity"));
    }
}
