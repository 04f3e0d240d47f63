use std::borrow::Cow;

/// Errors from shader compilation and pipeline creation. Always carries
/// the compiler or validator diagnostic, never a bare failure flag.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("vertex stage of '{id}' failed to compile: {log}")]
    VertexCompile { id: String, log: String },
    #[error("fragment stage of '{id}' failed to compile: {log}")]
    FragmentCompile { id: String, log: String },
    #[error("program '{id}' failed to link: {log}")]
    Link { id: String, log: String },
    #[error("unknown shader id '{0}'")]
    UnknownId(String),
}

/// A fully compiled two-stage shader program.
///
/// Construction is all-or-nothing: if either stage fails validation the
/// diagnostic text comes back in the error and no program value exists.
pub struct ShaderProgram {
    id: String,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
}

impl ShaderProgram {
    /// Compiles both stages from WGSL source text.
    pub fn compile(
        device: &wgpu::Device,
        id: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, ShaderError> {
        let vertex = compile_stage(device, &format!("{id}-vert"), vertex_src).map_err(|log| {
            ShaderError::VertexCompile {
                id: id.to_owned(),
                log,
            }
        })?;
        let fragment =
            compile_stage(device, &format!("{id}-frag"), fragment_src).map_err(|log| {
                ShaderError::FragmentCompile {
                    id: id.to_owned(),
                    log,
                }
            })?;

        tracing::debug!(id, "shader program compiled");
        Ok(Self {
            id: id.to_owned(),
            vertex,
            fragment,
        })
    }

    /// Compiles a program registered under a logical id.
    pub fn from_id(device: &wgpu::Device, id: &str) -> Result<Self, ShaderError> {
        let pair =
            crate::shaders::shader_source(id).ok_or_else(|| ShaderError::UnknownId(id.to_owned()))?;
        Self::compile(device, id, pair.vertex, pair.fragment)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vertex(&self) -> &wgpu::ShaderModule {
        &self.vertex
    }

    pub fn fragment(&self) -> &wgpu::ShaderModule {
        &self.fragment
    }
}

/// Compiles one WGSL stage inside a validation error scope, so the
/// compiler diagnostic comes back as text instead of an uncaptured
/// device error.
fn compile_stage(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, String> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    });
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(module),
        Some(e) => Err(e.to_string()),
    }
}

/// Runs pipeline creation inside a validation error scope. Interface
/// mismatches between the stages surface here as link diagnostics.
pub(crate) fn link_pipeline(
    device: &wgpu::Device,
    id: &str,
    desc: &wgpu::RenderPipelineDescriptor<'_>,
) -> Result<wgpu::RenderPipeline, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(desc);
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(pipeline),
        Some(e) => Err(ShaderError::Link {
            id: id.to_owned(),
            log: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_id_error_carries_the_id() {
        let err = ShaderError::UnknownId("wobble".into());
        assert!(err.to_string().contains("wobble"));
    }

    #[test]
    fn link_error_formats_diagnostic() {
        let err = ShaderError::Link {
            id: "instance".into(),
            log: "location 0 type mismatch".into(),
        };
        let text = err.to_string();
        assert!(text.contains("instance"));
        assert!(text.contains("type mismatch"));
    }
}
