use bytemuck::{Pod, Zeroable};
use orbitview_scene::{InstanceMesh, SceneryMesh, VertexLayout};
use wgpu::util::DeviceExt;

const FLOAT_SIZE: u64 = 4;

/// Per-instance-buffer uniform: the effect normalization peak and the
/// animation scale for this frame. Padded to 16 bytes for uniform rules.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct EffectParams {
    pub max_effect: f32,
    pub scale: f32,
    pub _pad: [f32; 2],
}

/// Maps a scene layout onto wgpu vertex attributes, starting at the
/// given shader location.
pub(crate) fn vertex_attributes(
    layout: &VertexLayout,
    first_location: u32,
) -> Vec<wgpu::VertexAttribute> {
    layout
        .attributes()
        .iter()
        .enumerate()
        .map(|(i, attr)| wgpu::VertexAttribute {
            format: match attr.components {
                1 => wgpu::VertexFormat::Float32,
                2 => wgpu::VertexFormat::Float32x2,
                3 => wgpu::VertexFormat::Float32x3,
                _ => wgpu::VertexFormat::Float32x4,
            },
            offset: attr.offset as u64 * FLOAT_SIZE,
            shader_location: first_location + i as u32,
        })
        .collect()
}

pub(crate) fn stride_bytes(layout: &VertexLayout) -> u64 {
    layout.stride() as u64 * FLOAT_SIZE
}

/// GPU-resident scenery: one vertex buffer, one triangle index set.
/// Uploaded once, immutable for the session.
pub struct SceneryBuffer {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl SceneryBuffer {
    pub fn upload(device: &wgpu::Device, mesh: &SceneryMesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scenery_vertex_buffer"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scenery_index_buffer"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        tracing::debug!(
            vertices = mesh.vertex_count(),
            indices = mesh.index_count(),
            "scenery uploaded"
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds this buffer's state onto the pass and issues the indexed
    /// draw. Bind state does not survive past the pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// GPU-resident instance geometry: coordinate and effect channels in
/// separate buffers, a fill index set and a line index set, plus this
/// buffer's effect uniform and bind group.
pub struct InstanceBuffer {
    coord_buffer: wgpu::Buffer,
    effect_buffer: wgpu::Buffer,
    fill_index_buffer: wgpu::Buffer,
    line_index_buffer: wgpu::Buffer,
    fill_index_count: u32,
    line_index_count: u32,
    max_effect: f32,
    effect_uniform: wgpu::Buffer,
    effect_bind_group: wgpu::BindGroup,
}

impl InstanceBuffer {
    pub fn upload(
        device: &wgpu::Device,
        mesh: &InstanceMesh,
        effect_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let coord_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("instance_coord_buffer"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        // separate buffer so the coordinate channel stays untouched by
        // anything effect-related
        let effect_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("instance_effect_buffer"),
            contents: bytemuck::cast_slice(mesh.effects()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let fill_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("instance_fill_index_buffer"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let line_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("instance_line_index_buffer"),
            contents: bytemuck::cast_slice(mesh.line_indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let effect_uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("instance_effect_uniform"),
            contents: bytemuck::bytes_of(&EffectParams {
                max_effect: mesh.max_effect(),
                scale: 0.0,
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let effect_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("instance_effect_bind_group"),
            layout: effect_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: effect_uniform.as_entire_binding(),
            }],
        });

        tracing::debug!(
            vertices = mesh.vertex_count(),
            fill_indices = mesh.indices().len(),
            line_indices = mesh.line_indices().len(),
            max_effect = mesh.max_effect(),
            "instance geometry uploaded"
        );

        Self {
            coord_buffer,
            effect_buffer,
            fill_index_buffer,
            line_index_buffer,
            fill_index_count: mesh.indices().len() as u32,
            line_index_count: mesh.line_indices().len() as u32,
            max_effect: mesh.max_effect(),
            effect_uniform,
            effect_bind_group,
        }
    }

    /// Writes this buffer's effect uniform for the coming frame. Pushed
    /// every frame, not once at setup: the animation scale changes
    /// between frames.
    pub fn write_effect(&self, queue: &wgpu::Queue, scale: f32) {
        queue.write_buffer(
            &self.effect_uniform,
            0,
            bytemuck::bytes_of(&EffectParams {
                max_effect: self.max_effect,
                scale,
                _pad: [0.0; 2],
            }),
        );
    }

    pub fn fill_index_count(&self) -> u32 {
        self.fill_index_count
    }

    pub fn line_index_count(&self) -> u32 {
        self.line_index_count
    }

    /// Binds and draws either the fill or the line index set; the vertex
    /// data is shared and never re-uploaded for the switch.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, wireframe: bool) {
        pass.set_bind_group(1, &self.effect_bind_group, &[]);
        pass.set_vertex_buffer(0, self.coord_buffer.slice(..));
        pass.set_vertex_buffer(1, self.effect_buffer.slice(..));

        let (buffer, count) = if wireframe {
            (&self.line_index_buffer, self.line_index_count)
        } else {
            (&self.fill_index_buffer, self.fill_index_count)
        };
        pass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_maps_to_wgpu_attributes() {
        let attrs = vertex_attributes(&VertexLayout::position_normal(), 0);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].format, wgpu::VertexFormat::Float32x3);
        assert_eq!(attrs[0].offset, 0);
        assert_eq!(attrs[1].offset, 12);
        assert_eq!(attrs[1].shader_location, 1);
    }

    #[test]
    fn attribute_locations_can_start_past_zero() {
        let attrs = vertex_attributes(&VertexLayout::position(), 5);
        assert_eq!(attrs[0].shader_location, 5);
    }

    #[test]
    fn stride_is_in_bytes() {
        assert_eq!(stride_bytes(&VertexLayout::position_normal()), 24);
        assert_eq!(stride_bytes(&VertexLayout::position()), 12);
    }

    #[test]
    fn effect_params_are_uniform_sized() {
        assert_eq!(std::mem::size_of::<EffectParams>(), 16);
    }
}
