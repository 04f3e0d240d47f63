use crate::geometry::{self, InstanceBuffer, SceneryBuffer};
use crate::shader::{self, ShaderError, ShaderProgram};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use orbitview_render::{FrameContext, FrameSink};
use orbitview_scene::{InstanceMesh, SceneryMesh, VertexLayout};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    mvp: [[f32; 4]; 4],
}

/// The scene is drawn on a white page, matching the plotting style of
/// the meshes this viewer exists for.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

/// wgpu mesh renderer.
///
/// Owns the compiled pipelines, the shared MVP uniform, the depth target
/// and every uploaded geometry buffer. Buffers draw in insertion order,
/// scenery first, then instance geometry.
pub struct MeshRenderer {
    scenery_pipeline: wgpu::RenderPipeline,
    instance_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    effect_layout: wgpu::BindGroupLayout,
    depth_texture: wgpu::TextureView,
    scenery: Vec<SceneryBuffer>,
    instances: Vec<InstanceBuffer>,
}

impl MeshRenderer {
    /// Compiles the shader programs and builds the pipelines. Any stage
    /// or link failure aborts construction with its diagnostic; a partly
    /// built renderer never exists.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, ShaderError> {
        let scenery_program = ShaderProgram::from_id(device, "scenery")?;
        let instance_program = ShaderProgram::from_id(device, "instance")?;
        let line_program = ShaderProgram::from_id(device, "instance-lines")?;

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals_buffer"),
            contents: bytemuck::bytes_of(&Globals {
                mvp: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[uniform_entry(0)],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let effect_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("effect_bind_group_layout"),
            entries: &[uniform_entry(0)],
        });

        let scenery_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("scenery_pipeline_layout"),
                bind_group_layouts: &[&globals_layout],
                push_constant_ranges: &[],
            });
        let instance_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("instance_pipeline_layout"),
                bind_group_layouts: &[&globals_layout, &effect_layout],
                push_constant_ranges: &[],
            });

        // Scenery: interleaved position + normal in one buffer slot
        let scenery_attrs =
            geometry::vertex_attributes(&VertexLayout::position_normal(), 0);
        let scenery_pipeline = shader::link_pipeline(
            device,
            scenery_program.id(),
            &wgpu::RenderPipelineDescriptor {
                label: Some("scenery_pipeline"),
                layout: Some(&scenery_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: scenery_program.vertex(),
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: geometry::stride_bytes(&VertexLayout::position_normal()),
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &scenery_attrs,
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: scenery_program.fragment(),
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    // both faces of shell meshes are visible
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(depth_state()),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            },
        )?;

        // Instance geometry: coordinates and effect channel in separate
        // buffer slots so the layouts stay independent
        let coord_attrs = geometry::vertex_attributes(&VertexLayout::position(), 0);
        let effect_attrs = [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: 1,
        }];
        let instance_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: geometry::stride_bytes(&VertexLayout::position()),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &coord_attrs,
            },
            wgpu::VertexBufferLayout {
                array_stride: 8,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &effect_attrs,
            },
        ];

        let instance_pipeline = shader::link_pipeline(
            device,
            instance_program.id(),
            &wgpu::RenderPipelineDescriptor {
                label: Some("instance_pipeline"),
                layout: Some(&instance_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: instance_program.vertex(),
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &instance_buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: instance_program.fragment(),
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(depth_state()),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            },
        )?;

        let line_pipeline = shader::link_pipeline(
            device,
            line_program.id(),
            &wgpu::RenderPipelineDescriptor {
                label: Some("instance_line_pipeline"),
                layout: Some(&instance_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: line_program.vertex(),
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &instance_buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: line_program.fragment(),
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::LineList,
                    ..Default::default()
                },
                depth_stencil: Some(depth_state()),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            },
        )?;

        let depth_texture = create_depth_texture(device, width, height);

        Ok(Self {
            scenery_pipeline,
            instance_pipeline,
            line_pipeline,
            globals_buffer,
            globals_bind_group,
            effect_layout,
            depth_texture,
            scenery: Vec::new(),
            instances: Vec::new(),
        })
    }

    /// Rebuilds the depth target to match a reconfigured surface.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = create_depth_texture(device, width, height);
    }

    /// Uploads scenery; it draws after everything registered before it.
    pub fn add_scenery(&mut self, device: &wgpu::Device, mesh: &SceneryMesh) {
        self.scenery.push(SceneryBuffer::upload(device, mesh));
    }

    /// Uploads instance geometry; draw order follows registration order.
    pub fn add_instance(&mut self, device: &wgpu::Device, mesh: &InstanceMesh) {
        self.instances
            .push(InstanceBuffer::upload(device, mesh, &self.effect_layout));
    }

    pub fn scenery_count(&self) -> usize {
        self.scenery.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Renders one frame: clear, upload the MVP, draw scenery, then draw
    /// instance geometry with the fill or line index set.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        ctx: &FrameContext,
    ) {
        queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals {
                mvp: ctx.mvp.to_cols_array_2d(),
            }),
        );
        for instance in &self.instances {
            instance.write_effect(queue, ctx.effect_scale);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if !self.scenery.is_empty() {
                pass.set_pipeline(&self.scenery_pipeline);
                pass.set_bind_group(0, &self.globals_bind_group, &[]);
                for buffer in &self.scenery {
                    buffer.draw(&mut pass);
                }
            }

            if !self.instances.is_empty() {
                let pipeline = if ctx.wireframe {
                    &self.line_pipeline
                } else {
                    &self.instance_pipeline
                };
                pass.set_pipeline(pipeline);
                // re-bind after the pipeline switch; nothing carries over
                pass.set_bind_group(0, &self.globals_bind_group, &[]);
                for buffer in &self.instances {
                    buffer.draw(&mut pass, ctx.wireframe);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// One frame's borrow of the GPU handles, letting the frame driver treat
/// the renderer as a plain sink.
pub struct GpuFrame<'a> {
    pub renderer: &'a MeshRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub view: &'a wgpu::TextureView,
}

impl FrameSink for GpuFrame<'_> {
    fn render_frame(&mut self, ctx: &FrameContext) {
        self.renderer.render(self.device, self.queue, self.view, ctx);
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: wgpu::TextureFormat::Depth32Float,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
