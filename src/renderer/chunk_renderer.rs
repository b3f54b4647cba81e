//! Per-frame chunk drawing.
//!
//! One indexed-indirect draw per resident chunk, every frame, addressed
//! purely by slot arithmetic. The GPU reads each slot's argument block and
//! draws however much geometry the mesh kernel produced; the host never
//! learns the counts and never needs to.

use crate::constants::shader_paths;
use crate::error::EngineResult;
use crate::gpu::context::GpuContext;
use crate::gpu::shaders::create_shader_module;
use crate::meshing::IndirectDrawAssembler;
use crate::renderer::camera::CameraUniform;
use crate::renderer::vertex::WorldVertex;

/// Depth format the world pipeline is built against
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Render pipeline and camera binding for meshed world geometry
pub struct ChunkRenderer {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl ChunkRenderer {
    pub fn new(ctx: &GpuContext, color_format: wgpu::TextureFormat) -> EngineResult<Self> {
        ctx.ensure_device("chunk renderer creation")?;
        let device = ctx.device();

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniform Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<CameraUniform>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let shader = create_shader_module(device, shader_paths::WORLD)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("World Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("World Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[WorldVertex::buffer_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        log::info!("[ChunkRenderer] World render pipeline created");

        Ok(Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
        })
    }

    /// Upload this frame's camera uniform.
    pub fn update_camera(&self, queue: &wgpu::Queue, uniform: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(uniform));
    }

    /// Record one indexed-indirect draw per chunk slot.
    ///
    /// The pass must target a color attachment of the pipeline's format and
    /// a [`DEPTH_FORMAT`] depth attachment.
    pub fn draw_all<'pass>(
        &'pass self,
        pass: &mut wgpu::RenderPass<'pass>,
        assembler: &'pass IndirectDrawAssembler,
    ) {
        let layout = assembler.slot_layout();

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);

        for slot in 0..layout.chunk_count() {
            pass.set_vertex_buffer(0, assembler.vertex_buffer().slice(layout.vertex_range(slot)));
            pass.set_index_buffer(
                assembler.index_buffer().slice(layout.index_range(slot)),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed_indirect(assembler.indirect_buffer(), layout.param_offset(slot));
        }

        log::trace!(
            "[ChunkRenderer] Recorded {} indirect draws",
            layout.chunk_count()
        );
    }
}
