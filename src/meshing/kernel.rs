//! Mesh kernel orchestration.
//!
//! Owns the compute pipeline that turns one chunk's block grid into
//! geometry, plus the slot-strided output buffers the kernel writes. The
//! kernel is dispatched once per chunk; its three output bindings use
//! dynamic offsets so one bind group serves every slot. Offsets are taken
//! from [`MeshSlotLayout`], never recomputed here.

use crate::constants::core::{CHUNK_SIZE, MESH_WORKGROUP_SIZE};
use crate::constants::shader_paths;
use crate::error::EngineResult;
use crate::gpu::alignment::is_aligned;
use crate::gpu::context::GpuContext;
use crate::gpu::shaders::create_shader_module;
use crate::meshing::layout::{DrawParameters, MeshSlotLayout};
use crate::world::CHUNK_UPLOAD_SIZE;

/// Compute pipeline and kernel-owned output buffers for chunk meshing
pub struct MeshingKernel {
    layout: MeshSlotLayout,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,

    /// Kernel-written geometry, one worst-case slot per chunk
    vertex_output: wgpu::Buffer,
    index_output: wgpu::Buffer,
    /// Kernel-written draw parameters; also the atomic allocation counters
    param_output: wgpu::Buffer,
}

impl MeshingKernel {
    pub fn new(
        ctx: &GpuContext,
        layout: MeshSlotLayout,
        input_buffer: &wgpu::Buffer,
    ) -> EngineResult<Self> {
        ctx.ensure_device("mesh kernel creation")?;
        let device = ctx.device();

        let vertex_output = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Vertex Output"),
            size: layout.vertex_buffer_size(),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let index_output = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Index Output"),
            size: layout.index_buffer_size(),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let param_output = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Draw Parameter Output"),
            size: layout.param_buffer_size(),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::info!(
            "[MeshingKernel] Output buffers: vertex {} B, index {} B, params {} B ({} slots)",
            layout.vertex_buffer_size(),
            layout.index_buffer_size(),
            layout.param_buffer_size(),
            layout.chunk_count()
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Kernel Bind Group Layout"),
            entries: &[
                // Vertex output, bound one slot at a time
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(layout.vertex_stride()),
                    },
                    count: None,
                },
                // Index output, bound one slot at a time
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(layout.index_stride()),
                    },
                    count: None,
                },
                // Shared chunk input: header plus block grid
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(CHUNK_UPLOAD_SIZE),
                    },
                    count: None,
                },
                // Draw parameters with the atomic counters
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(layout.param_stride()),
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Kernel Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &vertex_output,
                        offset: 0,
                        size: wgpu::BufferSize::new(layout.vertex_stride()),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &index_output,
                        offset: 0,
                        size: wgpu::BufferSize::new(layout.index_stride()),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: input_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &param_output,
                        offset: 0,
                        size: wgpu::BufferSize::new(layout.param_stride()),
                    }),
                },
            ],
        });

        let shader = create_shader_module(device, shader_paths::MESH)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Kernel Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Mesh Kernel Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        Ok(Self {
            layout,
            pipeline,
            bind_group,
            vertex_output,
            index_output,
            param_output,
        })
    }

    pub fn vertex_output(&self) -> &wgpu::Buffer {
        &self.vertex_output
    }

    pub fn index_output(&self) -> &wgpu::Buffer {
        &self.index_output
    }

    pub fn param_output(&self) -> &wgpu::Buffer {
        &self.param_output
    }

    /// Write the reset draw-parameter block for `slot`, zeroing the counts
    /// and re-arming `instance_count = 1`.
    pub fn reset_draw_params(&self, queue: &wgpu::Queue, slot: u32) {
        let offset = self.layout.param_offset(slot);
        queue.write_buffer(
            &self.param_output,
            offset,
            bytemuck::bytes_of(&DrawParameters::RESET),
        );
        log::trace!(
            "[MeshingKernel] Reset draw parameters for slot {} at offset {}",
            slot,
            offset
        );
    }

    /// Record the meshing dispatch for `slot` on an open compute pass.
    ///
    /// The three output bindings rebind at the slot's byte offsets; the
    /// dispatch shape covers the chunk at one cell per invocation.
    pub fn encode_mesh<'pass>(&'pass self, pass: &mut wgpu::ComputePass<'pass>, slot: u32) {
        let vertex_offset = self.layout.vertex_offset(slot);
        let index_offset = self.layout.index_offset(slot);
        let param_offset = self.layout.param_offset(slot);

        // Dynamic offsets are u32 on the wire and must sit on the device's
        // storage alignment
        let offsets = [vertex_offset, index_offset, param_offset].map(|offset| {
            assert!(
                is_aligned(offset, self.layout.alignment()),
                "bind offset {} for slot {} violates alignment {}",
                offset,
                slot,
                self.layout.alignment()
            );
            assert!(
                offset <= u32::MAX as u64,
                "bind offset {} for slot {} exceeds dynamic-offset range",
                offset,
                slot
            );
            offset as u32
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &offsets);

        let groups = CHUNK_SIZE / MESH_WORKGROUP_SIZE;
        pass.dispatch_workgroups(groups, groups, groups);
    }

    pub fn slot_layout(&self) -> &MeshSlotLayout {
        &self.layout
    }
}
