//! Indirect-draw assembly.
//!
//! Owns the render-facing shared buffers and relocates each chunk's freshly
//! meshed geometry out of the kernel's output buffers into the chunk's
//! permanent slot, with device-side copies recorded in the same submission
//! as the meshing dispatch. Copy destinations use the same slot strides as
//! the kernel's bind offsets, so the renderer can address every chunk
//! uniformly.

use crate::error::EngineResult;
use crate::gpu::context::GpuContext;
use crate::meshing::kernel::MeshingKernel;
use crate::meshing::layout::{MeshSlotLayout, DRAW_PARAMETERS_SIZE};

/// Render-facing shared vertex/index/draw-parameter buffers
pub struct IndirectDrawAssembler {
    layout: MeshSlotLayout,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    indirect_buffer: wgpu::Buffer,
}

impl IndirectDrawAssembler {
    pub fn new(ctx: &GpuContext, layout: MeshSlotLayout) -> EngineResult<Self> {
        ctx.ensure_device("indirect draw assembler creation")?;
        let device = ctx.device();

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("World Vertex Buffer"),
            size: layout.vertex_buffer_size(),
            usage: wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("World Index Buffer"),
            size: layout.index_buffer_size(),
            usage: wgpu::BufferUsages::INDEX
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        // Freshly created buffers are zeroed, so an unmeshed slot reads as
        // index_count 0 and draws nothing.
        let indirect_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("World Indirect Draw Buffer"),
            size: layout.param_buffer_size(),
            usage: wgpu::BufferUsages::INDIRECT
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        log::info!(
            "[IndirectDrawAssembler] World buffers ready for {} chunk slots",
            layout.chunk_count()
        );

        Ok(Self {
            layout,
            vertex_buffer,
            index_buffer,
            indirect_buffer,
        })
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn indirect_buffer(&self) -> &wgpu::Buffer {
        &self.indirect_buffer
    }

    pub fn slot_layout(&self) -> &MeshSlotLayout {
        &self.layout
    }

    /// Record the three copies that move `slot`'s kernel output into its
    /// render slot. Must be recorded after the slot's dispatch on the same
    /// encoder; queue program order is the only ordering in play.
    pub fn encode_copy(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        kernel: &MeshingKernel,
        slot: u32,
    ) {
        let vertex_offset = self.layout.vertex_offset(slot);
        let index_offset = self.layout.index_offset(slot);
        let param_offset = self.layout.param_offset(slot);

        encoder.copy_buffer_to_buffer(
            kernel.vertex_output(),
            vertex_offset,
            &self.vertex_buffer,
            vertex_offset,
            self.layout.vertex_stride(),
        );
        encoder.copy_buffer_to_buffer(
            kernel.index_output(),
            index_offset,
            &self.index_buffer,
            index_offset,
            self.layout.index_stride(),
        );
        // Only the argument block itself; the rest of the stride is padding
        encoder.copy_buffer_to_buffer(
            kernel.param_output(),
            param_offset,
            &self.indirect_buffer,
            param_offset,
            DRAW_PARAMETERS_SIZE,
        );

        log::trace!(
            "[IndirectDrawAssembler] Relocated slot {} (params at offset {})",
            slot,
            param_offset
        );
    }
}
