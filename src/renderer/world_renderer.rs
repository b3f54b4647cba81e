//! World renderer facade.
//!
//! Wires the store, uploader, kernel, assembler and chunk renderer together
//! behind the four-call surface the frame loop uses: create, mesh dirty
//! chunks, draw, dispose. Everything hangs off the caller's [`GpuContext`];
//! there are no process-wide singletons, so multiple worlds can coexist.

use anyhow::Result;

use crate::constants::core::VOXELS_PER_CHUNK;
use crate::constants::geometry::MAX_VERTICES_PER_CHUNK;
use crate::error::EngineResult;
use crate::gpu::context::GpuContext;
use crate::meshing::{IndirectDrawAssembler, MeshSlotLayout, MeshingKernel, StagingUploader};
use crate::renderer::camera::CameraUniform;
use crate::renderer::chunk_renderer::ChunkRenderer;
use crate::renderer::vertex::VERTEX_SIZE;
use crate::world::{ChunkPos, ChunkStore};

/// Largest per-buffer allocation the worst-case sizing may request
const MAX_GEOMETRY_BUFFER_SIZE: u64 = 256 * 1024 * 1024;

/// World renderer configuration
#[derive(Debug, Clone)]
pub struct WorldRendererConfig {
    /// Chunk grid positions; one slot per entry
    pub chunk_positions: Vec<ChunkPos>,
    /// Format of the color target the world pipeline renders to
    pub color_format: wgpu::TextureFormat,
}

impl WorldRendererConfig {
    /// Validate configuration parameters before any GPU allocation.
    pub fn validate(&self) -> Result<()> {
        let chunk_count = self.chunk_positions.len() as u64;

        if chunk_count == 0 {
            return Err(anyhow::anyhow!(
                "WorldRendererConfig: chunk_positions cannot be empty"
            ));
        }

        // Worst-case vertex buffer dominates; both buffer sets share the
        // same sizing so checking one bound covers all allocations
        let vertex_buffer_size = chunk_count * MAX_VERTICES_PER_CHUNK as u64 * VERTEX_SIZE;
        if vertex_buffer_size > MAX_GEOMETRY_BUFFER_SIZE {
            let max_chunks =
                MAX_GEOMETRY_BUFFER_SIZE / (MAX_VERTICES_PER_CHUNK as u64 * VERTEX_SIZE);
            return Err(anyhow::anyhow!(
                "WorldRendererConfig: {} chunks need a {} MB vertex buffer (limit {} MB); reduce to {} chunks or fewer",
                chunk_count,
                vertex_buffer_size / (1024 * 1024),
                MAX_GEOMETRY_BUFFER_SIZE / (1024 * 1024),
                max_chunks
            ));
        }

        log::info!(
            "[WorldRendererConfig] Validated: {} chunks, {} voxels each, worst-case vertex buffer {} MB",
            chunk_count,
            VOXELS_PER_CHUNK,
            vertex_buffer_size / (1024 * 1024)
        );
        Ok(())
    }
}

/// Owns the full meshing and drawing pipeline for one world
pub struct WorldRenderer {
    store: ChunkStore,
    uploader: StagingUploader,
    kernel: MeshingKernel,
    assembler: IndirectDrawAssembler,
    renderer: ChunkRenderer,
}

impl WorldRenderer {
    /// Build the pipeline and allocate every shared buffer up front.
    pub fn new(ctx: &GpuContext, config: &WorldRendererConfig) -> EngineResult<Self> {
        config
            .validate()
            .map_err(|e| crate::error::EngineError::InvalidConfig {
                field: "chunk_positions".to_string(),
                value: config.chunk_positions.len().to_string(),
                reason: e.to_string(),
            })?;
        ctx.ensure_device("world renderer creation")?;

        let store = ChunkStore::with_positions(&config.chunk_positions);
        let layout = MeshSlotLayout::new(store.len(), ctx.storage_alignment());

        let uploader = StagingUploader::new(ctx)?;
        let kernel = MeshingKernel::new(ctx, layout, uploader.input_buffer())?;
        let assembler = IndirectDrawAssembler::new(ctx, layout)?;
        let renderer = ChunkRenderer::new(ctx, config.color_format)?;

        log::info!(
            "[WorldRenderer] Initialized with {} chunk slots",
            store.len()
        );

        Ok(Self {
            store,
            uploader,
            kernel,
            assembler,
            renderer,
        })
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ChunkStore {
        &mut self.store
    }

    pub fn assembler(&self) -> &IndirectDrawAssembler {
        &self.assembler
    }

    /// Re-mesh every dirty chunk, one queue submission per chunk.
    ///
    /// The staging and input buffers are shared across chunks, so each
    /// chunk's reset, staging write, input copy, dispatch and slot copies
    /// go out as one submission; queue order then guarantees chunk i's
    /// dispatch and copies complete their reads before chunk i+1's upload
    /// overwrites the shared buffers.
    ///
    /// Returns the number of chunks meshed.
    pub fn mesh_all_dirty(&mut self, ctx: &GpuContext) -> EngineResult<u32> {
        ctx.ensure_device("mesh pass")?;

        let dirty = self.store.drain_dirty();
        if dirty.is_empty() {
            return Ok(0);
        }

        log::debug!("[WorldRenderer] Meshing {} dirty chunks", dirty.len());

        for &slot in &dirty {
            let chunk = self.store.get(slot)?;

            self.kernel.reset_draw_params(ctx.queue(), slot);

            let mut encoder =
                ctx.device()
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("Chunk Mesh Encoder"),
                    });

            self.uploader.upload(ctx.queue(), &mut encoder, chunk);

            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Chunk Mesh Pass"),
                    timestamp_writes: None,
                });
                self.kernel.encode_mesh(&mut pass, slot);
            }

            self.assembler.encode_copy(&mut encoder, &self.kernel, slot);

            ctx.queue().submit(std::iter::once(encoder.finish()));
            ctx.ensure_device("mesh dispatch")?;
        }

        Ok(dirty.len() as u32)
    }

    /// Upload this frame's camera uniform.
    pub fn update_camera(&self, ctx: &GpuContext, uniform: &CameraUniform) {
        self.renderer.update_camera(ctx.queue(), uniform);
    }

    /// Record one indexed-indirect draw per resident chunk.
    pub fn draw_all<'pass>(&'pass self, pass: &mut wgpu::RenderPass<'pass>) {
        self.renderer.draw_all(pass, &self.assembler);
    }

    /// Tear the pipeline down. Buffers and pipelines are released on drop;
    /// this exists so the frame loop can log an orderly shutdown.
    pub fn dispose(self) {
        log::info!(
            "[WorldRenderer] Disposing pipeline for {} chunks",
            self.store.len()
        );
        drop(self);
    }
}
