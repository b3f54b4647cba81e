//! Chunk grid upload.
//!
//! One CPU-writable staging buffer and one device-local input buffer, both
//! sized for exactly one chunk image, shared by every chunk. An upload
//! serializes the chunk into the staging buffer and records a device copy
//! into the input buffer; whatever the previous chunk left there is gone
//! the moment the copy is recorded. Only one meshing dispatch is in flight
//! at a time, so the single pair of buffers is sufficient.

use crate::error::EngineResult;
use crate::gpu::context::GpuContext;
use crate::world::{Chunk, CHUNK_UPLOAD_SIZE};

/// Uploads one chunk at a time into the shared kernel input buffer
pub struct StagingUploader {
    staging: wgpu::Buffer,
    input: wgpu::Buffer,
    /// Reused serialization scratch
    scratch: Vec<u8>,
}

impl StagingUploader {
    pub fn new(ctx: &GpuContext) -> EngineResult<Self> {
        ctx.ensure_device("staging uploader creation")?;

        let staging = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("Chunk Staging Buffer"),
            size: CHUNK_UPLOAD_SIZE,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let input = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("Chunk Mesh Input Buffer"),
            size: CHUNK_UPLOAD_SIZE,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!(
            "[StagingUploader] Created staging and input buffers ({} bytes each)",
            CHUNK_UPLOAD_SIZE
        );

        Ok(Self {
            staging,
            input,
            scratch: Vec::with_capacity(CHUNK_UPLOAD_SIZE as usize),
        })
    }

    /// The shared input buffer the mesh kernel binds as its block grid.
    pub fn input_buffer(&self) -> &wgpu::Buffer {
        &self.input
    }

    /// Stage `chunk` and record the device copy into the input buffer.
    ///
    /// The staging write lands when the queue flushes pending writes for the
    /// submission carrying `encoder`; callers must submit between uploads so
    /// consecutive chunks cannot clobber each other's staging bytes.
    pub fn upload(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        chunk: &Chunk,
    ) {
        chunk.write_upload_bytes(&mut self.scratch);
        queue.write_buffer(&self.staging, 0, &self.scratch);

        encoder.copy_buffer_to_buffer(&self.staging, 0, &self.input, 0, CHUNK_UPLOAD_SIZE);

        log::trace!(
            "[StagingUploader] Staged chunk at {:?} ({} bytes)",
            chunk.pos(),
            self.scratch.len()
        );
    }
}
