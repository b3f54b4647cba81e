//! Ember Engine - GPU-driven voxel chunk meshing and rendering
//!
//! Chunks are meshed entirely on the GPU: a compute kernel turns each
//! chunk's block grid into vertices, indices and an indexed-indirect draw
//! argument block, device-side copies assemble the results into shared
//! slot-strided world buffers, and every frame issues one indirect draw per
//! chunk. The host never reads triangle counts back; the GPU decides how
//! much geometry exists and draws exactly that much.

pub mod constants;
pub mod error;
pub mod gpu;
pub mod meshing;
pub mod renderer;
pub mod world;

pub use error::{EngineError, EngineResult};
pub use gpu::GpuContext;
pub use meshing::{
    DrawParameters, IndirectDrawAssembler, MeshSlotLayout, MeshingKernel, StagingUploader,
    DRAW_PARAMETERS_SIZE,
};
pub use renderer::{
    Camera, CameraUniform, ChunkRenderer, WorldRenderer, WorldRendererConfig, WorldVertex,
    DEPTH_FORMAT,
};
pub use world::{BlockId, Chunk, ChunkPos, ChunkStore};

// Re-export wgpu so callers drive render passes against the same version
pub use wgpu;
