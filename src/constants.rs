//! Centralized constants for the meshing and rendering pipeline.
//!
//! Buffer sizes and strides are derived from these values in exactly one
//! place (`meshing::layout`); nothing else should repeat the arithmetic.

/// Core voxel grid dimensions
pub mod core {
    /// Side length of a cubic chunk, in voxels
    pub const CHUNK_SIZE: u32 = 16;

    /// CHUNK_SIZE squared, the Y stride of the linear block index
    pub const CHUNK_SIZE_SQ: u32 = CHUNK_SIZE * CHUNK_SIZE;

    /// Total voxels in one chunk
    pub const VOXELS_PER_CHUNK: u32 = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

    /// Cells covered per compute invocation along each axis.
    /// The mesh kernel is compiled with @workgroup_size(4, 4, 4); the
    /// dispatch shape is CHUNK_SIZE / MESH_WORKGROUP_SIZE per axis.
    pub const MESH_WORKGROUP_SIZE: u32 = 4;
}

/// Worst-case geometry bounds used to size per-chunk output ranges
pub mod geometry {
    use super::core::VOXELS_PER_CHUNK;

    /// Faces a single voxel can emit
    pub const FACES_PER_VOXEL: u32 = 6;

    /// Vertices per emitted face (one quad)
    pub const VERTICES_PER_FACE: u32 = 4;

    /// Indices per emitted face (two triangles)
    pub const INDICES_PER_FACE: u32 = 6;

    /// Upper bound on vertices one chunk can produce
    pub const MAX_VERTICES_PER_CHUNK: u32 =
        VOXELS_PER_CHUNK * FACES_PER_VOXEL * VERTICES_PER_FACE;

    /// Upper bound on indices one chunk can produce
    pub const MAX_INDICES_PER_CHUNK: u32 =
        VOXELS_PER_CHUNK * FACES_PER_VOXEL * INDICES_PER_FACE;
}

/// Device limit fallbacks used before a real device is available
pub mod gpu_limits {
    /// Storage-buffer offset granularity guaranteed by the wgpu defaults.
    /// The real value is always read from `wgpu::Device::limits()`; this
    /// exists for host-side layout math in tests that never touch a device.
    pub const DEFAULT_STORAGE_BUFFER_OFFSET_ALIGNMENT: u32 = 256;
}

/// Logical paths understood by the shader resource loader
pub mod shader_paths {
    /// Compute kernel that meshes one chunk
    pub const MESH: &str = "shaders/mesh.wgsl";

    /// Render pipeline for meshed world geometry
    pub const WORLD: &str = "shaders/world.wgsl";
}
