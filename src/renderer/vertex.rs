//! Vertex format shared by the mesh kernel and the render pipeline.

use bytemuck::{Pod, Zeroable};

/// One meshed voxel-face vertex.
///
/// Scalar fields only: the WGSL mirror (`MeshVertex` in mesh.wgsl) must have
/// 4-byte alignment so the 32-byte stride matches on both sides.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct WorldVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Byte size of one vertex
pub const VERTEX_SIZE: u64 = std::mem::size_of::<WorldVertex>() as u64;

static_assertions::const_assert_eq!(VERTEX_SIZE, 32);

impl WorldVertex {
    /// Vertex buffer layout for the world render pipeline.
    pub const fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
        ];
        wgpu::VertexBufferLayout {
            array_stride: VERTEX_SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_covers_every_field() {
        let layout = WorldVertex::buffer_layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[2].offset, 24);
    }
}
