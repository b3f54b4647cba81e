//! Byte layout of the shared per-world geometry buffers.
//!
//! Every chunk slot owns three byte ranges, one in each of the vertex,
//! index and draw-parameter buffers, at `slot * stride`. The strides are
//! worst-case sized (every voxel emitting all six faces) and rounded up to
//! the device's storage-buffer offset alignment, so any slot's offset is a
//! legal bind offset, copy destination and indirect-draw offset. The actual
//! emitted counts live only in the draw-parameter block on the GPU; the host
//! never reads them back.

use bytemuck::{Pod, Zeroable};
use std::ops::Range;

use crate::constants::geometry::{MAX_INDICES_PER_CHUNK, MAX_VERTICES_PER_CHUNK};
use crate::gpu::alignment::{aligned_stride, is_aligned};
use crate::renderer::vertex::VERTEX_SIZE;

/// Indexed-indirect draw argument block plus the mesh kernel's scratch
/// vertex allocator.
///
/// The first five fields are exactly the layout `draw_indexed_indirect`
/// reads; `vertex_count` is only ever touched by the kernel's atomics.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawParameters {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: u32,
    pub first_instance: u32,
    pub vertex_count: u32,
}

/// Byte size of the draw-parameter block
pub const DRAW_PARAMETERS_SIZE: u64 = std::mem::size_of::<DrawParameters>() as u64;

static_assertions::const_assert_eq!(DRAW_PARAMETERS_SIZE, 24);

impl DrawParameters {
    /// State written before every (re-)mesh: zero counts, one instance.
    /// `instance_count` must be re-set on every reset because the whole
    /// block is rewritten at once.
    pub const RESET: Self = Self {
        index_count: 0,
        instance_count: 1,
        first_index: 0,
        base_vertex: 0,
        first_instance: 0,
        vertex_count: 0,
    };
}

/// Per-slot strides and offsets for the shared geometry buffers
#[derive(Debug, Clone, Copy)]
pub struct MeshSlotLayout {
    chunk_count: u32,
    alignment: u64,
    vertex_stride: u64,
    index_stride: u64,
    param_stride: u64,
}

impl MeshSlotLayout {
    /// Compute the layout for `chunk_count` slots on a device whose
    /// storage-buffer offset alignment is `storage_alignment`.
    pub fn new(chunk_count: u32, storage_alignment: u32) -> Self {
        assert!(chunk_count > 0, "layout requires at least one chunk slot");
        let alignment = storage_alignment as u64;

        // One aligned_stride for every stride; bind offsets and copy
        // destinations are all derived from these three values.
        let vertex_stride = aligned_stride(MAX_VERTICES_PER_CHUNK as u64 * VERTEX_SIZE, alignment);
        let index_stride = aligned_stride(MAX_INDICES_PER_CHUNK as u64 * 4, alignment);
        let param_stride = aligned_stride(DRAW_PARAMETERS_SIZE, alignment);

        log::debug!(
            "[MeshSlotLayout] {} slots, strides: vertex {} B, index {} B, params {} B (alignment {})",
            chunk_count,
            vertex_stride,
            index_stride,
            param_stride,
            alignment
        );

        Self {
            chunk_count,
            alignment,
            vertex_stride,
            index_stride,
            param_stride,
        }
    }

    pub fn chunk_count(&self) -> u32 {
        self.chunk_count
    }

    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    pub fn vertex_stride(&self) -> u64 {
        self.vertex_stride
    }

    pub fn index_stride(&self) -> u64 {
        self.index_stride
    }

    pub fn param_stride(&self) -> u64 {
        self.param_stride
    }

    /// Total size of the shared vertex buffer
    pub fn vertex_buffer_size(&self) -> u64 {
        self.vertex_stride * self.chunk_count as u64
    }

    /// Total size of the shared index buffer
    pub fn index_buffer_size(&self) -> u64 {
        self.index_stride * self.chunk_count as u64
    }

    /// Total size of the shared draw-parameter buffer
    pub fn param_buffer_size(&self) -> u64 {
        self.param_stride * self.chunk_count as u64
    }

    #[inline]
    fn check_slot(&self, slot: u32) {
        assert!(
            slot < self.chunk_count,
            "slot {} out of range for {}-chunk layout",
            slot,
            self.chunk_count
        );
    }

    /// Base byte offset of a slot's vertex range
    pub fn vertex_offset(&self, slot: u32) -> u64 {
        self.check_slot(slot);
        let offset = slot as u64 * self.vertex_stride;
        assert!(
            is_aligned(offset, self.alignment),
            "vertex offset {} for slot {} violates alignment {}",
            offset,
            slot,
            self.alignment
        );
        offset
    }

    /// Base byte offset of a slot's index range
    pub fn index_offset(&self, slot: u32) -> u64 {
        self.check_slot(slot);
        let offset = slot as u64 * self.index_stride;
        assert!(
            is_aligned(offset, self.alignment),
            "index offset {} for slot {} violates alignment {}",
            offset,
            slot,
            self.alignment
        );
        offset
    }

    /// Base byte offset of a slot's draw-parameter block
    pub fn param_offset(&self, slot: u32) -> u64 {
        self.check_slot(slot);
        let offset = slot as u64 * self.param_stride;
        assert!(
            is_aligned(offset, self.alignment),
            "draw-parameter offset {} for slot {} violates alignment {}",
            offset,
            slot,
            self.alignment
        );
        offset
    }

    pub fn vertex_range(&self, slot: u32) -> Range<u64> {
        let base = self.vertex_offset(slot);
        base..base + self.vertex_stride
    }

    pub fn index_range(&self, slot: u32) -> Range<u64> {
        let base = self.index_offset(slot);
        base..base + self.index_stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::gpu_limits::DEFAULT_STORAGE_BUFFER_OFFSET_ALIGNMENT;

    fn layout(n: u32) -> MeshSlotLayout {
        MeshSlotLayout::new(n, DEFAULT_STORAGE_BUFFER_OFFSET_ALIGNMENT)
    }

    #[test]
    fn test_reset_block_draws_one_instance_of_nothing() {
        let reset = DrawParameters::RESET;
        assert_eq!(reset.index_count, 0);
        assert_eq!(reset.vertex_count, 0);
        assert_eq!(reset.instance_count, 1);
        assert_eq!(reset.first_index, 0);
        assert_eq!(reset.base_vertex, 0);
        assert_eq!(reset.first_instance, 0);
    }

    #[test]
    fn test_every_param_offset_is_aligned() {
        let layout = layout(37);
        for slot in 0..37 {
            assert!(is_aligned(layout.param_offset(slot), 256));
        }
    }

    #[test]
    fn test_every_bind_offset_is_aligned() {
        let layout = layout(16);
        for slot in 0..16 {
            assert!(is_aligned(layout.vertex_offset(slot), 256));
            assert!(is_aligned(layout.index_offset(slot), 256));
        }
    }

    #[test]
    fn test_param_stride_is_rounded_up_from_block_size() {
        let layout = layout(4);
        assert!(layout.param_stride() >= DRAW_PARAMETERS_SIZE);
        assert_eq!(layout.param_stride(), 256);
    }

    #[test]
    fn test_strides_cover_worst_case_geometry() {
        let layout = layout(1);
        assert!(layout.vertex_stride() >= MAX_VERTICES_PER_CHUNK as u64 * VERTEX_SIZE);
        assert!(layout.index_stride() >= MAX_INDICES_PER_CHUNK as u64 * 4);
    }

    #[test]
    fn test_slot_ranges_never_overlap() {
        let layout = layout(8);
        for i in 0..8 {
            for j in 0..8 {
                if i == j {
                    continue;
                }
                let (vi, vj) = (layout.vertex_range(i), layout.vertex_range(j));
                assert!(vi.end <= vj.start || vj.end <= vi.start);
                let (ii, ij) = (layout.index_range(i), layout.index_range(j));
                assert!(ii.end <= ij.start || ij.end <= ii.start);
                let (pi, pj) = (
                    layout.param_offset(i)..layout.param_offset(i) + layout.param_stride(),
                    layout.param_offset(j)..layout.param_offset(j) + layout.param_stride(),
                );
                assert!(pi.end <= pj.start || pj.end <= pi.start);
            }
        }
    }

    #[test]
    fn test_last_slot_stays_inside_buffers() {
        let layout = layout(5);
        assert_eq!(layout.vertex_range(4).end, layout.vertex_buffer_size());
        assert_eq!(layout.index_range(4).end, layout.index_buffer_size());
        assert_eq!(
            layout.param_offset(4) + layout.param_stride(),
            layout.param_buffer_size()
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_slot_panics() {
        layout(2).vertex_offset(2);
    }

    #[test]
    fn test_layout_honors_unusual_alignment() {
        let layout = MeshSlotLayout::new(3, 64);
        for slot in 0..3 {
            assert!(is_aligned(layout.param_offset(slot), 64));
        }
    }
}
