//! Offset alignment arithmetic.
//!
//! Every byte offset handed to the GPU (bind-group dynamic offsets, copy
//! destinations, indirect-draw offsets) is derived from strides computed by
//! `aligned_stride`. Keeping the rounding in one function is what guarantees
//! the mesh kernel's bind offsets and the assembler's copy destinations can
//! never drift apart.

/// Round `raw_size` up to the next multiple of `align`.
///
/// `align` must be a nonzero power of two, which holds for every wgpu
/// device limit this is used with.
#[inline]
pub const fn aligned_stride(raw_size: u64, align: u64) -> u64 {
    assert!(align != 0 && align.is_power_of_two());
    (raw_size + align - 1) & !(align - 1)
}

/// Whether `offset` sits on an `align` boundary.
#[inline]
pub const fn is_aligned(offset: u64, align: u64) -> bool {
    offset % align == 0
}
