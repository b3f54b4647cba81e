//! Chunk data: a fixed cubic grid of block ids plus its grid position.
//!
//! The GPU-facing image of a chunk is a fixed-size header (the chunk
//! position, padded to 16 bytes) followed by one u32 word per voxel. Header
//! and grid lengths are identical for every chunk, which is what lets the
//! meshing input buffer be reused across chunks without resizing.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::constants::core::{CHUNK_SIZE, CHUNK_SIZE_SQ, VOXELS_PER_CHUNK};
use crate::world::block::BlockId;

/// Position of a chunk in chunk-space grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Fixed-size header prepended to the block grid on upload.
/// Must match the `ChunkInput` struct in mesh.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ChunkHeader {
    pub chunk_x: i32,
    pub chunk_y: i32,
    pub chunk_z: i32,
    pub _pad: i32,
}

/// Bytes of the upload header
pub const CHUNK_HEADER_SIZE: u64 = std::mem::size_of::<ChunkHeader>() as u64;

/// Bytes of one chunk's GPU image: header plus one u32 per voxel
pub const CHUNK_UPLOAD_SIZE: u64 = CHUNK_HEADER_SIZE + VOXELS_PER_CHUNK as u64 * 4;

static_assertions::const_assert_eq!(CHUNK_HEADER_SIZE, 16);

/// A cubic grid of voxels plus its world-grid position
#[derive(Debug)]
pub struct Chunk {
    pos: ChunkPos,
    blocks: Box<[BlockId]>,
}

impl Chunk {
    /// Create an all-air chunk at `pos`.
    pub fn new(pos: ChunkPos) -> Self {
        Self {
            pos,
            blocks: vec![BlockId::AIR; VOXELS_PER_CHUNK as usize].into_boxed_slice(),
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Linear index into the block grid from voxel coordinates.
    #[inline]
    pub fn index_from_pos(x: u32, y: u32, z: u32) -> usize {
        debug_assert!(x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE);
        (CHUNK_SIZE_SQ * y + CHUNK_SIZE * z + x) as usize
    }

    #[inline]
    pub fn block(&self, x: u32, y: u32, z: u32) -> BlockId {
        self.blocks[Self::index_from_pos(x, y, z)]
    }

    #[inline]
    pub fn set_block(&mut self, x: u32, y: u32, z: u32, block: BlockId) {
        self.blocks[Self::index_from_pos(x, y, z)] = block;
    }

    /// Fill the whole grid with one block type.
    pub fn fill(&mut self, block: BlockId) {
        self.blocks.fill(block);
    }

    /// Serialize the header and grid into the staging image consumed by the
    /// mesh kernel. `out` is resized to exactly [`CHUNK_UPLOAD_SIZE`].
    pub fn write_upload_bytes(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(CHUNK_UPLOAD_SIZE as usize);

        let header = ChunkHeader {
            chunk_x: self.pos.x,
            chunk_y: self.pos.y,
            chunk_z: self.pos.z,
            _pad: 0,
        };
        out.extend_from_slice(bytemuck::bytes_of(&header));

        // Block ids widen to one u32 word per voxel for the WGSL array<u32>
        for block in self.blocks.iter() {
            out.extend_from_slice(&(block.0 as u32).to_le_bytes());
        }

        debug_assert_eq!(out.len() as u64, CHUNK_UPLOAD_SIZE);
    }
}
