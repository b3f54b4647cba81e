//! Host-side chunk storage.
//!
//! Chunks live in a dense arena indexed by slot; the slot index is what maps
//! a chunk onto its byte ranges in the shared GPU buffers, so it is stable
//! for the lifetime of the store. No GPU state lives here.

use crate::error::{EngineError, EngineResult};
use crate::world::chunk::{Chunk, ChunkPos};

/// Dense arena of resident chunks with per-slot dirty flags
pub struct ChunkStore {
    chunks: Vec<Chunk>,
    dirty: Vec<bool>,
}

impl ChunkStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            dirty: Vec::new(),
        }
    }

    /// Create a store of `positions.len()` all-air chunks, one per position,
    /// every slot marked dirty so the first mesh pass covers the world.
    pub fn with_positions(positions: &[ChunkPos]) -> Self {
        let chunks: Vec<Chunk> = positions.iter().map(|&pos| Chunk::new(pos)).collect();
        let dirty = vec![true; chunks.len()];
        log::info!("[ChunkStore] Created store with {} chunks", chunks.len());
        Self { chunks, dirty }
    }

    /// Append a chunk, returning its slot index.
    pub fn insert(&mut self, chunk: Chunk) -> u32 {
        let slot = self.chunks.len() as u32;
        self.chunks.push(chunk);
        self.dirty.push(true);
        slot
    }

    pub fn len(&self) -> u32 {
        self.chunks.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, slot: u32) -> EngineResult<&Chunk> {
        self.chunks
            .get(slot as usize)
            .ok_or(EngineError::ChunkSlotOutOfRange {
                slot,
                chunk_count: self.chunks.len() as u32,
            })
    }

    pub fn get_mut(&mut self, slot: u32) -> EngineResult<&mut Chunk> {
        let chunk_count = self.chunks.len() as u32;
        self.chunks
            .get_mut(slot as usize)
            .ok_or(EngineError::ChunkSlotOutOfRange { slot, chunk_count })
    }

    /// Flag a chunk for remeshing on the next mesh pass. Does not mesh
    /// synchronously.
    pub fn mark_dirty(&mut self, slot: u32) -> EngineResult<()> {
        match self.dirty.get_mut(slot as usize) {
            Some(flag) => {
                *flag = true;
                Ok(())
            }
            None => Err(EngineError::ChunkSlotOutOfRange {
                slot,
                chunk_count: self.chunks.len() as u32,
            }),
        }
    }

    /// Flag every resident chunk for remeshing.
    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    pub fn is_dirty(&self, slot: u32) -> bool {
        self.dirty.get(slot as usize).copied().unwrap_or(false)
    }

    /// Collect and clear the dirty set, in slot order.
    pub fn drain_dirty(&mut self) -> Vec<u32> {
        let slots: Vec<u32> = self
            .dirty
            .iter()
            .enumerate()
            .filter_map(|(slot, &dirty)| dirty.then_some(slot as u32))
            .collect();
        self.dirty.fill(false);
        slots
    }
}

impl Default for ChunkStore {
    fn default() -> Self {
        Self::new()
    }
}
