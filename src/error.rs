//! Error handling for the meshing and rendering pipeline.
//!
//! Three classes of failure are kept distinct: resource-creation failures
//! (fatal, abort initialization), device loss during operation (fatal, no
//! retry), and offset/alignment contract violations, which are programming
//! bugs and are enforced with asserts at the call site rather than
//! propagated as recoverable errors. Every diagnostic names the chunk slot
//! it concerns.

use std::fmt;

/// Main error type for the engine
#[derive(Debug)]
pub enum EngineError {
    // Resource errors (fatal during initialization)
    BufferCreationFailed {
        label: String,
        size: u64,
    },
    ShaderNotFound {
        path: String,
    },
    ShaderCompilation {
        path: String,
        error: String,
    },

    // World errors
    ChunkSlotOutOfRange {
        slot: u32,
        chunk_count: u32,
    },
    InvalidGridLength {
        slot: u32,
        expected: usize,
        found: usize,
    },

    // Device errors (fatal during operation)
    AdapterNotFound,
    DeviceRequestFailed {
        error: String,
    },
    DeviceLost {
        during: String,
    },

    // Configuration errors
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::BufferCreationFailed { label, size } => {
                write!(f, "Buffer creation failed: '{}' ({} bytes)", label, size)
            }
            EngineError::ShaderNotFound { path } => {
                write!(f, "Shader resource not found: {}", path)
            }
            EngineError::ShaderCompilation { path, error } => {
                write!(f, "Shader compilation failed for {}: {}", path, error)
            }

            EngineError::ChunkSlotOutOfRange { slot, chunk_count } => write!(
                f,
                "Chunk slot {} out of range: store holds {} chunks",
                slot, chunk_count
            ),
            EngineError::InvalidGridLength {
                slot,
                expected,
                found,
            } => write!(
                f,
                "Chunk slot {} has invalid grid length: expected {}, found {}",
                slot, expected, found
            ),

            EngineError::AdapterNotFound => write!(f, "No compatible GPU adapter found"),
            EngineError::DeviceRequestFailed { error } => {
                write!(f, "GPU device request failed: {}", error)
            }
            EngineError::DeviceLost { during } => {
                write!(f, "GPU device lost during {}", during)
            }

            EngineError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "Invalid config: {} = {} ({})", field, value, reason),
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type used throughout the engine
pub type EngineResult<T> = Result<T, EngineError>;
