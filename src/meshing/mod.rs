//! GPU chunk meshing: slot layout, grid upload, kernel dispatch and
//! indirect-draw assembly.
//!
//! A (re-)mesh pass runs one submission per dirty chunk: reset the slot's
//! draw parameters, stage and copy the grid into the shared input buffer,
//! dispatch the kernel, then relocate the output into the render-facing
//! buffers. Nothing is ever read back to the host; the draw parameters are
//! consumed by `draw_indexed_indirect` on the GPU.

mod assembler;
mod kernel;
mod layout;
mod uploader;

pub use assembler::IndirectDrawAssembler;
pub use kernel::MeshingKernel;
pub use layout::{DrawParameters, MeshSlotLayout, DRAW_PARAMETERS_SIZE};
pub use uploader::StagingUploader;
