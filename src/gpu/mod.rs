//! GPU device plumbing: context ownership, offset alignment arithmetic and
//! shader resource loading.

pub mod alignment;
pub mod context;
pub mod shaders;

pub use alignment::{aligned_stride, is_aligned};
pub use context::GpuContext;
pub use shaders::{create_shader_module, load_shader_source};
