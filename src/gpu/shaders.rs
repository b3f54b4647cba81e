//! Shader resource loading.
//!
//! Shader source is embedded in the binary and resolved by logical path, so
//! callers never deal with the filesystem. Unknown paths are an error that
//! names the missing resource.

use crate::constants::shader_paths;
use crate::error::{EngineError, EngineResult};

/// Return the WGSL source registered under `path`.
pub fn load_shader_source(path: &str) -> EngineResult<&'static str> {
    match path {
        shader_paths::MESH => Ok(include_str!("../../shaders/mesh.wgsl")),
        shader_paths::WORLD => Ok(include_str!("../../shaders/world.wgsl")),
        _ => Err(EngineError::ShaderNotFound {
            path: path.to_string(),
        }),
    }
}

/// Create a shader module from a registered logical path.
pub fn create_shader_module(
    device: &wgpu::Device,
    path: &str,
) -> EngineResult<wgpu::ShaderModule> {
    let source = load_shader_source(path)?;

    log::debug!("[Shaders] Creating shader module from {}", path);

    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(path),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }))
}
