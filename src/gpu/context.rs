//! GPU device context.
//!
//! An explicit context object owns the device, queue and the device limits
//! the layout math depends on. Components borrow it; nothing in the engine
//! is a process-wide static, so several worlds (or tests) can hold their own
//! contexts side by side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};

/// Owns the wgpu device and queue plus cached limits.
pub struct GpuContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    /// Minimum storage-buffer offset granularity reported by the device
    storage_alignment: u32,
    /// Set by the uncaptured-error handler when the device is gone
    device_lost: Arc<AtomicBool>,
}

impl GpuContext {
    /// Wrap an externally negotiated device and queue.
    ///
    /// Surface and adapter negotiation belong to the caller; the engine only
    /// needs the device, the queue, and the limits.
    pub fn from_device(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let storage_alignment = device.limits().min_storage_buffer_offset_alignment;
        let device_lost = Arc::new(AtomicBool::new(false));

        let lost_flag = device_lost.clone();
        device.on_uncaptured_error(Box::new(move |error| match error {
            wgpu::Error::OutOfMemory { .. } => {
                log::error!("[GpuContext] GPU out of memory, treating device as lost");
                lost_flag.store(true, Ordering::Relaxed);
            }
            wgpu::Error::Validation { description, .. } => {
                log::error!("[GpuContext] GPU validation error: {}", description);
            }
        }));

        log::info!(
            "[GpuContext] Device ready (storage offset alignment: {} bytes)",
            storage_alignment
        );

        Self {
            device,
            queue,
            storage_alignment,
            device_lost,
        }
    }

    /// Acquire a headless device with default limits.
    ///
    /// Used by tests and offline tools; windowed callers negotiate their own
    /// device against a surface and use [`GpuContext::from_device`].
    pub fn new_headless() -> EngineResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(EngineError::AdapterNotFound)?;

        log::info!("[GpuContext] Using adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("ember-engine device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))
        .map_err(|e| EngineError::DeviceRequestFailed {
            error: e.to_string(),
        })?;

        Ok(Self::from_device(Arc::new(device), Arc::new(queue)))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Minimum storage-buffer offset alignment, read from the device limits.
    pub fn storage_alignment(&self) -> u32 {
        self.storage_alignment
    }

    /// Whether the device has been reported lost.
    pub fn is_device_lost(&self) -> bool {
        self.device_lost.load(Ordering::Relaxed)
    }

    /// Fail fast if the device is gone, naming the operation in flight.
    pub fn ensure_device(&self, during: &str) -> EngineResult<()> {
        if self.is_device_lost() {
            return Err(EngineError::DeviceLost {
                during: during.to_string(),
            });
        }
        Ok(())
    }
}
