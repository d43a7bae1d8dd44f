//! Device and queue ownership.

use crate::errors::{ForgeError, Result};

/// Adapter/device selection knobs, mirroring the renderer-level settings the
/// job graph is configured with.
#[derive(Debug, Clone)]
pub struct GpuSettings {
    pub power_preference: wgpu::PowerPreference,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
}

impl Default for GpuSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

/// Owns the `wgpu::Instance`/`Adapter`/`Device`/`Queue` the rest of the crate
/// records and submits work against.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Requests an adapter and device compatible with `compatible_surface`
    /// (pass `None` for a headless/offscreen-only context).
    pub async fn new(
        settings: &GpuSettings,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ForgeError::AdapterRequestFailed(e.to_string()))?;

        if !adapter.features().contains(settings.required_features) {
            return Err(ForgeError::NoDeviceSupportsRequestedFeatures(settings.required_features));
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("forma device"),
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self { instance, adapter, device, queue })
    }

    #[must_use]
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }
}
