//! Swapchain lifecycle: acquire, resize, present-mode switching.

use crate::config::RenderSettings;
use crate::errors::{ForgeError, Result};
use crate::gpu::context::GpuContext;

/// Owns a `wgpu::Surface` and its current configuration, and turns the raw
/// `SurfaceTexture` lifecycle into the handful of operations a job graph
/// needs each frame.
pub struct RenderSurface {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    settings: RenderSettings,
}

impl RenderSurface {
    pub fn new(
        context: &GpuContext,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
        settings: RenderSettings,
    ) -> Result<Self> {
        let mut config = surface
            .get_default_config(&context.adapter, width.max(1), height.max(1))
            .ok_or(ForgeError::UnsupportedDevice("surface incompatible with adapter".into()))?;
        config.present_mode = Self::present_mode_for(&surface, &context.adapter, settings.vsync);
        surface.configure(&context.device, &config);
        Ok(Self { surface, config, settings })
    }

    fn present_mode_for(surface: &wgpu::Surface<'_>, adapter: &wgpu::Adapter, vsync: bool) -> wgpu::PresentMode {
        let capabilities = surface.get_capabilities(adapter);
        let wanted = if vsync { wgpu::PresentMode::AutoVsync } else { wgpu::PresentMode::AutoNoVsync };
        if capabilities.present_modes.contains(&wanted) {
            wanted
        } else {
            capabilities.present_modes.first().copied().unwrap_or(wgpu::PresentMode::Fifo)
        }
    }

    pub fn resize(&mut self, context: &GpuContext, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&context.device, &self.config);
    }

    pub fn set_vsync(&mut self, context: &GpuContext, vsync: bool) {
        self.settings.vsync = vsync;
        self.config.present_mode = Self::present_mode_for(&self.surface, &context.adapter, vsync);
        self.surface.configure(&context.device, &self.config);
    }

    /// Acquires the next swapchain texture. Ordinary `Outdated`/`Timeout`
    /// conditions are surfaced as [`ForgeError`] rather than panicking — the
    /// caller reconfigures and retries the frame.
    pub fn acquire(&self) -> Result<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => Err(ForgeError::OutOfDateSwapchain),
            Err(wgpu::SurfaceError::Timeout) => Err(ForgeError::SurfaceTimeout),
            Err(wgpu::SurfaceError::Other) => Err(ForgeError::SurfaceLost),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(ForgeError::UnsupportedDevice("surface acquire ran out of memory".into()))
            }
        }
    }

    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.config.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.config.height
    }

    #[must_use]
    pub fn vsync(&self) -> bool {
        self.settings.vsync
    }

    #[must_use]
    pub fn clear_color(&self) -> wgpu::Color {
        self.settings.clear_color
    }

    #[must_use]
    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.settings.depth_format
    }
}
