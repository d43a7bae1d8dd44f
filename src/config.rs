//! Ambient configuration for the render graph, the GPU surface, and the
//! occlusion-culling pass.
//!
//! These mirror the teacher's `RenderSettings` (GPU selection, clear color,
//! vsync) but are split into three narrower structs along the seams this
//! core actually has: [`RenderSettings`] configures [`crate::RenderSurface`]
//! and [`crate::GpuContext`], [`JobGraphSettings`] configures
//! [`crate::JobGraph`]'s frame-in-flight ring, and [`CullingSettings`]
//! configures [`crate::culling::OcclusionCulling`]'s Hi-Z chain.

/// Configuration for the render surface and its clear state.
///
/// # Fields
///
/// | Field | Description | Default |
/// |-------|-------------|---------|
/// | `vsync` | Vertical sync enabled | `true` |
/// | `clear_color` | Background clear color | Black |
/// | `depth_format` | Depth buffer format | `Depth32Float` |
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Background clear color written at the start of each color attachment.
    pub clear_color: wgpu::Color,

    /// When `true`, presentation is capped to the display refresh rate.
    pub vsync: bool,

    /// Depth buffer texture format used by depth-tested stages.
    pub depth_format: wgpu::TextureFormat,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { clear_color: wgpu::Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }, vsync: true, depth_format: wgpu::TextureFormat::Depth32Float }
    }
}

/// Configuration for [`crate::JobGraph`]'s frame-in-flight ring.
#[derive(Debug, Clone, Copy)]
pub struct JobGraphSettings {
    /// Number of frame slots kept in flight. Declared resources and their
    /// descriptors are duplicated this many times so CPU recording never
    /// waits on a GPU-in-use resource.
    pub frames_in_flight: u32,
}

impl Default for JobGraphSettings {
    fn default() -> Self {
        Self { frames_in_flight: 3 }
    }
}

/// Configuration for [`crate::culling::OcclusionCulling`]'s Hi-Z chain.
#[derive(Debug, Clone, Copy)]
pub struct CullingSettings {
    /// Divisor applied to the screen resolution to get the base mip of the
    /// Hi-Z pyramid. A divisor of 2 starts the chain at half resolution.
    pub hi_z_base_resolution_divisor: u32,

    /// Number of material templates the gbuffer pass draws one visibility
    /// list per. Must match [`crate::bindless_scene::MATERIAL_TEMPLATE_COUNT`]
    /// — kept as a settings field so the count is documented and validated
    /// at construction time rather than silently assumed.
    pub material_template_count: usize,
}

impl Default for CullingSettings {
    fn default() -> Self {
        Self { hi_z_base_resolution_divisor: 2, material_template_count: crate::bindless_scene::MATERIAL_TEMPLATE_COUNT }
    }
}
