//! The five rendering stages composed into one `RenderingJob` frame.
//!
//! The stage set is closed and editable only by the core, so it is dispatched
//! through a `match` over [`StageKind`] rather than a trait object — the
//! teacher's `RenderStage` enum-not-trait design, generalized to this core's
//! stage list.

mod ambient_occlusion;
mod gbuffer;
mod post_process;
mod shading;
mod shadow_map;

pub use ambient_occlusion::AmbientOcclusionStage;
pub use gbuffer::GBufferStage;
pub use post_process::PostProcessStage;
pub use shading::ShadingStage;
pub use shadow_map::ShadowMapStage;

use crate::errors::Result;
use crate::render_graph::BuildContext;

/// Per-frame knobs the stages read from; assembled by the host once per
/// frame from camera/settings state this core does not own.
#[derive(Debug, Clone, Copy)]
pub struct StageConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub shadow_cascade_count: u32,
    pub ssao_enabled: bool,
    pub ray_traced_shadows_enabled: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self { screen_width: 1920, screen_height: 1080, shadow_cascade_count: 3, ssao_enabled: true, ray_traced_shadows_enabled: false }
    }
}

/// One of the closed set of stages a `RenderingJob` can compose.
pub enum StageKind {
    GBuffer(GBufferStage),
    ShadowMap(ShadowMapStage),
    AmbientOcclusion(AmbientOcclusionStage),
    Shading(ShadingStage),
    PostProcess(PostProcessStage),
}

impl StageKind {
    pub fn declare_resources(&self, ctx: &mut BuildContext, config: &StageConfig) {
        match self {
            StageKind::GBuffer(stage) => stage.declare_resources(ctx, config),
            StageKind::ShadowMap(stage) => stage.declare_resources(ctx, config),
            StageKind::AmbientOcclusion(stage) => stage.declare_resources(ctx, config),
            StageKind::Shading(stage) => stage.declare_resources(ctx, config),
            StageKind::PostProcess(stage) => stage.declare_resources(ctx, config),
        }
    }

    pub fn build(&self, ctx: &mut BuildContext, config: &StageConfig) -> Result<()> {
        match self {
            StageKind::GBuffer(stage) => stage.build(ctx, config),
            StageKind::ShadowMap(stage) => stage.build(ctx, config),
            StageKind::AmbientOcclusion(stage) => stage.build(ctx, config),
            StageKind::Shading(stage) => stage.build(ctx, config),
            StageKind::PostProcess(stage) => stage.build(ctx, config),
        }
    }
}
