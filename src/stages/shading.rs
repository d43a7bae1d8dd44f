use crate::errors::Result;
use crate::name::Name;
use crate::render_graph::BuildContext;

use super::StageConfig;

/// Optional full-screen shading pass combining the GBuffer, shadow maps, the
/// AO texture, and (when enabled) ray-traced shadow visibility.
pub struct ShadingStage;

impl ShadingStage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn declare_resources(&self, ctx: &mut BuildContext, _config: &StageConfig) {
        ctx.declare_render_target(Name::new("shading.target"), wgpu::TextureFormat::Rgba16Float);
    }

    pub fn build(&self, ctx: &mut BuildContext, config: &StageConfig) -> Result<()> {
        ctx.begin_render_pass(Name::new("shading.pass"), &[Name::new("shading.target")], None, true, false);

        let fragment_shader =
            if config.ray_traced_shadows_enabled { Name::new("shading/lit_rt_shadows.fshader") } else { Name::new("shading/lit.fshader") };
        ctx.bind_fragment_shader(fragment_shader);
        ctx.bind_samplable_texture(0, Name::new("gbuffer.albedo"));
        ctx.bind_samplable_texture(1, Name::new("gbuffer.position"));
        ctx.bind_samplable_texture(2, Name::new("gbuffer.normal"));
        if config.ssao_enabled {
            ctx.bind_samplable_texture(3, Name::new("ambient_occlusion.target"));
        }
        let shadow_cascades: Vec<Name> = (0..config.shadow_cascade_count).map(|c| Name::new(&format!("shadow_map.cascade{c}"))).collect();
        ctx.bind_sampled_texture_array(4, &shadow_cascades);

        ctx.draw_full_screen_quad()?;
        ctx.end_render_pass();
        Ok(())
    }
}

impl Default for ShadingStage {
    fn default() -> Self {
        Self::new()
    }
}
