use crate::errors::Result;
use crate::name::Name;
use crate::render_graph::BuildContext;

use super::StageConfig;

/// FXAA, bloom, and tone mapping, then UI compositing, blitting the result
/// to `core.color_out`.
pub struct PostProcessStage {
    pub fxaa_enabled: bool,
    pub bloom_enabled: bool,
}

impl PostProcessStage {
    #[must_use]
    pub fn new(fxaa_enabled: bool, bloom_enabled: bool) -> Self {
        Self { fxaa_enabled, bloom_enabled }
    }

    pub fn declare_resources(&self, ctx: &mut BuildContext, _config: &StageConfig) {
        if self.bloom_enabled {
            ctx.declare_render_target(Name::new("post_process.bloom"), wgpu::TextureFormat::Rgba16Float);
        }
        ctx.declare_render_target(Name::new("core.color_out"), wgpu::TextureFormat::Bgra8UnormSrgb);
    }

    pub fn build(&self, ctx: &mut BuildContext, _config: &StageConfig) -> Result<()> {
        let mut source = Name::new("shading.target");

        if self.bloom_enabled {
            ctx.begin_render_pass(Name::new("post_process.bloom_pass"), &[Name::new("post_process.bloom")], None, true, false);
            ctx.bind_fragment_shader(Name::new("post_process/bloom.fshader"));
            ctx.bind_samplable_texture(0, source);
            ctx.draw_full_screen_quad()?;
            ctx.end_render_pass();
            source = Name::new("post_process.bloom");
        }

        ctx.begin_render_pass(Name::new("post_process.composite_pass"), &[Name::new("core.color_out")], None, true, false);
        let fragment_shader = if self.fxaa_enabled { Name::new("post_process/tonemap_fxaa.fshader") } else { Name::new("post_process/tonemap.fshader") };
        ctx.bind_fragment_shader(fragment_shader);
        ctx.bind_samplable_texture(0, source);
        ctx.draw_full_screen_quad()?;
        ctx.end_render_pass();
        Ok(())
    }
}

impl Default for PostProcessStage {
    fn default() -> Self {
        Self::new(true, true)
    }
}
