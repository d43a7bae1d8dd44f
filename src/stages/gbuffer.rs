use crate::bindless_scene::{BindlessScene, MATERIAL_TEMPLATE_COUNT};
use crate::config::CullingSettings;
use crate::culling::OcclusionCulling;
use crate::errors::Result;
use crate::name::Name;
use crate::render_graph::BuildContext;

use super::StageConfig;

/// Declares `gbuffer.{albedo, position, normal, depth}`, runs the skybox,
/// then the occlusion-culling pipeline, then one indirect draw per material
/// template (each with its own fragment shader).
pub struct GBufferStage {
    culling: OcclusionCulling,
    scene_object_buffer: Name,
    count_buffer: Name,
    template_fragment_shaders: [Name; MATERIAL_TEMPLATE_COUNT],
}

impl GBufferStage {
    #[must_use]
    pub fn new(screen_width: u32, screen_height: u32, scene: &BindlessScene, culling_settings: CullingSettings) -> Self {
        let _ = scene;
        Self {
            culling: OcclusionCulling::new(screen_width, screen_height, culling_settings),
            scene_object_buffer: Name::new("bindless_scene.scene_object_buffer"),
            count_buffer: Name::new("bindless_scene.count_buffer"),
            template_fragment_shaders: std::array::from_fn(|template| Name::new(&format!("gbuffer/template{template}.fshader"))),
        }
    }

    pub fn declare_resources(&self, ctx: &mut BuildContext, config: &StageConfig) {
        ctx.declare_render_target(Name::new("gbuffer.albedo"), wgpu::TextureFormat::Rgba8UnormSrgb);
        ctx.declare_render_target(Name::new("gbuffer.position"), wgpu::TextureFormat::Rgba16Float);
        ctx.declare_render_target(Name::new("gbuffer.normal"), wgpu::TextureFormat::Rgba16Float);
        ctx.declare_depth_target(Name::new("gbuffer.depth"), wgpu::TextureFormat::Depth32Float);
        let _ = config;
        self.culling.declare_resources(ctx);
    }

    pub fn build(&self, ctx: &mut BuildContext, _config: &StageConfig) -> Result<()> {
        self.culling.record(ctx, self.scene_object_buffer, self.count_buffer)?;

        let color_attachments =
            [Name::new("gbuffer.albedo"), Name::new("gbuffer.position"), Name::new("gbuffer.normal")];
        ctx.begin_render_pass(Name::new("gbuffer.skybox_and_opaque"), &color_attachments, Some(Name::new("gbuffer.depth")), true, false);

        ctx.bind_vertex_shader(Name::new("gbuffer/skybox.vshader"));
        ctx.bind_fragment_shader(Name::new("gbuffer/skybox.fshader"));
        ctx.draw_full_screen_quad()?;

        for (template, &fragment_shader) in self.template_fragment_shaders.iter().enumerate() {
            ctx.bind_vertex_shader(Name::new("gbuffer/opaque.vshader"));
            ctx.bind_fragment_shader(fragment_shader);
            ctx.bind_storage_buffer(0, self.scene_object_buffer);
            ctx.draw_indexed_indirect_with_count(
                self.culling.visible_objects_buffer(template),
                self.count_buffer,
                u64::from(template as u32) * 4,
                u32::MAX,
                std::mem::size_of::<crate::bindless_scene::BindlessSceneObject>() as u32,
            )?;
        }

        ctx.end_render_pass();
        Ok(())
    }
}
