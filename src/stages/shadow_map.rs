use crate::errors::Result;
use crate::name::Name;
use crate::render_graph::BuildContext;

use super::StageConfig;

/// Three depth cascades driven by three per-cascade view-projection
/// buffers. Reuses `scene_object_buffer`/`count_buffer` directly — no
/// per-cascade culling, every object is tested against every cascade.
pub struct ShadowMapStage {
    scene_object_buffer: Name,
    count_buffer: Name,
}

impl ShadowMapStage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scene_object_buffer: Name::new("bindless_scene.scene_object_buffer"),
            count_buffer: Name::new("bindless_scene.count_buffer"),
        }
    }

    pub fn declare_resources(&self, ctx: &mut BuildContext, config: &StageConfig) {
        for cascade in 0..config.shadow_cascade_count {
            ctx.declare_sized_depth_target(
                Name::new(&format!("shadow_map.cascade{cascade}")),
                2048,
                2048,
                wgpu::TextureFormat::Depth32Float,
            );
            ctx.declare_buffer(
                Name::new(&format!("shadow_map.cascade{cascade}.view_proj")),
                std::mem::size_of::<glam::Mat4>() as u64,
                wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            );
        }
    }

    pub fn build(&self, ctx: &mut BuildContext, config: &StageConfig) -> Result<()> {
        for cascade in 0..config.shadow_cascade_count {
            let depth = Name::new(&format!("shadow_map.cascade{cascade}"));
            let view_proj = Name::new(&format!("shadow_map.cascade{cascade}.view_proj"));

            ctx.begin_render_pass(Name::new(&format!("shadow_map.cascade{cascade}.pass")), &[], Some(depth), false, true);
            ctx.bind_vertex_shader(Name::new("shadow_map/depth_only.vshader"));
            ctx.bind_uniform_buffer(0, view_proj);
            ctx.bind_storage_buffer(1, self.scene_object_buffer);
            ctx.draw_indexed_indirect_with_count(
                self.scene_object_buffer,
                self.count_buffer,
                crate::bindless_scene::TOTAL_OBJECT_COUNT_OFFSET,
                u32::MAX,
                std::mem::size_of::<crate::bindless_scene::BindlessSceneObject>() as u32,
            )?;
            ctx.end_render_pass();
        }
        Ok(())
    }
}

impl Default for ShadowMapStage {
    fn default() -> Self {
        Self::new()
    }
}
