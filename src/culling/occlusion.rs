//! The four-pass occlusion pipeline: depth prepass, Hi-Z pyramid build,
//! cull compute, and indirect draws grouped by material template.

use glam::{Mat4, Vec4};

use crate::bindless_scene::MATERIAL_TEMPLATE_COUNT;
use crate::config::CullingSettings;
use crate::gpu::mip_count_for;
use crate::name::Name;
use crate::render_graph::{AccessKind, BuildContext, PipelineStage};

/// Names this pipeline declares and records against, derived from a single
/// base name so every `GBufferStage` instance gets its own non-colliding set.
pub struct OcclusionCulling {
    screen_width: u32,
    screen_height: u32,
    base_resolution_divisor: u32,
    mip_count: u32,
    depth_prepass: Name,
    hi_z_mips: Vec<Name>,
    visible_objects: [Name; MATERIAL_TEMPLATE_COUNT],
}

impl OcclusionCulling {
    /// # Panics
    ///
    /// Panics if `settings.material_template_count` does not match
    /// [`MATERIAL_TEMPLATE_COUNT`] — the visibility-list array is sized at
    /// compile time, so a settings value that disagrees with it can never be
    /// honored and is rejected here rather than silently ignored.
    #[must_use]
    pub fn new(screen_width: u32, screen_height: u32, settings: CullingSettings) -> Self {
        assert_eq!(
            settings.material_template_count, MATERIAL_TEMPLATE_COUNT,
            "CullingSettings::material_template_count must match MATERIAL_TEMPLATE_COUNT"
        );
        let divisor = settings.hi_z_base_resolution_divisor.max(1);
        let base_width = (screen_width / divisor).max(1);
        let base_height = (screen_height / divisor).max(1);
        let mip_count = mip_count_for(base_width, base_height);
        let hi_z_mips = (0..mip_count).map(|mip| Name::new(&format!("hi_z.mip{mip}"))).collect();
        let visible_objects = std::array::from_fn(|template| Name::new(&format!("visible_objects.mt{template}")));
        Self {
            screen_width,
            screen_height,
            base_resolution_divisor: divisor,
            mip_count,
            depth_prepass: Name::new("gbuffer.depth_prepass"),
            hi_z_mips,
            visible_objects,
        }
    }

    #[must_use]
    pub fn visible_objects_buffer(&self, template: usize) -> Name {
        self.visible_objects[template]
    }

    #[must_use]
    pub fn mip_count(&self) -> u32 {
        self.mip_count
    }

    pub fn declare_resources(&self, ctx: &mut BuildContext) {
        ctx.declare_sized_depth_target(self.depth_prepass, self.screen_width, self.screen_height, wgpu::TextureFormat::Depth32Float);

        let mut w = (self.screen_width / self.base_resolution_divisor).max(1);
        let mut h = (self.screen_height / self.base_resolution_divisor).max(1);
        for &mip in &self.hi_z_mips {
            ctx.declare_texture(
                mip,
                w,
                h,
                wgpu::TextureFormat::R32Float,
                wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            );
            w = (w / 2).max(1);
            h = (h / 2).max(1);
        }

        // One indirect-draw-sized slot per object is the worst case every
        // object survives culling into a single template.
        const MAX_VISIBLE_BYTES: u64 = 1 << 20;
        for &buffer in &self.visible_objects {
            ctx.declare_buffer(
                buffer,
                MAX_VISIBLE_BYTES,
                wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::INDIRECT,
            );
        }
    }

    /// Records passes A–C: depth prepass, Hi-Z pyramid build, and cull
    /// compute. Pass D (the per-template indirect draws) is issued by the
    /// owning `GBufferStage` once it has bound each template's fragment
    /// shader.
    pub fn record(&self, ctx: &mut BuildContext, scene_object_buffer: Name, count_buffer: Name) -> crate::errors::Result<()> {
        ctx.begin_render_pass(Name::new("occlusion.depth_prepass"), &[], Some(self.depth_prepass), false, true);
        ctx.bind_vertex_shader(Name::new("occlusion/depth_only.vshader"));
        ctx.bind_storage_buffer(0, scene_object_buffer);
        ctx.draw_indexed_indirect_with_count(
            scene_object_buffer,
            count_buffer,
            crate::bindless_scene::TOTAL_OBJECT_COUNT_OFFSET,
            u32::MAX,
            std::mem::size_of::<crate::bindless_scene::BindlessSceneObject>() as u32,
        )?;
        ctx.end_render_pass();

        for window in self.hi_z_mips.windows(2) {
            let (src, dst) = (window[0], window[1]);
            ctx.bind_compute_shader(Name::new("occlusion/hi_z_reduce.cshader"));
            ctx.bind_samplable_texture(0, src);
            ctx.bind_rw_texture(1, dst);
            ctx.dispatch(1, 1, 1)?;
        }

        ctx.bind_compute_shader(Name::new("occlusion/cull.cshader"));
        ctx.bind_storage_buffer(0, scene_object_buffer);
        ctx.bind_storage_buffer(1, count_buffer);
        ctx.bind_samplable_texture(2, *self.hi_z_mips.last().expect("at least one hi-z mip"));
        for (template, &buffer) in self.visible_objects.iter().enumerate() {
            ctx.bind_storage_buffer(3 + template as u32, buffer);
        }
        ctx.dispatch(1, 1, 1)?;

        ctx.export_texture(self.depth_prepass, PipelineStage::FRAGMENT_SHADER, AccessKind::Read);
        Ok(())
    }
}

/// CPU-side reference for the Hi-Z reduction compute shader: mip `n + 1`'s
/// texel is the max of the corresponding 2×2 block of mip `n`. Used to
/// validate the WGSL kernel's numeric contract independent of a live
/// adapter.
#[must_use]
pub fn hi_z_max_reduce(src: &[f32], src_width: u32, src_height: u32) -> (Vec<f32>, u32, u32) {
    let dst_width = (src_width / 2).max(1);
    let dst_height = (src_height / 2).max(1);
    let mut dst = vec![0.0f32; (dst_width * dst_height) as usize];
    for y in 0..dst_height {
        for x in 0..dst_width {
            let x0 = (x * 2).min(src_width - 1);
            let y0 = (y * 2).min(src_height - 1);
            let x1 = (x * 2 + 1).min(src_width - 1);
            let y1 = (y * 2 + 1).min(src_height - 1);
            let sample = |sx: u32, sy: u32| src[(sy * src_width + sx) as usize];
            let max = sample(x0, y0).max(sample(x1, y0)).max(sample(x0, y1)).max(sample(x1, y1));
            dst[(y * dst_width + x) as usize] = max;
        }
    }
    (dst, dst_width, dst_height)
}

/// CPU-side reference for the cull compute's frustum-rejection step: `true`
/// if any part of the bounding sphere is inside the view frustum described
/// by `view_proj`. Objects whose center projects behind the camera's eye
/// plane (`clip.w <= 0`) are always culled — no clip-space margin can rescue
/// a point with no valid perspective division.
#[must_use]
pub fn frustum_cull(bounding_sphere: Vec4, view_proj: Mat4) -> bool {
    let center = bounding_sphere.truncate();
    let radius = bounding_sphere.w;
    let clip = view_proj * center.extend(1.0);

    // `w <= 0` means the center projects behind the camera's eye plane
    // entirely (not merely past the near plane) — no clip-space margin can
    // rescue that, so it is always culled.
    if clip.w <= 0.0 {
        return false;
    }

    let margin = radius * clip.w;
    clip.x >= -clip.w - margin
        && clip.x <= clip.w + margin
        && clip.y >= -clip.w - margin
        && clip.y <= clip.w + margin
        && clip.z >= -margin
        && clip.z <= clip.w + margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_length_matches_hi_z_formula() {
        let settings = CullingSettings { hi_z_base_resolution_divisor: 1, ..CullingSettings::default() };
        let culling = OcclusionCulling::new(960, 540, settings);
        assert_eq!(culling.mip_count(), mip_count_for(960, 540));
        assert_eq!(culling.hi_z_mips.len(), culling.mip_count() as usize);
    }

    #[test]
    fn hi_z_reduce_is_max_over_each_2x2_block() {
        #[rustfmt::skip]
        let src = [
            1.0, 3.0, 5.0, 2.0,
            4.0, 0.0, 1.0, 9.0,
            2.0, 2.0, 2.0, 2.0,
            7.0, 1.0, 0.0, 0.0,
        ];
        let (dst, w, h) = hi_z_max_reduce(&src, 4, 4);
        assert_eq!((w, h), (2, 2));
        assert_eq!(dst, vec![4.0, 9.0, 7.0, 2.0]);
    }

    #[test]
    fn hi_z_reduce_handles_odd_dimensions_by_clamping() {
        let src = [1.0, 2.0, 3.0];
        let (dst, w, h) = hi_z_max_reduce(&src, 3, 1);
        assert_eq!((w, h), (1, 1));
        assert_eq!(dst, vec![3.0]);
    }

    #[test]
    fn object_behind_camera_is_culled() {
        let view_proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let behind = Vec4::new(0.0, 0.0, 50.0, 1.0); // +Z is behind a standard RH camera looking down -Z
        assert!(!frustum_cull(behind, view_proj));
    }

    #[test]
    fn object_in_front_and_centered_survives_frustum_test() {
        let view_proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let in_front = Vec4::new(0.0, 0.0, -10.0, 1.0);
        assert!(frustum_cull(in_front, view_proj));
    }
}
