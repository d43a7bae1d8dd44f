use glam::Vec4;

use crate::errors::Result;
use crate::name::Name;
use crate::render_graph::BuildContext;

use super::StageConfig;

const SAMPLE_KERNEL_SIZE: usize = 64;

/// Screen-space ambient occlusion: a 64-sample hemispherical kernel plus a
/// screen-tiled noise texture, sampling `gbuffer.{position, normal}` in a
/// single full-screen-quad pass to produce `ambient_occlusion.target`.
pub struct AmbientOcclusionStage;

impl AmbientOcclusionStage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generates the hemispherical sample kernel the noise texture
    /// perturbs: samples biased toward the kernel center and scaled so
    /// nearer samples are denser, matching the standard SSAO kernel shape.
    #[must_use]
    pub fn generate_sample_kernel() -> [Vec4; SAMPLE_KERNEL_SIZE] {
        std::array::from_fn(|i| {
            let scale = 0.1 + 0.9 * (i as f32 / SAMPLE_KERNEL_SIZE as f32).powi(2);
            let angle = i as f32 * 2.399_963; // golden-angle spacing for even hemisphere coverage
            let radius = (i as f32 / SAMPLE_KERNEL_SIZE as f32).sqrt();
            Vec4::new(angle.cos() * radius * scale, angle.sin() * radius * scale, scale, 0.0)
        })
    }

    pub fn declare_resources(&self, ctx: &mut BuildContext, _config: &StageConfig) {
        ctx.declare_buffer(
            Name::new("ambient_occlusion.sample_kernel"),
            (SAMPLE_KERNEL_SIZE * std::mem::size_of::<Vec4>()) as u64,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        );
        ctx.declare_texture(Name::new("ambient_occlusion.noise"), 4, 4, wgpu::TextureFormat::Rg32Float, wgpu::TextureUsages::TEXTURE_BINDING);
        ctx.declare_render_target(Name::new("ambient_occlusion.target"), wgpu::TextureFormat::R8Unorm);
    }

    pub fn build(&self, ctx: &mut BuildContext, _config: &StageConfig) -> Result<()> {
        ctx.begin_render_pass(Name::new("ambient_occlusion.pass"), &[Name::new("ambient_occlusion.target")], None, true, false);
        ctx.bind_fragment_shader(Name::new("ambient_occlusion/ssao.fshader"));
        ctx.bind_samplable_texture(0, Name::new("gbuffer.position"));
        ctx.bind_samplable_texture(1, Name::new("gbuffer.normal"));
        ctx.bind_samplable_texture(2, Name::new("ambient_occlusion.noise"));
        ctx.bind_storage_buffer(3, Name::new("ambient_occlusion.sample_kernel"));
        ctx.draw_full_screen_quad()?;
        ctx.end_render_pass();
        Ok(())
    }
}

impl Default for AmbientOcclusionStage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_kernel_has_the_spec_mandated_size() {
        assert_eq!(AmbientOcclusionStage::generate_sample_kernel().len(), SAMPLE_KERNEL_SIZE);
    }

    #[test]
    fn sample_kernel_radii_stay_within_the_unit_hemisphere() {
        for sample in AmbientOcclusionStage::generate_sample_kernel() {
            assert!(sample.x.abs() <= 1.0);
            assert!(sample.y.abs() <= 1.0);
        }
    }
}
