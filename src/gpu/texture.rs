//! Texture wrapper with per-mip views, used by the Hi-Z pyramid and any other
//! compute-generated mip chain.

/// A `wgpu::Texture` plus one `TextureView` per mip level, in addition to a
/// full-resource view covering every mip.
///
/// The Hi-Z pyramid binds mip `N` as a sampled input and mip `N+1` as a
/// storage output for one dispatch per level, so each level needs its own
/// single-mip view rather than the aggregate view `create_view` returns by
/// default.
pub struct MippedTexture {
    pub texture: wgpu::Texture,
    pub full_view: wgpu::TextureView,
    pub mip_views: Vec<wgpu::TextureView>,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

/// `floor(log2(max(width, height))) + 1`, the number of mip levels needed so
/// the pyramid bottoms out at a 1x1 texel.
#[must_use]
pub fn mip_count_for(width: u32, height: u32) -> u32 {
    let max_dim = width.max(height).max(1);
    max_dim.ilog2() + 1
}

impl MippedTexture {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let mip_level_count = mip_count_for(width, height);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });

        let full_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mip_views = (0..mip_level_count)
            .map(|mip| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("{label} mip {mip}")),
                    base_mip_level: mip,
                    mip_level_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        Self { texture, full_view, mip_views, width, height, format }
    }

    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        self.mip_views.len() as u32
    }

    /// Dimensions of mip level `mip`, halving (floor, minimum 1) each level.
    #[must_use]
    pub fn mip_size(&self, mip: u32) -> (u32, u32) {
        ((self.width >> mip).max(1), (self.height >> mip).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_count_matches_hi_z_default_resolution() {
        assert_eq!(mip_count_for(960, 540), 10);
    }

    #[test]
    fn mip_count_of_power_of_two() {
        assert_eq!(mip_count_for(1024, 1024), 11);
        assert_eq!(mip_count_for(1, 1), 1);
    }
}
