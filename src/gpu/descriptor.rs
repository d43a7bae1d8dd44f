//! Bind-group construction and caching.
//!
//! `BuildContext` records bindings as an abstract list; this module turns
//! that list into real `wgpu::BindGroup`s and caches them by content so two
//! jobs that bind the same resources in the same order share one bind group
//! instead of each allocating their own.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::name::Name;

/// One descriptor entry as recorded by `BuildContext`, already resolved to a
/// concrete GPU resource.
pub enum DescriptorBinding<'a> {
    UniformBuffer { buffer: &'a wgpu::Buffer, offset: u64, size: Option<u64> },
    StorageBuffer { buffer: &'a wgpu::Buffer, offset: u64, size: Option<u64>, read_only: bool },
    SampledTexture { view: &'a wgpu::TextureView },
    StorageTexture { view: &'a wgpu::TextureView },
    Sampler { sampler: &'a wgpu::Sampler },
    UniformBufferArray { buffers: Vec<wgpu::BufferBinding<'a>> },
    SampledTextureArray { views: Vec<&'a wgpu::TextureView> },
}

/// Cache key for a bind group: the layout identity plus a resource fingerprint
/// per binding slot, built incrementally with [`BindGroupKey::with_resource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindGroupKey {
    layout_id: u64,
    resources: SmallVec<[u64; 8]>,
}

impl BindGroupKey {
    #[must_use]
    pub fn new(layout_id: u64) -> Self {
        Self { layout_id, resources: SmallVec::new() }
    }

    #[must_use]
    pub fn with_resource(mut self, id: u64) -> Self {
        self.resources.push(id);
        self
    }
}

/// Content-addressed bind-group cache, plus the push-descriptor-style
/// ephemeral path `BuildContext` uses for per-draw bindings that are not
/// worth caching (bound once, used by a single draw call).
#[derive(Default)]
pub struct DescriptorStorage {
    cache: FxHashMap<BindGroupKey, wgpu::BindGroup>,
}

impl DescriptorStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(
        &mut self,
        key: BindGroupKey,
        factory: impl FnOnce() -> wgpu::BindGroup,
    ) -> &wgpu::BindGroup {
        self.cache.entry(key).or_insert_with(factory)
    }

    #[must_use]
    pub fn get(&self, key: &BindGroupKey) -> Option<&wgpu::BindGroup> {
        self.cache.get(key)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// Writes one ephemeral bind group from a job's resolved bindings for the
/// given `layout`, without touching [`DescriptorStorage`]'s cache. This is
/// the push-descriptor-equivalent path `BuildContext::bind_*` calls use when
/// flushing pending descriptor writes before a draw or dispatch.
pub fn write_descriptors(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: Name,
    bindings: &[DescriptorBinding<'_>],
) -> wgpu::BindGroup {
    let entries: Vec<wgpu::BindGroupEntry<'_>> = bindings
        .iter()
        .enumerate()
        .map(|(binding, resource)| wgpu::BindGroupEntry {
            binding: binding as u32,
            resource: match resource {
                DescriptorBinding::UniformBuffer { buffer, offset, size }
                | DescriptorBinding::StorageBuffer { buffer, offset, size, .. } => {
                    wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: *buffer,
                        offset: *offset,
                        size: size.and_then(wgpu::BufferSize::new),
                    })
                }
                DescriptorBinding::SampledTexture { view } | DescriptorBinding::StorageTexture { view } => {
                    wgpu::BindingResource::TextureView(*view)
                }
                DescriptorBinding::Sampler { sampler } => wgpu::BindingResource::Sampler(*sampler),
                DescriptorBinding::UniformBufferArray { buffers } => wgpu::BindingResource::BufferArray(buffers.as_slice()),
                DescriptorBinding::SampledTextureArray { views } => wgpu::BindingResource::TextureViewArray(views.as_slice()),
            },
        })
        .collect();

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&label.to_string()),
        layout,
        entries: &entries,
    })
}
