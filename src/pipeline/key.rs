//! Strongly-typed pipeline cache keys.
//!
//! `wgpu` descriptor types do not implement `Hash`/`Eq`, so these are mirror
//! structs that extract the fields relevant to pipeline identity.

use std::hash::{Hash, Hasher};

/// L2 cache key for a graphics pipeline declared via `BuildContext`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphicsPipelineKey {
    pub vertex_shader: u64,
    pub fragment_shader: Option<u64>,
    pub vertex_layout_id: u64,
    pub bind_group_layout_ids: Vec<u64>,
    pub topology: wgpu::PrimitiveTopology,
    pub cull_mode: Option<wgpu::Face>,
    pub front_face: wgpu::FrontFace,
    pub depth_write: bool,
    pub depth_compare: Option<wgpu::CompareFunction>,
    pub color_formats: Vec<wgpu::TextureFormat>,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub sample_count: u32,
}

/// L2 cache key for a compute pipeline declared via `BuildContext`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComputePipelineKey {
    pub compute_shader: u64,
    pub bind_group_layout_ids: Vec<u64>,
}

/// Computes a `u64` hash of any `Hash`-able value using `FxHasher`.
#[inline]
#[must_use]
pub fn fx_hash_key<K: Hash>(key: &K) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}
