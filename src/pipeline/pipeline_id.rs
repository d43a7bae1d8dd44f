//! Lightweight `Copy` handles addressing [`super::cache::PipelineCache`]'s
//! storage vectors.

/// Handle to a cached `wgpu::RenderPipeline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderPipelineId(pub(crate) u32);

impl RenderPipelineId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Constructs an id pointing at an arbitrary slot, bypassing
    /// `PipelineCache`. Meant for `PipelineResolver` implementations that
    /// don't route through the cache (tests, benchmarks).
    #[must_use]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

/// Handle to a cached `wgpu::ComputePipeline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComputePipelineId(pub(crate) u32);

impl ComputePipelineId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Constructs an id pointing at an arbitrary slot, bypassing
    /// `PipelineCache`. Meant for `PipelineResolver` implementations that
    /// don't route through the cache (tests, benchmarks).
    #[must_use]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}
