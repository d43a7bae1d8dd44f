//! Central owner of all `wgpu::RenderPipeline`/`wgpu::ComputePipeline`
//! instances, addressed through [`RenderPipelineId`]/[`ComputePipelineId`].

use rustc_hash::FxHashMap;

use super::key::{ComputePipelineKey, GraphicsPipelineKey, fx_hash_key};
use super::pipeline_id::{ComputePipelineId, RenderPipelineId};

/// Deduplicating pipeline storage: a pipeline is only ever built once per
/// distinct key, and every subsequent lookup is a hash-map hit.
#[derive(Default)]
pub struct PipelineCache {
    render_pipelines: Vec<wgpu::RenderPipeline>,
    compute_pipelines: Vec<wgpu::ComputePipeline>,
    graphics_lookup: FxHashMap<u64, RenderPipelineId>,
    compute_lookup: FxHashMap<u64, ComputePipelineId>,
}

impl PipelineCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_render_pipeline(&self, id: RenderPipelineId) -> &wgpu::RenderPipeline {
        &self.render_pipelines[id.index()]
    }

    #[must_use]
    pub fn get_compute_pipeline(&self, id: ComputePipelineId) -> &wgpu::ComputePipeline {
        &self.compute_pipelines[id.index()]
    }

    /// Clears every cached pipeline, e.g. when MSAA sample count or HDR
    /// surface format change and every pipeline's attachment state is stale.
    pub fn clear(&mut self) {
        self.render_pipelines.clear();
        self.compute_pipelines.clear();
        self.graphics_lookup.clear();
        self.compute_lookup.clear();
    }

    pub fn get_or_create_graphics(
        &mut self,
        key: &GraphicsPipelineKey,
        build: impl FnOnce() -> wgpu::RenderPipeline,
    ) -> RenderPipelineId {
        let hash = fx_hash_key(key);
        if let Some(&id) = self.graphics_lookup.get(&hash) {
            return id;
        }
        let id = self.push_render_pipeline(build());
        self.graphics_lookup.insert(hash, id);
        id
    }

    pub fn get_or_create_compute(
        &mut self,
        key: &ComputePipelineKey,
        build: impl FnOnce() -> wgpu::ComputePipeline,
    ) -> ComputePipelineId {
        let hash = fx_hash_key(key);
        if let Some(&id) = self.compute_lookup.get(&hash) {
            return id;
        }
        let id = self.push_compute_pipeline(build());
        self.compute_lookup.insert(hash, id);
        id
    }

    #[must_use]
    pub fn render_pipeline_count(&self) -> usize {
        self.render_pipelines.len()
    }

    #[must_use]
    pub fn compute_pipeline_count(&self) -> usize {
        self.compute_pipelines.len()
    }

    fn push_render_pipeline(&mut self, pipeline: wgpu::RenderPipeline) -> RenderPipelineId {
        let id = RenderPipelineId(self.render_pipelines.len() as u32);
        self.render_pipelines.push(pipeline);
        id
    }

    fn push_compute_pipeline(&mut self, pipeline: wgpu::ComputePipeline) -> ComputePipelineId {
        let id = ComputePipelineId(self.compute_pipelines.len() as u32);
        self.compute_pipelines.push(pipeline);
        id
    }
}
