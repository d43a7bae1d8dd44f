//! The recorded command stream: a flat tagged union rather than boxed trait
//! objects, so `Job::execute` can `match` over it without dynamic dispatch.

use crate::name::Name;
use crate::pipeline::{ComputePipelineId, RenderPipelineId};
use crate::render_graph::build_context::{PipelineStage, ResourceState};

/// Which pipeline stages a descriptor flush targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSet {
    Graphics,
    Compute,
}

/// One resolved descriptor binding, ready to become a `wgpu::BindGroupEntry`.
#[derive(Debug, Clone)]
pub enum BoundResource {
    UniformBuffer(Name),
    UniformBufferArray(Vec<Name>),
    StorageBuffer(Name),
    SampledTexture(Name),
    SampledTextureArray(Vec<Name>),
    RwTexture(Name),
}

/// A single pending descriptor slot, recorded by `bind_*` and flushed into a
/// `BindDescriptors` command on the next draw/dispatch.
#[derive(Debug, Clone)]
pub struct PendingBinding {
    pub slot: u32,
    pub resource: BoundResource,
}

/// An inferred synchronization point, hoisted before the render pass (or
/// compute dispatch) that needs it. Never lowered to a real `wgpu` barrier
/// call — `wgpu` synchronizes automatically — but recorded so the inferred
/// schedule is inspectable and testable (see `BuildContext`'s barrier tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierRecord {
    pub resource: Name,
    pub is_texture: bool,
    pub src_stage: PipelineStage,
    pub dst_stage: PipelineStage,
    pub src_state: ResourceState,
    pub dst_state: ResourceState,
}

/// One recorded operation in a `BuildContext`'s command stream.
#[derive(Debug, Clone)]
pub enum Command {
    TextureBarrier(BarrierRecord),
    BufferBarrier(BarrierRecord),

    BeginRenderPass {
        name: Name,
        color_attachments: Vec<Name>,
        depth_attachment: Option<Name>,
        clear_color: bool,
        clear_depth: bool,
    },
    EndRenderPass,

    BindGraphicsPipeline(RenderPipelineId),
    BindComputePipeline(ComputePipelineId),
    BindDescriptors { stage: StageSet, bindings: Vec<PendingBinding> },
    BindVertexBuffer { buffer: Name, offset: u64 },
    BindIndexBuffer { buffer: Name, offset: u64, format: wgpu::IndexFormat },

    Draw { vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32 },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    },
    DrawIndexedIndirectWithCount {
        indirect_buffer: Name,
        count_buffer: Name,
        count_offset: u64,
        max_draws: u32,
        stride: u32,
    },
    Dispatch { x: u32, y: u32, z: u32 },

    CopyBuffer { src: Name, dst: Name, size: u64 },
    CopyTextureToBuffer { texture: Name, buffer: Name },
    CopyBufferToTexture { buffer: Name, texture: Name },
    FillBufferRaw { buffer: Name, bytes: Vec<u8> },
}
