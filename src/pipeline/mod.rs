//! Render/compute pipeline storage, keyed by content so two jobs that declare
//! the same pipeline state never compile it twice.

mod cache;
mod key;
mod pipeline_id;

pub use cache::PipelineCache;
pub use key::{ComputePipelineKey, GraphicsPipelineKey, fx_hash_key};
pub use pipeline_id::{ComputePipelineId, RenderPipelineId};
