//! Thin device/resource layer over `wgpu`.
//!
//! Nothing above this module touches `wgpu` types directly except through the
//! wrappers here: [`GpuContext`] owns the device/queue/adapter, [`RenderSurface`]
//! owns swapchain lifecycle, and [`CommandList`]/[`DescriptorStorage`] give the
//! render-graph layer a narrow, job-friendly surface to record against.

mod command_list;
mod context;
mod descriptor;
mod surface;
mod texture;

pub use command_list::CommandList;
pub use context::{GpuContext, GpuSettings};
pub use descriptor::{write_descriptors, BindGroupKey, DescriptorBinding, DescriptorStorage};
pub use surface::RenderSurface;
pub use texture::{mip_count_for, MippedTexture};
