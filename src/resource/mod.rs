//! Device-backed resource pooling built on top of [`crate::memory::HeapAllocator`].
//!
//! This layer owns the GPU objects themselves: [`ResourceStorage`] maps
//! declared `(Name, frame)` pairs to live textures/buffers, [`BufferHeap`]
//! sub-allocates byte ranges out of paged GPU buffers, and
//! [`AccelerationStructurePool`] reuses `BufferHeap` for the one GPU resource
//! kind `wgpu` cannot yet build generically across backends.

mod acceleration_structure_pool;
mod buffer_heap;
mod storage;

pub use acceleration_structure_pool::{AccelerationStructureHandle, AccelerationStructurePool};
pub use buffer_heap::{BufferHeap, SectionHandle};
pub use storage::ResourceStorage;
