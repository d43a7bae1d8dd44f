//! Offset-based memory bookkeeping.
//!
//! This module holds pure, GPU-object-free allocation logic: [`HeapAllocator`]
//! tracks free byte ranges over an abstract span and never touches a `wgpu`
//! handle. Higher layers (`resource::BufferHeap`, `resource::AccelerationStructurePool`)
//! build device-backed pooling on top of it.

mod heap_allocator;

pub use heap_allocator::{Area, HeapAllocator};
