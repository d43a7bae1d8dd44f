//! Pool of ray tracing acceleration structures, bucketed by kind and size.
//!
//! `wgpu` has no stable, cross-backend "build a raw acceleration structure"
//! entry point, so this pool only manages the byte-range bookkeeping a real
//! backend would need (as [`BufferHeap`] sections) plus an opaque payload
//! per handle that a backend-specific extension can populate. This mirrors
//! the pool's reuse-by-size-bucket strategy without inventing a fictitious
//! `wgpu` acceleration-structure API.

use std::any::Any;
use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::name::Name;
use crate::resource::buffer_heap::{BufferHeap, SectionHandle};

new_key_type! {
    /// Handle to a pooled acceleration structure's backing storage.
    pub struct AccelerationStructureHandle;
}

struct Entry {
    kind: Name,
    size: u64,
    section: SectionHandle,
    payload: Option<Box<dyn Any + Send + Sync>>,
}

/// Pools acceleration-structure backing storage by `(kind, size)`, so a
/// structure of the same kind and size can be reused without a fresh
/// allocation once its previous owner releases it.
pub struct AccelerationStructurePool {
    heap: BufferHeap,
    entries: SlotMap<AccelerationStructureHandle, Entry>,
    free_by_kind: FxHashMap<Name, BTreeMap<u64, Vec<AccelerationStructureHandle>>>,
}

impl AccelerationStructurePool {
    #[must_use]
    pub fn new(label: Name, usage: wgpu::BufferUsages) -> Self {
        Self {
            heap: BufferHeap::new(label, usage),
            entries: SlotMap::with_key(),
            free_by_kind: FxHashMap::default(),
        }
    }

    /// Reuses a free structure of `kind` whose backing storage is at least
    /// `size` bytes, or allocates fresh storage if none is free.
    pub fn acquire(&mut self, device: &wgpu::Device, kind: Name, size: u64) -> AccelerationStructureHandle {
        if let Some(bucket) = self.free_by_kind.get_mut(&kind) {
            if let Some((&bucket_size, handles)) = bucket.range_mut(size..).next() {
                if let Some(handle) = handles.pop() {
                    if handles.is_empty() {
                        bucket.remove(&bucket_size);
                    }
                    return handle;
                }
            }
        }

        let section = self.heap.allocate_section(device, size);
        self.entries.insert(Entry { kind, size, section, payload: None })
    }

    /// Returns `handle` to the free-by-kind buckets for future reuse, without
    /// releasing the underlying `BufferHeap` section.
    pub fn release(&mut self, handle: AccelerationStructureHandle) {
        let Some(entry) = self.entries.get(handle) else { return };
        self.free_by_kind.entry(entry.kind).or_default().entry(entry.size).or_default().push(handle);
    }

    /// Permanently drops `handle` and returns its backing section to the heap.
    pub fn destroy(&mut self, handle: AccelerationStructureHandle) {
        if let Some(entry) = self.entries.remove(handle) {
            self.heap.release_section(entry.section);
        }
    }

    #[must_use]
    pub fn section(&self, handle: AccelerationStructureHandle) -> Option<(&wgpu::Buffer, u64, u64)> {
        self.entries.get(handle).map(|e| self.heap.resolve(e.section))
    }

    pub fn set_payload(&mut self, handle: AccelerationStructureHandle, payload: Box<dyn Any + Send + Sync>) {
        if let Some(entry) = self.entries.get_mut(handle) {
            entry.payload = Some(payload);
        }
    }

    #[must_use]
    pub fn payload(&self, handle: AccelerationStructureHandle) -> Option<&(dyn Any + Send + Sync)> {
        self.entries.get(handle).and_then(|e| e.payload.as_deref())
    }
}
