//! Paged GPU buffer sub-allocator.
//!
//! Each [`BufferHeap`] owns a set of pages, every page backed by one GPU
//! buffer of `chunk_count * CHUNK_SIZE` bytes. Within a page, free and
//! allocated spans are tracked as a singly-linked list of [`Node`]s. The
//! original implementation this is ported from links nodes with a raw
//! pointer; here the list lives in a per-page arena (`Vec<Node>`) and links
//! are `Option<usize>` indices, so merged-away nodes are left as unreachable
//! tombstones instead of being freed — the arena only grows, which is the
//! safe-Rust trade-off for the pointer-chasing original.

use crate::name::Name;

/// Sub-allocation granularity. Every request is rounded up to a whole number
/// of chunks.
pub const CHUNK_SIZE: u64 = 1024;

/// Chunk count for a freshly created page when no existing page can satisfy
/// a request.
const DEFAULT_PAGE_CHUNK_COUNT: u32 = 1024;

fn size_to_chunk_count(size: u64) -> u32 {
    u32::try_from((size + CHUNK_SIZE - 1) / CHUNK_SIZE).expect("section too large for one page")
}

#[derive(Debug, Clone, Copy)]
struct Node {
    offset_chunks: u32,
    chunk_count: u32,
    is_free: bool,
    next: Option<usize>,
}

/// Pure offset bookkeeping for one page's node list, with no GPU handle —
/// kept separate from [`Page`] so the splitting/merging logic is testable
/// without a device.
struct NodeList {
    nodes: Vec<Node>,
    head: usize,
}

impl NodeList {
    fn new(chunk_count: u32) -> Self {
        Self { nodes: vec![Node { offset_chunks: 0, chunk_count, is_free: true, next: None }], head: 0 }
    }

    /// Finds the first free node with enough chunks and carves `chunks_needed`
    /// out of its head, splitting off a trailing free remainder if needed.
    fn try_allocate(&mut self, chunks_needed: u32) -> Option<usize> {
        let mut cursor = Some(self.head);
        while let Some(idx) = cursor {
            let node = self.nodes[idx];
            if node.is_free && node.chunk_count >= chunks_needed {
                if node.chunk_count == chunks_needed {
                    self.nodes[idx].is_free = false;
                } else {
                    let remainder = Node {
                        offset_chunks: node.offset_chunks + chunks_needed,
                        chunk_count: node.chunk_count - chunks_needed,
                        is_free: true,
                        next: node.next,
                    };
                    let remainder_idx = self.nodes.len();
                    self.nodes.push(remainder);
                    self.nodes[idx].chunk_count = chunks_needed;
                    self.nodes[idx].is_free = false;
                    self.nodes[idx].next = Some(remainder_idx);
                }
                return Some(idx);
            }
            cursor = node.next;
        }
        None
    }

    /// Marks `node_idx` free and greedily merges it with any directly
    /// following free nodes. Mirrors the ported implementation: merging only
    /// ever looks forward, never at a predecessor.
    fn release(&mut self, node_idx: usize) {
        self.nodes[node_idx].is_free = true;
        loop {
            let Some(next_idx) = self.nodes[node_idx].next else { break };
            if !self.nodes[next_idx].is_free {
                break;
            }
            let next_chunk_count = self.nodes[next_idx].chunk_count;
            let next_next = self.nodes[next_idx].next;
            self.nodes[node_idx].chunk_count += next_chunk_count;
            self.nodes[node_idx].next = next_next;
        }
    }
}

struct Page {
    buffer: wgpu::Buffer,
    nodes: NodeList,
}

impl Page {
    fn new(device: &wgpu::Device, label: &str, chunk_count: u32, usage: wgpu::BufferUsages) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: u64::from(chunk_count) * CHUNK_SIZE,
            usage,
            mapped_at_creation: false,
        });
        Self { buffer, nodes: NodeList::new(chunk_count) }
    }

    fn try_allocate(&mut self, chunks_needed: u32) -> Option<usize> {
        self.nodes.try_allocate(chunks_needed)
    }

    fn release(&mut self, node_idx: usize) {
        self.nodes.release(node_idx);
    }
}

/// Opaque handle identifying a previously allocated byte range within a
/// [`BufferHeap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHandle {
    page: usize,
    node: usize,
}

/// Paged sub-allocator over one or more GPU buffers.
pub struct BufferHeap {
    usage: wgpu::BufferUsages,
    label_prefix: Name,
    pages: Vec<Page>,
}

impl BufferHeap {
    #[must_use]
    pub fn new(label_prefix: Name, usage: wgpu::BufferUsages) -> Self {
        Self { usage, label_prefix, pages: Vec::new() }
    }

    /// Allocates a section of at least `size` bytes, creating a new page if
    /// no existing page has room.
    pub fn allocate_section(&mut self, device: &wgpu::Device, size: u64) -> SectionHandle {
        let chunks_needed = size_to_chunk_count(size);

        for (page_idx, page) in self.pages.iter_mut().enumerate() {
            if let Some(node_idx) = page.try_allocate(chunks_needed) {
                return SectionHandle { page: page_idx, node: node_idx };
            }
        }

        let page_chunk_count = chunks_needed.max(DEFAULT_PAGE_CHUNK_COUNT);
        let mut page = Page::new(
            device,
            &format!("buffer_heap[{}] page {}", self.label_prefix, self.pages.len()),
            page_chunk_count,
            self.usage,
        );
        let node_idx = page.try_allocate(chunks_needed).expect("fresh page must fit its own request");
        self.pages.push(page);
        SectionHandle { page: self.pages.len() - 1, node: node_idx }
    }

    pub fn release_section(&mut self, handle: SectionHandle) {
        self.pages[handle.page].release(handle.node);
    }

    /// Byte offset and GPU buffer backing `handle`, for building a bind-group
    /// entry or copy command over the section.
    #[must_use]
    pub fn resolve(&self, handle: SectionHandle) -> (&wgpu::Buffer, u64, u64) {
        let page = &self.pages[handle.page];
        let node = page.nodes.nodes[handle.node];
        (&page.buffer, u64::from(node.offset_chunks) * CHUNK_SIZE, u64::from(node.chunk_count) * CHUNK_SIZE)
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_count_of(list: &NodeList, node_idx: usize) -> u32 {
        list.nodes[node_idx].chunk_count
    }

    #[test]
    fn size_to_chunk_count_rounds_up() {
        assert_eq!(size_to_chunk_count(1), 1);
        assert_eq!(size_to_chunk_count(CHUNK_SIZE), 1);
        assert_eq!(size_to_chunk_count(CHUNK_SIZE + 1), 2);
    }

    #[test]
    fn split_leaves_a_free_remainder() {
        let mut list = NodeList::new(4);
        let a = list.try_allocate(1).unwrap();
        assert_eq!(chunk_count_of(&list, a), 1);
        assert!(!list.nodes[a].is_free);
        let remainder = list.nodes[a].next.unwrap();
        assert!(list.nodes[remainder].is_free);
        assert_eq!(chunk_count_of(&list, remainder), 3);
    }

    #[test]
    fn exact_fit_does_not_split() {
        let mut list = NodeList::new(4);
        let a = list.try_allocate(4).unwrap();
        assert!(!list.nodes[a].is_free);
        assert!(list.nodes[a].next.is_none());
    }

    #[test]
    fn allocate_fails_when_no_node_is_large_enough() {
        let mut list = NodeList::new(4);
        list.try_allocate(3).unwrap();
        assert!(list.try_allocate(2).is_none());
    }

    #[test]
    fn release_merges_forward_adjacent_free_nodes() {
        let mut list = NodeList::new(4);
        let a = list.try_allocate(1).unwrap();
        let b = list.try_allocate(1).unwrap();
        let _c = list.try_allocate(1).unwrap();
        list.release(a);
        list.release(b);
        assert!(list.nodes[a].is_free);
        assert_eq!(chunk_count_of(&list, a), 2);
    }

    #[test]
    fn release_does_not_merge_backward() {
        let mut list = NodeList::new(4);
        let a = list.try_allocate(1).unwrap();
        let b = list.try_allocate(1).unwrap();
        list.release(b);
        list.release(a);
        // `a` merges forward into `b` once both are free and adjacent, but
        // releasing `b` on its own must never reach backward into `a`.
        assert!(list.nodes[a].is_free);
        assert_eq!(chunk_count_of(&list, a), 2);
    }

    #[test]
    fn full_release_reclaims_whole_page() {
        let mut list = NodeList::new(8);
        let a = list.try_allocate(2).unwrap();
        let b = list.try_allocate(3).unwrap();
        let c = list.try_allocate(3).unwrap();
        list.release(a);
        list.release(b);
        list.release(c);
        assert!(list.nodes[a].is_free);
        assert_eq!(chunk_count_of(&list, a), 8);
    }
}
