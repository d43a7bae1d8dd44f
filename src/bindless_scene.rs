//! GPU residency for scene geometry: one combined vertex/index buffer, a
//! bindless texture array, and per-material-template property buffers.
//!
//! Host-side scene graph and material authoring are out of scope here —
//! callers hand us already-resolved geometry ranges and material template
//! assignments; this module only owns the device-side packing.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use rustc_hash::FxHashMap;

use crate::errors::{ForgeError, Result};
use crate::name::Name;

/// Number of distinct material templates this core supports, each with its
/// own property-struct layout and storage buffer.
pub const MATERIAL_TEMPLATE_COUNT: usize = 4;

/// Byte offset of `count_buffer`'s trailing total-object-count entry, for
/// passes (depth prepass, shadow cascades) that draw every object
/// regardless of material template.
pub const TOTAL_OBJECT_COUNT_OFFSET: u64 = (MATERIAL_TEMPLATE_COUNT * std::mem::size_of::<u32>()) as u64;

/// GPU-side per-object record. The leading five `u32`s are binary-compatible
/// with `wgpu::util::DrawIndexedIndirectArgs`, so a culling compute's output
/// can be bound directly as an indirect-draw source with no repacking copy.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BindlessSceneObject {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub vertex_offset: i32,
    pub first_instance: u32,
    pub _pad0: [u32; 3],
    pub model_matrix: Mat4,
    pub bounding_sphere: Vec4,
    pub material_index: u32,
    pub material_template_index: u32,
    pub _pad1: [u32; 2],
}

const _: () = assert!(std::mem::size_of::<BindlessSceneObject>() == 96);

/// One mesh's contiguous range inside the combined vertex/index buffers.
#[derive(Debug, Clone, Copy)]
pub struct GeometryRange {
    pub vertex_offset: i32,
    pub first_index: u32,
    pub index_count: u32,
}

/// A renderable handed to `BindlessScene::upload` by the host.
#[derive(Debug, Clone, Copy)]
pub struct RenderableDesc {
    pub geometry: GeometryRange,
    pub model_matrix: Mat4,
    pub bounding_sphere: Vec4,
    pub material_index: u32,
    pub material_template_index: u32,
}

struct TemplateRange {
    start: u32,
    end: u32,
}

/// Consolidated, device-resident scene geometry.
///
/// `combined_vertex_buffer`/`combined_index_buffer` are monolithic: every
/// mesh the host uploads is copied contiguously, with ranges tracked purely
/// by offset (no per-mesh GPU object). `scene_object_buffer` lists every
/// renderable, grouped so that all objects of material template `i` precede
/// template `i + 1` — `material_template_properties(i)`'s culling compute
/// writes its survivors back into `[start_i, end_i)` of that same ordering.
pub struct BindlessScene {
    combined_vertex_buffer: Option<wgpu::Buffer>,
    combined_index_buffer: Option<wgpu::Buffer>,
    scene_object_buffer: Option<wgpu::Buffer>,
    count_buffer: Option<wgpu::Buffer>,
    template_properties: [Option<wgpu::Buffer>; MATERIAL_TEMPLATE_COUNT],
    template_ranges: [TemplateRange; MATERIAL_TEMPLATE_COUNT],
    texture_refs: Vec<Name>,
    texture_ids: FxHashMap<Name, u32>,
    object_count: u32,
}

impl BindlessScene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            combined_vertex_buffer: None,
            combined_index_buffer: None,
            scene_object_buffer: None,
            count_buffer: None,
            template_properties: Default::default(),
            template_ranges: std::array::from_fn(|_| TemplateRange { start: 0, end: 0 }),
            texture_refs: Vec::new(),
            texture_ids: FxHashMap::default(),
            object_count: 0,
        }
    }

    /// Registers a material texture in the bindless array, returning its
    /// stable integer id (reusing an existing id if this texture was already
    /// registered).
    pub fn register_texture(&mut self, texture: Name) -> u32 {
        if let Some(&id) = self.texture_ids.get(&texture) {
            return id;
        }
        let id = self.texture_refs.len() as u32;
        self.texture_refs.push(texture);
        self.texture_ids.insert(texture, id);
        id
    }

    #[must_use]
    pub fn scene_texture_refs(&self) -> &[Name] {
        &self.texture_refs
    }

    /// Packs `vertices`/`indices` into the combined buffers, sorts
    /// `renderables` by material template, and builds `scene_object_buffer` +
    /// `count_buffer`. One-time initialization: subsequent edits require a
    /// full re-copy, there is no incremental update path.
    pub fn write_objects_to_buffer(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertices: &[u8],
        indices: &[u8],
        renderables: &[RenderableDesc],
        template_property_bytes: &[Vec<u8>; MATERIAL_TEMPLATE_COUNT],
    ) -> Result<()> {
        use wgpu::util::{BufferInitDescriptor, DeviceExt};

        self.combined_vertex_buffer = Some(device.create_buffer_init(&BufferInitDescriptor {
            label: Some("bindless_scene.combined_vertex_buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::STORAGE,
        }));
        self.combined_index_buffer = Some(device.create_buffer_init(&BufferInitDescriptor {
            label: Some("bindless_scene.combined_index_buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::STORAGE,
        }));

        let mut sorted: Vec<&RenderableDesc> = renderables.iter().collect();
        sorted.sort_by_key(|r| r.material_template_index);

        let mut objects = Vec::with_capacity(sorted.len());
        // Trailing entry holds the total object count, read by passes that
        // draw every object regardless of material template.
        let mut counts = [0u32; MATERIAL_TEMPLATE_COUNT + 1];
        for renderable in &sorted {
            let template = renderable.material_template_index as usize;
            if template >= MATERIAL_TEMPLATE_COUNT {
                return Err(ForgeError::ResourceNotDeclared(format!(
                    "material_template_index {template} out of range (max {MATERIAL_TEMPLATE_COUNT})"
                )));
            }
            counts[template] += 1;
            objects.push(BindlessSceneObject {
                index_count: renderable.geometry.index_count,
                instance_count: 1,
                first_index: renderable.geometry.first_index,
                vertex_offset: renderable.geometry.vertex_offset,
                first_instance: 0,
                _pad0: [0; 3],
                model_matrix: renderable.model_matrix,
                bounding_sphere: renderable.bounding_sphere,
                material_index: renderable.material_index,
                material_template_index: renderable.material_template_index,
                _pad1: [0; 2],
            });
        }

        let mut start = 0u32;
        for template in 0..MATERIAL_TEMPLATE_COUNT {
            let end = start + counts[template];
            self.template_ranges[template] = TemplateRange { start, end };
            start = end;
        }

        self.object_count = objects.len() as u32;
        counts[MATERIAL_TEMPLATE_COUNT] = self.object_count;
        self.scene_object_buffer = Some(device.create_buffer_init(&BufferInitDescriptor {
            label: Some("bindless_scene.scene_object_buffer"),
            contents: bytemuck::cast_slice(&objects),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::INDIRECT,
        }));
        self.count_buffer = Some(device.create_buffer_init(&BufferInitDescriptor {
            label: Some("bindless_scene.count_buffer"),
            contents: bytemuck::cast_slice(&counts),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::INDIRECT,
        }));

        for (template, bytes) in template_property_bytes.iter().enumerate() {
            let buffer = if bytes.is_empty() {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("bindless_scene.material_template_properties.{template}")),
                    size: 16,
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            } else {
                device.create_buffer_init(&BufferInitDescriptor {
                    label: Some(&format!("bindless_scene.material_template_properties.{template}")),
                    contents: bytes,
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                })
            };
            self.template_properties[template] = Some(buffer);
        }

        queue.submit(std::iter::empty());
        Ok(())
    }

    #[must_use]
    pub fn combined_vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.combined_vertex_buffer.as_ref()
    }

    #[must_use]
    pub fn combined_index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.combined_index_buffer.as_ref()
    }

    #[must_use]
    pub fn scene_object_buffer(&self) -> Option<&wgpu::Buffer> {
        self.scene_object_buffer.as_ref()
    }

    #[must_use]
    pub fn count_buffer(&self) -> Option<&wgpu::Buffer> {
        self.count_buffer.as_ref()
    }

    #[must_use]
    pub fn material_template_properties(&self, template: usize) -> Option<&wgpu::Buffer> {
        self.template_properties.get(template).and_then(Option::as_ref)
    }

    /// The `[start, end)` range of `scene_object_buffer` holding objects of
    /// material template `template`.
    #[must_use]
    pub fn material_template_range(&self, template: usize) -> (u32, u32) {
        let range = &self.template_ranges[template];
        (range.start, range.end)
    }

    #[must_use]
    pub fn object_count(&self) -> u32 {
        self.object_count
    }
}

impl Default for BindlessScene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(template: u32, first_index: u32) -> RenderableDesc {
        RenderableDesc {
            geometry: GeometryRange { vertex_offset: 0, first_index, index_count: 3 },
            model_matrix: Mat4::IDENTITY,
            bounding_sphere: Vec4::new(0.0, 0.0, 0.0, 1.0),
            material_index: 0,
            material_template_index: template,
        }
    }

    #[test]
    fn bindless_scene_object_is_96_bytes() {
        assert_eq!(std::mem::size_of::<BindlessSceneObject>(), 96);
    }

    #[test]
    fn sorting_by_template_groups_objects_contiguously() {
        let renderables = [object(2, 0), object(0, 3), object(1, 6), object(0, 9)];
        let mut sorted: Vec<&RenderableDesc> = renderables.iter().collect();
        sorted.sort_by_key(|r| r.material_template_index);

        let mut start = 0u32;
        let mut ranges = [(0u32, 0u32); MATERIAL_TEMPLATE_COUNT];
        for template in 0..MATERIAL_TEMPLATE_COUNT {
            let count = sorted.iter().filter(|r| r.material_template_index as usize == template).count() as u32;
            ranges[template] = (start, start + count);
            start += count;
        }
        // every template's range is contiguous and templates never interleave
        for window in ranges.windows(2) {
            assert_eq!(window[0].1, window[1].0);
        }
        assert_eq!(ranges[3].1, renderables.len() as u32);
    }

    #[test]
    fn register_texture_reuses_ids_for_the_same_name() {
        let mut scene = BindlessScene::new();
        let a = scene.register_texture(Name::new("brick.albedo"));
        let b = scene.register_texture(Name::new("brick.albedo"));
        let c = scene.register_texture(Name::new("brick.normal"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(scene.scene_texture_refs().len(), 2);
    }
}
