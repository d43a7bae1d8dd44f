//! The per-job command-recording DSL.
//!
//! A `BuildContext` is constructed once per job (re)build. Stages populate it
//! with resource declarations, pipeline state, resource bindings, and
//! draw/dispatch calls; `BuildContext` turns that into an ordered [`Command`]
//! stream plus an inferred barrier schedule, consulting a [`PipelineResolver`]
//! to turn pending pipeline state into a compiled [`RenderPipelineId`] /
//! [`ComputePipelineId`] the first time a given descriptor is seen.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::errors::{ForgeError, Result};
use crate::name::Name;
use crate::pipeline::{ComputePipelineId, ComputePipelineKey, GraphicsPipelineKey, RenderPipelineId};
use crate::render_graph::command::{BarrierRecord, BoundResource, Command, PendingBinding, StageSet};

bitflags! {
    /// Pipeline stages a resource access can be scheduled against. A barrier's
    /// `dst_stage` accumulates bits as compatible reads are coalesced into it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStage: u32 {
        const TRANSFER           = 1 << 0;
        const VERTEX_SHADER      = 1 << 1;
        const FRAGMENT_SHADER    = 1 << 2;
        const COMPUTE_SHADER     = 1 << 3;
        const EARLY_Z            = 1 << 4;
        const LATE_Z             = 1 << 5;
        const ATTACHMENT_OUTPUT  = 1 << 6;
        const INDIRECT           = 1 << 7;
    }
}

/// Logical access kind a resource is touched with. `ReadWrite` (e.g. a
/// read-modify-write storage image) always forces a fresh barrier, same as
/// `Write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
    ReadWrite,
}

/// A resource's tracked position in the access state machine: which stages
/// have touched it since the last state change, and with what access kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceState {
    pub stage: PipelineStage,
    pub access: AccessKind,
}

impl ResourceState {
    const UNDEFINED: Self = Self { stage: PipelineStage::empty(), access: AccessKind::Read };
}

/// Where a declared texture gets its dimensions from.
#[derive(Debug, Clone, Copy)]
pub enum TextureSize {
    Fixed { width: u32, height: u32 },
    ScreenSize,
}

#[derive(Debug, Clone)]
pub struct TextureDecl {
    pub size: TextureSize,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    pub is_depth: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct BufferDecl {
    pub size: u64,
    pub usage: wgpu::BufferUsages,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DepthTestMode {
    pub test_enabled: bool,
    pub write_enabled: bool,
    pub compare: Option<wgpu::CompareFunction>,
}

/// A vertex buffer's attribute layout, supplied once via `bind_vertex_layout`.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

#[derive(Debug, Clone, Default)]
struct PendingPipelineState {
    vertex_shader: Option<Name>,
    fragment_shader: Option<Name>,
    compute_shader: Option<Name>,
    vertex_layout_id: Option<u64>,
    depth_test: DepthTestMode,
    blending: bool,
    topology: Option<wgpu::PrimitiveTopology>,
    color_formats: Vec<wgpu::TextureFormat>,
    depth_format: Option<wgpu::TextureFormat>,
    bind_group_layout_ids: Vec<u64>,
}

/// Resolves pending pipeline descriptors into compiled pipeline handles.
/// Decoupling `BuildContext` from `wgpu::Device`/`PipelineCache` directly
/// keeps barrier-inference logic host-testable without a GPU adapter.
pub trait PipelineResolver {
    fn resolve_graphics(&mut self, key: &GraphicsPipelineKey) -> RenderPipelineId;
    fn resolve_compute(&mut self, key: &ComputePipelineKey) -> ComputePipelineId;
}

/// Records declarations, bindings, and draw/dispatch calls for one job.
pub struct BuildContext<'a> {
    job: Name,
    resolver: &'a mut dyn PipelineResolver,

    texture_decls: FxHashMap<Name, TextureDecl>,
    buffer_decls: FxHashMap<Name, BufferDecl>,
    declaration_order: Vec<Name>,

    commands: Vec<Command>,
    resource_tracking: FxHashMap<Name, ResourceState>,
    last_barrier_cmd_index: FxHashMap<Name, usize>,

    pending_pipeline: PendingPipelineState,
    current_graphics_pipeline: Option<(u64, RenderPipelineId)>,
    current_compute_pipeline: Option<(u64, ComputePipelineId)>,
    pending_bindings: Vec<PendingBinding>,
    descriptor_counts: FxHashMap<&'static str, u32>,

    in_render_pass: bool,
}

impl<'a> BuildContext<'a> {
    pub fn new(job: Name, resolver: &'a mut dyn PipelineResolver) -> Self {
        Self {
            job,
            resolver,
            texture_decls: FxHashMap::default(),
            buffer_decls: FxHashMap::default(),
            declaration_order: Vec::new(),
            commands: Vec::new(),
            resource_tracking: FxHashMap::default(),
            last_barrier_cmd_index: FxHashMap::default(),
            pending_pipeline: PendingPipelineState::default(),
            current_graphics_pipeline: None,
            current_compute_pipeline: None,
            pending_bindings: Vec::new(),
            descriptor_counts: FxHashMap::default(),
            in_render_pass: false,
        }
    }

    #[must_use]
    pub fn job(&self) -> Name {
        self.job
    }

    // ── Declarations ─────────────────────────────────────────────────────

    pub fn declare_texture(&mut self, name: Name, width: u32, height: u32, format: wgpu::TextureFormat, usage: wgpu::TextureUsages) {
        self.declare(name, TextureDecl { size: TextureSize::Fixed { width, height }, format, usage, is_depth: false });
    }

    pub fn declare_screen_size_texture(&mut self, name: Name, format: wgpu::TextureFormat, usage: wgpu::TextureUsages) {
        self.declare(name, TextureDecl { size: TextureSize::ScreenSize, format, usage, is_depth: false });
    }

    pub fn declare_render_target(&mut self, name: Name, format: wgpu::TextureFormat) {
        self.declare_screen_size_texture(
            name,
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
    }

    pub fn declare_sized_render_target(&mut self, name: Name, width: u32, height: u32, format: wgpu::TextureFormat) {
        self.declare_texture(
            name,
            width,
            height,
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
    }

    pub fn declare_depth_target(&mut self, name: Name, format: wgpu::TextureFormat) {
        self.declare(
            name,
            TextureDecl {
                size: TextureSize::ScreenSize,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                is_depth: true,
            },
        );
    }

    pub fn declare_sized_depth_target(&mut self, name: Name, width: u32, height: u32, format: wgpu::TextureFormat) {
        self.declare(
            name,
            TextureDecl {
                size: TextureSize::Fixed { width, height },
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                is_depth: true,
            },
        );
    }

    pub fn declare_buffer(&mut self, name: Name, size: u64, usage: wgpu::BufferUsages) {
        self.buffer_decls.insert(name, BufferDecl { size, usage });
        self.declaration_order.push(name);
    }

    pub fn declare_staging_buffer(&mut self, name: Name, size: u64) {
        self.declare_buffer(name, size, wgpu::BufferUsages::MAP_WRITE | wgpu::BufferUsages::COPY_SRC);
    }

    fn declare(&mut self, name: Name, decl: TextureDecl) {
        self.texture_decls.insert(name, decl);
        self.declaration_order.push(name);
    }

    #[must_use]
    pub fn texture_decls(&self) -> &FxHashMap<Name, TextureDecl> {
        &self.texture_decls
    }

    #[must_use]
    pub fn buffer_decls(&self) -> &FxHashMap<Name, BufferDecl> {
        &self.buffer_decls
    }

    // ── Pipeline binding ─────────────────────────────────────────────────

    pub fn bind_vertex_shader(&mut self, shader: Name) {
        self.pending_pipeline.vertex_shader = Some(shader);
    }

    pub fn bind_fragment_shader(&mut self, shader: Name) {
        self.pending_pipeline.fragment_shader = Some(shader);
    }

    pub fn bind_compute_shader(&mut self, shader: Name) {
        self.pending_pipeline.compute_shader = Some(shader);
    }

    pub fn bind_vertex_layout(&mut self, layout: &VertexLayout) {
        let mut hasher = rustc_hash::FxHasher::default();
        use std::hash::{Hash, Hasher};
        layout.stride.hash(&mut hasher);
        for attr in &layout.attributes {
            attr.offset.hash(&mut hasher);
            attr.shader_location.hash(&mut hasher);
        }
        self.pending_pipeline.vertex_layout_id = Some(hasher.finish());
    }

    pub fn set_depth_test_mode(&mut self, mode: DepthTestMode) {
        self.pending_pipeline.depth_test = mode;
    }

    pub fn set_blending_enabled(&mut self, enabled: bool) {
        self.pending_pipeline.blending = enabled;
    }

    pub fn set_vertex_topology(&mut self, topology: wgpu::PrimitiveTopology) {
        self.pending_pipeline.topology = Some(topology);
    }

    // ── Resource binding ─────────────────────────────────────────────────

    pub fn bind_uniform_buffer(&mut self, slot: u32, buffer: Name) {
        self.count_descriptor("uniform_buffer");
        self.pending_bindings.push(PendingBinding { slot, resource: BoundResource::UniformBuffer(buffer) });
    }

    pub fn bind_uniform_buffers(&mut self, slot: u32, buffers: &[Name]) {
        self.count_descriptor("uniform_buffer");
        self.pending_bindings.push(PendingBinding { slot, resource: BoundResource::UniformBufferArray(buffers.to_vec()) });
    }

    pub fn bind_storage_buffer(&mut self, slot: u32, buffer: Name) {
        self.count_descriptor("storage_buffer");
        self.pending_bindings.push(PendingBinding { slot, resource: BoundResource::StorageBuffer(buffer) });
    }

    pub fn bind_samplable_texture(&mut self, slot: u32, texture: Name) {
        self.count_descriptor("sampled_texture");
        let stage = self.current_read_stage();
        self.touch_resource(texture, stage, AccessKind::Read, true);
        self.pending_bindings.push(PendingBinding { slot, resource: BoundResource::SampledTexture(texture) });
    }

    pub fn bind_sampled_texture_array(&mut self, slot: u32, textures: &[Name]) {
        self.count_descriptor("sampled_texture_array");
        let stage = self.current_read_stage();
        for &texture in textures {
            self.touch_resource(texture, stage, AccessKind::Read, true);
        }
        self.pending_bindings.push(PendingBinding { slot, resource: BoundResource::SampledTextureArray(textures.to_vec()) });
    }

    pub fn bind_rw_texture(&mut self, slot: u32, texture: Name) {
        self.count_descriptor("rw_texture");
        let stage = self.current_compute_stage();
        self.touch_resource(texture, stage, AccessKind::ReadWrite, true);
        self.pending_bindings.push(PendingBinding { slot, resource: BoundResource::RwTexture(texture) });
    }

    fn current_read_stage(&self) -> PipelineStage {
        if self.pending_pipeline.compute_shader.is_some() {
            PipelineStage::COMPUTE_SHADER
        } else {
            let mut stage = PipelineStage::empty();
            if self.pending_pipeline.vertex_shader.is_some() {
                stage |= PipelineStage::VERTEX_SHADER;
            }
            if self.pending_pipeline.fragment_shader.is_some() {
                stage |= PipelineStage::FRAGMENT_SHADER;
            }
            stage
        }
    }

    fn current_compute_stage(&self) -> PipelineStage {
        PipelineStage::COMPUTE_SHADER
    }

    fn count_descriptor(&mut self, kind: &'static str) {
        *self.descriptor_counts.entry(kind).or_insert(0) += 1;
    }

    #[must_use]
    pub fn descriptor_counts(&self) -> &FxHashMap<&'static str, u32> {
        &self.descriptor_counts
    }

    fn flush_descriptors(&mut self, stage: StageSet) {
        if self.pending_bindings.is_empty() {
            return;
        }
        let bindings = std::mem::take(&mut self.pending_bindings);
        self.commands.push(Command::BindDescriptors { stage, bindings });
    }

    // ── Render passes ────────────────────────────────────────────────────

    pub fn begin_render_pass(&mut self, name: Name, color_attachments: &[Name], depth_attachment: Option<Name>, clear_color: bool, clear_depth: bool) {
        debug_assert!(!self.in_render_pass, "begin_render_pass called while already inside a pass");
        for &att in color_attachments {
            self.touch_resource(att, PipelineStage::ATTACHMENT_OUTPUT, AccessKind::Write, true);
        }
        if let Some(depth) = depth_attachment {
            let stage = PipelineStage::EARLY_Z | PipelineStage::LATE_Z;
            self.touch_resource(depth, stage, AccessKind::ReadWrite, true);
        }
        self.in_render_pass = true;
        self.commands.push(Command::BeginRenderPass {
            name,
            color_attachments: color_attachments.to_vec(),
            depth_attachment,
            clear_color,
            clear_depth,
        });
    }

    pub fn end_render_pass(&mut self) {
        debug_assert!(self.in_render_pass, "end_render_pass called outside a pass");
        self.in_render_pass = false;
        self.commands.push(Command::EndRenderPass);
    }

    // ── Draw / dispatch ──────────────────────────────────────────────────

    fn handle_pending_graphic_state(&mut self) -> Result<()> {
        let vertex_shader = self.pending_pipeline.vertex_shader.ok_or_else(|| {
            ForgeError::InvalidShaderStage("draw called with no bound vertex shader".into())
        })?;
        let key = GraphicsPipelineKey {
            vertex_shader: vertex_shader.raw(),
            fragment_shader: self.pending_pipeline.fragment_shader.map(Name::raw),
            vertex_layout_id: self.pending_pipeline.vertex_layout_id.unwrap_or(0),
            bind_group_layout_ids: self.pending_pipeline.bind_group_layout_ids.clone(),
            topology: self.pending_pipeline.topology.unwrap_or(wgpu::PrimitiveTopology::TriangleList),
            cull_mode: None,
            front_face: wgpu::FrontFace::Ccw,
            depth_write: self.pending_pipeline.depth_test.write_enabled,
            depth_compare: self.pending_pipeline.depth_test.compare,
            color_formats: self.pending_pipeline.color_formats.clone(),
            depth_format: self.pending_pipeline.depth_format,
            sample_count: 1,
        };
        let hash = crate::pipeline::fx_hash_key(&key);
        if self.current_graphics_pipeline.map(|(h, _)| h) != Some(hash) {
            let id = self.resolver.resolve_graphics(&key);
            self.current_graphics_pipeline = Some((hash, id));
            self.commands.push(Command::BindGraphicsPipeline(id));
        }
        self.flush_descriptors(StageSet::Graphics);
        Ok(())
    }

    fn handle_pending_compute_state(&mut self) -> Result<()> {
        let compute_shader = self.pending_pipeline.compute_shader.ok_or_else(|| {
            ForgeError::InvalidShaderStage("dispatch called with no bound compute shader".into())
        })?;
        let key = ComputePipelineKey {
            compute_shader: compute_shader.raw(),
            bind_group_layout_ids: self.pending_pipeline.bind_group_layout_ids.clone(),
        };
        let hash = crate::pipeline::fx_hash_key(&key);
        if self.current_compute_pipeline.map(|(h, _)| h) != Some(hash) {
            let id = self.resolver.resolve_compute(&key);
            self.current_compute_pipeline = Some((hash, id));
            self.commands.push(Command::BindComputePipeline(id));
        }
        self.flush_descriptors(StageSet::Compute);
        Ok(())
    }

    pub fn bind_vertex_buffer(&mut self, buffer: Name, offset: u64) {
        self.touch_resource(buffer, PipelineStage::VERTEX_SHADER, AccessKind::Read, false);
        self.commands.push(Command::BindVertexBuffer { buffer, offset });
    }

    pub fn bind_index_buffer(&mut self, buffer: Name, offset: u64, format: wgpu::IndexFormat) {
        self.touch_resource(buffer, PipelineStage::VERTEX_SHADER, AccessKind::Read, false);
        self.commands.push(Command::BindIndexBuffer { buffer, offset, format });
    }

    pub fn draw_primitives(&mut self, vertex_count: u32, first_vertex: u32, instance_count: u32, first_instance: u32) -> Result<()> {
        self.handle_pending_graphic_state()?;
        self.commands.push(Command::Draw { vertex_count, instance_count, first_vertex, first_instance });
        Ok(())
    }

    pub fn draw_indexed_primitives(
        &mut self,
        index_count: u32,
        first_index: u32,
        base_vertex: i32,
        instance_count: u32,
        first_instance: u32,
    ) -> Result<()> {
        self.handle_pending_graphic_state()?;
        self.commands.push(Command::DrawIndexed { index_count, instance_count, first_index, base_vertex, first_instance });
        Ok(())
    }

    pub fn draw_indexed_indirect_with_count(
        &mut self,
        indirect_buffer: Name,
        count_buffer: Name,
        count_offset: u64,
        max_draws: u32,
        stride: u32,
    ) -> Result<()> {
        self.touch_resource(indirect_buffer, PipelineStage::INDIRECT, AccessKind::Read, false);
        self.touch_resource(count_buffer, PipelineStage::INDIRECT, AccessKind::Read, false);
        self.handle_pending_graphic_state()?;
        self.commands.push(Command::DrawIndexedIndirectWithCount { indirect_buffer, count_buffer, count_offset, max_draws, stride });
        Ok(())
    }

    /// Binds the shared full-screen-triangle vertex shader and draws it with
    /// no vertex buffer bound, matching the ported renderer's single shared
    /// full-screen-quad pipeline used by every post-process pass.
    pub fn draw_full_screen_quad(&mut self) -> Result<()> {
        self.pending_pipeline.vertex_shader.get_or_insert_with(|| Name::new("common/full_screen.vshader"));
        self.pending_pipeline.topology = Some(wgpu::PrimitiveTopology::TriangleStrip);
        self.handle_pending_graphic_state()?;
        self.commands.push(Command::Draw { vertex_count: 4, instance_count: 1, first_vertex: 0, first_instance: 0 });
        Ok(())
    }

    pub fn dispatch(&mut self, x: u32, y: u32, z: u32) -> Result<()> {
        self.handle_pending_compute_state()?;
        self.commands.push(Command::Dispatch { x, y, z });
        Ok(())
    }

    // ── Transfers ─────────────────────────────────────────────────────────

    pub fn copy_buffer(&mut self, src: Name, dst: Name, size: u64) {
        self.touch_resource(src, PipelineStage::TRANSFER, AccessKind::Read, false);
        self.touch_resource(dst, PipelineStage::TRANSFER, AccessKind::Write, false);
        self.commands.push(Command::CopyBuffer { src, dst, size });
    }

    pub fn copy_texture_to_buffer(&mut self, texture: Name, buffer: Name) {
        self.touch_resource(texture, PipelineStage::TRANSFER, AccessKind::Read, true);
        self.touch_resource(buffer, PipelineStage::TRANSFER, AccessKind::Write, false);
        self.commands.push(Command::CopyTextureToBuffer { texture, buffer });
    }

    pub fn copy_buffer_to_texture(&mut self, buffer: Name, texture: Name) {
        self.touch_resource(buffer, PipelineStage::TRANSFER, AccessKind::Read, false);
        self.touch_resource(texture, PipelineStage::TRANSFER, AccessKind::Write, true);
        self.commands.push(Command::CopyBufferToTexture { buffer, texture });
    }

    pub fn fill_buffer_raw(&mut self, buffer: Name, bytes: Vec<u8>) -> Result<()> {
        if bytes.is_empty() {
            return Err(ForgeError::InvalidTransferDestination(format!("fill_buffer_raw: empty payload for {buffer}")));
        }
        self.touch_resource(buffer, PipelineStage::TRANSFER, AccessKind::Write, false);
        self.commands.push(Command::FillBufferRaw { buffer, bytes });
        Ok(())
    }

    // ── Export ───────────────────────────────────────────────────────────

    pub fn export_texture(&mut self, name: Name, stage: PipelineStage, access: AccessKind) {
        self.touch_resource(name, stage, access, true);
    }

    pub fn export_buffer(&mut self, name: Name, stage: PipelineStage, access: AccessKind) {
        self.touch_resource(name, stage, access, false);
    }

    // ── Barrier inference ────────────────────────────────────────────────

    fn touch_resource(&mut self, name: Name, target_stage: PipelineStage, target_access: AccessKind, is_texture: bool) {
        let prev = self.resource_tracking.get(&name).copied();
        match prev {
            Some(prev) if target_access == AccessKind::Read && prev.access == AccessKind::Read => {
                if let Some(&idx) = self.last_barrier_cmd_index.get(&name) {
                    match &mut self.commands[idx] {
                        Command::TextureBarrier(record) | Command::BufferBarrier(record) => {
                            record.dst_stage |= target_stage;
                        }
                        _ => unreachable!("barrier index must point at a barrier command"),
                    }
                }
                self.resource_tracking.insert(name, ResourceState { stage: prev.stage | target_stage, access: prev.access });
            }
            _ => {
                let src = prev.unwrap_or(ResourceState::UNDEFINED);
                let dst = ResourceState { stage: target_stage, access: target_access };
                let record = BarrierRecord { resource: name, is_texture, src_stage: src.stage, dst_stage: dst.stage, src_state: src, dst_state: dst };
                let idx = self.commands.len();
                self.commands.push(if is_texture { Command::TextureBarrier(record) } else { Command::BufferBarrier(record) });
                self.last_barrier_cmd_index.insert(name, idx);
                self.resource_tracking.insert(name, dst);
            }
        }
    }

    /// The barriers inferred so far, in emission order — used by tests to
    /// compare against an expected trace.
    #[must_use]
    pub fn barrier_trace(&self) -> Vec<BarrierRecord> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::TextureBarrier(b) | Command::BufferBarrier(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubResolver {
        next_render: u32,
        next_compute: u32,
    }

    impl PipelineResolver for StubResolver {
        fn resolve_graphics(&mut self, _key: &GraphicsPipelineKey) -> RenderPipelineId {
            let id = self.next_render;
            self.next_render += 1;
            // SAFETY-free: constructed via the crate-visible tuple field.
            crate::pipeline::RenderPipelineId::from_raw(id)
        }

        fn resolve_compute(&mut self, _key: &ComputePipelineKey) -> ComputePipelineId {
            let id = self.next_compute;
            self.next_compute += 1;
            crate::pipeline::ComputePipelineId::from_raw(id)
        }
    }

    fn resolver() -> StubResolver {
        StubResolver { next_render: 0, next_compute: 0 }
    }

    #[test]
    fn first_access_emits_undefined_to_target_barrier() {
        let mut resolver = resolver();
        let mut ctx = BuildContext::new(Name::new("job"), &mut resolver);
        ctx.bind_vertex_shader(Name::new("shade.vshader"));
        ctx.bind_fragment_shader(Name::new("shade.fshader"));
        let tex = Name::new("gbuffer.albedo");
        ctx.bind_samplable_texture(0, tex);
        let trace = ctx.barrier_trace();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].src_stage, PipelineStage::empty());
        assert_eq!(trace[0].dst_stage, PipelineStage::FRAGMENT_SHADER | PipelineStage::VERTEX_SHADER);
    }

    #[test]
    fn compatible_reads_extend_the_existing_barrier_instead_of_emitting_a_new_one() {
        let mut resolver = resolver();
        let mut ctx = BuildContext::new(Name::new("job"), &mut resolver);
        let tex = Name::new("gbuffer.normal");
        ctx.bind_fragment_shader(Name::new("shade.fshader"));
        ctx.bind_samplable_texture(0, tex);
        ctx.bind_compute_shader(Name::new("ao.cshader"));
        // NB: compute shader set alongside a fragment shader is unusual, but
        // exercises stage-set coalescing independent of which stage it is.
        ctx.pending_pipeline.compute_shader = None;
        ctx.bind_samplable_texture(1, tex);
        assert_eq!(ctx.barrier_trace().len(), 1);
    }

    #[test]
    fn write_after_read_emits_a_fresh_barrier() {
        let mut resolver = resolver();
        let mut ctx = BuildContext::new(Name::new("job"), &mut resolver);
        let tex = Name::new("hi_z.mip0");
        ctx.bind_samplable_texture(0, tex);
        ctx.export_texture(tex, PipelineStage::COMPUTE_SHADER, AccessKind::Write);
        let trace = ctx.barrier_trace();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[1].dst_state.access, AccessKind::Write);
    }

    #[test]
    fn draw_without_a_bound_vertex_shader_is_an_error() {
        let mut resolver = resolver();
        let mut ctx = BuildContext::new(Name::new("job"), &mut resolver);
        assert!(ctx.draw_primitives(3, 0, 1, 0).is_err());
    }
}
