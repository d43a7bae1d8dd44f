//! Job state machine and topological scheduling across the job graph.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::JobGraphSettings;
use crate::errors::{ForgeError, Result};
use crate::gpu::{write_descriptors, BindGroupKey, CommandList, DescriptorBinding, DescriptorStorage};
use crate::name::Name;
use crate::pipeline::{ComputePipelineId, PipelineCache, RenderPipelineId};
use crate::render_graph::build_context::{BufferDecl, TextureDecl, TextureSize};
use crate::render_graph::command::{BoundResource, Command, StageSet};
use crate::resource::ResourceStorage;

use super::build_context::BuildContext;

/// A proof of GPU-side submission order between two jobs, standing in for a
/// raw semaphore: `wgpu` queue submission is itself ordered, so this token
/// exists for graph bookkeeping and test introspection rather than to be
/// waited on through any `wgpu` API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemaphoreToken(u64);

/// Lifecycle a job passes through once per frame it participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Declared,
    Built,
    Recording,
    Executable,
    Executing,
    Done,
}

/// One job's declared resources, recorded command stream, and per-frame
/// semaphore sets.
pub struct Job {
    name: Name,
    texture_decls: FxHashMap<Name, TextureDecl>,
    buffer_decls: FxHashMap<Name, BufferDecl>,
    commands: Vec<Command>,
    descriptor_counts: FxHashMap<&'static str, u32>,
    state: JobState,
    wait_semaphores: Vec<Vec<SemaphoreToken>>,
    signal_semaphores: Vec<Vec<SemaphoreToken>>,
}

impl Job {
    fn new(name: Name, frames_in_flight: u32) -> Self {
        Self {
            name,
            texture_decls: FxHashMap::default(),
            buffer_decls: FxHashMap::default(),
            commands: Vec::new(),
            descriptor_counts: FxHashMap::default(),
            state: JobState::Declared,
            wait_semaphores: vec![Vec::new(); frames_in_flight as usize],
            signal_semaphores: vec![Vec::new(); frames_in_flight as usize],
        }
    }

    #[must_use]
    pub fn name(&self) -> Name {
        self.name
    }

    #[must_use]
    pub fn state(&self) -> JobState {
        self.state
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}

struct Edge {
    consumer: Name,
    producer: Name,
    previous_frame: bool,
}

/// Topologically schedules [`Job`]s, materializes their declared resources,
/// and submits their recorded command streams in dependency order.
pub struct JobGraph {
    jobs: FxHashMap<Name, Job>,
    external: FxHashSet<Name>,
    edges: Vec<Edge>,
    order: Vec<Name>,
    next_token: u64,
    screen_size: (u32, u32),
    frames_in_flight: u32,
    descriptors: DescriptorStorage,
}

impl JobGraph {
    #[must_use]
    pub fn new(screen_width: u32, screen_height: u32, settings: JobGraphSettings) -> Self {
        Self {
            jobs: FxHashMap::default(),
            external: FxHashSet::default(),
            edges: Vec::new(),
            order: Vec::new(),
            next_token: 0,
            screen_size: (screen_width, screen_height),
            frames_in_flight: settings.frames_in_flight,
            descriptors: DescriptorStorage::new(),
        }
    }

    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen_size = (width, height);
    }

    #[must_use]
    pub fn frames_in_flight(&self) -> u32 {
        self.frames_in_flight
    }

    /// Declares a job and lets `populate` record its `BuildContext`.
    ///
    /// The spec'd contract hands the caller a live `&mut BuildContext` to
    /// populate at leisure; here that is expressed as a closure instead, so
    /// `BuildContext`'s borrow of the pipeline resolver cannot outlive the
    /// call and alias the rest of `JobGraph`.
    pub fn add_job(
        &mut self,
        name: Name,
        resolver: &mut dyn super::build_context::PipelineResolver,
        populate: impl FnOnce(&mut BuildContext),
    ) {
        let mut ctx = BuildContext::new(name, resolver);
        populate(&mut ctx);

        let mut job = Job::new(name, self.frames_in_flight);
        job.texture_decls = ctx.texture_decls().clone();
        job.buffer_decls = ctx.buffer_decls().clone();
        job.commands = ctx.commands().to_vec();
        job.descriptor_counts = ctx.descriptor_counts().clone();
        self.jobs.insert(name, job);
    }

    /// Registers a slot whose semaphores are host-supplied (swapchain
    /// acquire/present) rather than produced by a `BuildContext`.
    pub fn add_external_job(&mut self, name: Name) {
        self.external.insert(name);
        self.jobs.entry(name).or_insert_with(|| Job::new(name, self.frames_in_flight));
    }

    pub fn add_dependency(&mut self, consumer: Name, producer: Name, previous_frame: bool) {
        self.edges.push(Edge { consumer, producer, previous_frame });
    }

    /// Topologically sorts same-frame edges, then materializes every
    /// declared resource into `storage` for every frame-in-flight slot.
    pub fn build_jobs(&mut self, device: &wgpu::Device, storage: &mut ResourceStorage, final_job: Name) -> Result<()> {
        self.order = self.topological_order(final_job)?;

        for &name in &self.order.clone() {
            if self.external.contains(&name) {
                continue;
            }
            let (textures, buffers) = {
                let job = self.jobs.get(&name).expect("ordered job must exist");
                (job.texture_decls.clone(), job.buffer_decls.clone())
            };

            for frame in 0..self.frames_in_flight {
                for (&res_name, decl) in &textures {
                    let (width, height) = match decl.size {
                        TextureSize::Fixed { width, height } => (width, height),
                        TextureSize::ScreenSize => self.screen_size,
                    };
                    let texture = device.create_texture(&wgpu::TextureDescriptor {
                        label: Some(&format!("{res_name}@{frame}")),
                        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format: decl.format,
                        usage: decl.usage,
                        view_formats: &[],
                    });
                    storage.register_texture(res_name, frame, texture);
                }
                for (&res_name, decl) in &buffers {
                    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some(&format!("{res_name}@{frame}")),
                        size: decl.size,
                        usage: decl.usage,
                        mapped_at_creation: false,
                    });
                    storage.register_buffer(res_name, frame, buffer);
                }
            }

            self.jobs.get_mut(&name).expect("ordered job must exist").state = JobState::Built;
        }
        Ok(())
    }

    /// Assigns a fresh [`SemaphoreToken`] to every dependency edge, for every
    /// frame-in-flight slot. Previous-frame edges wire the producer's token
    /// at frame `k` into the consumer's wait set at frame `(k + 1) % frames_in_flight`.
    pub fn build_semaphores(&mut self) {
        for frame in 0..self.frames_in_flight {
            let edges: Vec<(Name, Name, bool)> =
                self.edges.iter().map(|e| (e.consumer, e.producer, e.previous_frame)).collect();
            for (consumer, producer, previous_frame) in edges {
                let token = SemaphoreToken(self.next_token);
                self.next_token += 1;

                if let Some(job) = self.jobs.get_mut(&producer) {
                    job.signal_semaphores[frame as usize].push(token);
                }
                let consumer_frame = if previous_frame { (frame + 1) % self.frames_in_flight } else { frame };
                if let Some(job) = self.jobs.get_mut(&consumer) {
                    job.wait_semaphores[consumer_frame as usize].push(token);
                }
            }
        }
    }

    #[must_use]
    pub fn wait_semaphores(&self, job: Name, frame: u32) -> &[SemaphoreToken] {
        self.jobs.get(&job).map_or(&[], |j| &j.wait_semaphores[frame as usize])
    }

    #[must_use]
    pub fn signal_semaphores(&self, job: Name, frame: u32) -> &[SemaphoreToken] {
        self.jobs.get(&job).map_or(&[], |j| &j.signal_semaphores[frame as usize])
    }

    /// The token proving `producer@frame-1` (or `@frame`, for a same-frame
    /// edge) orders-before `consumer@frame`, if that edge was declared.
    #[must_use]
    pub fn semaphore(&self, consumer: Name, producer: Name, frame: u32) -> Option<SemaphoreToken> {
        let producer_frame = if self.edges.iter().any(|e| e.consumer == consumer && e.producer == producer && e.previous_frame) {
            (frame + self.frames_in_flight - 1) % self.frames_in_flight
        } else {
            frame
        };
        self.jobs.get(&producer)?.signal_semaphores[producer_frame as usize].last().copied()
    }

    #[must_use]
    pub fn order(&self) -> &[Name] {
        &self.order
    }

    /// Computes the topological order `build_jobs` would use, without
    /// materializing any GPU resources — lets hosts (and tests) validate
    /// graph shape before a device is available.
    pub fn dry_run_order(&self, final_job: Name) -> Result<Vec<Name>> {
        self.topological_order(final_job)
    }

    #[must_use]
    pub fn job(&self, name: Name) -> Option<&Job> {
        self.jobs.get(&name)
    }

    /// Submits every non-external job's recorded command stream for
    /// `frame_index`, in topological order, resolving declared resources
    /// through `storage` and pipelines through `pipeline_cache`.
    pub fn execute(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline_cache: &PipelineCache,
        storage: &ResourceStorage,
        frame_index: u32,
    ) -> Result<()> {
        for &name in &self.order.clone() {
            if self.external.contains(&name) {
                continue;
            }
            let commands = {
                let job = self.jobs.get_mut(&name).expect("ordered job must exist");
                job.state = JobState::Recording;
                job.commands.clone()
            };

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&format!("{name}@{frame_index}")),
            });
            {
                let mut list = CommandList::new(&mut encoder);
                replay(&mut list, &commands, pipeline_cache, &mut self.descriptors, storage, device, queue, name, frame_index)?;
            }

            let job = self.jobs.get_mut(&name).expect("ordered job must exist");
            job.state = JobState::Executable;
            job.state = JobState::Executing;
            queue.submit(std::iter::once(encoder.finish()));
            job.state = JobState::Done;
        }
        Ok(())
    }

    fn topological_order(&self, final_job: Name) -> Result<Vec<Name>> {
        let mut in_degree: FxHashMap<Name, u32> = self.jobs.keys().map(|&n| (n, 0)).collect();
        let mut adjacency: FxHashMap<Name, Vec<Name>> = FxHashMap::default();
        for edge in self.edges.iter().filter(|e| !e.previous_frame) {
            adjacency.entry(edge.producer).or_default().push(edge.consumer);
            *in_degree.entry(edge.consumer).or_insert(0) += 1;
        }

        let mut ready: Vec<Name> = in_degree.iter().filter(|&(_, &deg)| deg == 0).map(|(&n, _)| n).collect();
        ready.sort_by_key(Name::raw);

        let mut order = Vec::with_capacity(self.jobs.len());
        while let Some(name) = ready.pop() {
            order.push(name);
            if let Some(consumers) = adjacency.get(&name) {
                for &consumer in consumers {
                    let deg = in_degree.get_mut(&consumer).expect("consumer must be tracked");
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(consumer);
                    }
                }
            }
            ready.sort_by_key(Name::raw);
        }

        if order.len() != self.jobs.len() {
            return Err(ForgeError::JobGraphCycle(format!(
                "job graph has a cycle not resolved by previous-frame edges (reached {}/{} jobs building toward {final_job})",
                order.len(),
                self.jobs.len()
            )));
        }
        Ok(order)
    }
}

/// Resolves one recorded binding against `storage`, producing the borrowed
/// form `write_descriptors` needs.
fn resolve_bound_resource<'s>(resource: &BoundResource, storage: &'s ResourceStorage, frame_index: u32) -> Result<DescriptorBinding<'s>> {
    match resource {
        BoundResource::UniformBuffer(name) => Ok(DescriptorBinding::UniformBuffer {
            buffer: storage.buffer(*name, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(name.to_string()))?,
            offset: 0,
            size: None,
        }),
        BoundResource::StorageBuffer(name) => Ok(DescriptorBinding::StorageBuffer {
            buffer: storage.buffer(*name, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(name.to_string()))?,
            offset: 0,
            size: None,
            read_only: false,
        }),
        BoundResource::SampledTexture(name) => Ok(DescriptorBinding::SampledTexture {
            view: storage.texture_view(*name, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(name.to_string()))?,
        }),
        BoundResource::RwTexture(name) => Ok(DescriptorBinding::StorageTexture {
            view: storage.texture_view(*name, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(name.to_string()))?,
        }),
        BoundResource::UniformBufferArray(names) => {
            let buffers = names
                .iter()
                .map(|&name| {
                    storage
                        .buffer(name, frame_index)
                        .map(|buffer| wgpu::BufferBinding { buffer, offset: 0, size: None })
                        .ok_or_else(|| ForgeError::ResourceNotDeclared(name.to_string()))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(DescriptorBinding::UniformBufferArray { buffers })
        }
        BoundResource::SampledTextureArray(names) => {
            let views = names
                .iter()
                .map(|&name| storage.texture_view(name, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(name.to_string())))
                .collect::<Result<Vec<_>>>()?;
            Ok(DescriptorBinding::SampledTextureArray { views })
        }
    }
}

/// Content fingerprint for one binding, folding in every `Name` it touches at
/// `frame_index`. Used to build a [`BindGroupKey`] that only collides when
/// two bind groups would truly be identical.
fn bound_resource_fingerprint(resource: &BoundResource, frame_index: u32) -> u64 {
    match resource {
        BoundResource::UniformBuffer(name)
        | BoundResource::StorageBuffer(name)
        | BoundResource::SampledTexture(name)
        | BoundResource::RwTexture(name) => ResourceStorage::fingerprint(*name, frame_index),
        BoundResource::UniformBufferArray(names) | BoundResource::SampledTextureArray(names) => {
            names.iter().fold(0u64, |acc, &name| acc ^ ResourceStorage::fingerprint(name, frame_index).rotate_left(1))
        }
    }
}

/// Extent and row-padded buffer layout covering the whole of `texture`, for a
/// full-resource texture↔buffer copy.
fn full_resource_copy_layout(texture: &wgpu::Texture) -> (wgpu::Extent3d, wgpu::TexelCopyBufferLayout) {
    let size = texture.size();
    let block_size = texture.format().block_copy_size(None).unwrap_or(4);
    let unaligned_bytes_per_row = size.width * block_size;
    let bytes_per_row = unaligned_bytes_per_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (size, wgpu::TexelCopyBufferLayout { offset: 0, bytes_per_row: Some(bytes_per_row), rows_per_image: Some(size.height) })
}

/// Replays one job's recorded `Command` stream into real `wgpu` calls.
///
/// Barrier commands never lower to a `wgpu` call (see `BuildContext`'s module
/// doc, `wgpu` synchronizes automatically); every other command issues against
/// `list`, the currently open render/compute pass, or `queue` directly. A
/// render or compute pass stays open across consecutive draws/dispatches —
/// `BuildContext` only re-emits `BindGraphicsPipeline`/`BindComputePipeline`
/// the first time a given pipeline state is bound, so the pass that command
/// opens has to survive every subsequent same-pipeline command until the next
/// `BeginRenderPass`, `EndRenderPass`, or copy forces it closed.
fn replay(
    list: &mut CommandList<'_>,
    commands: &[Command],
    pipeline_cache: &PipelineCache,
    descriptors: &mut DescriptorStorage,
    storage: &ResourceStorage,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    job: Name,
    frame_index: u32,
) -> Result<()> {
    enum ActivePass<'p> {
        Render(wgpu::RenderPass<'p>),
        Compute(wgpu::ComputePass<'p>),
    }

    let mut pass: Option<ActivePass<'_>> = None;
    let mut graphics_pipeline: Option<RenderPipelineId> = None;
    let mut compute_pipeline: Option<ComputePipelineId> = None;

    for command in commands {
        match command {
            Command::TextureBarrier(_) | Command::BufferBarrier(_) => {}

            Command::BeginRenderPass { name, color_attachments, depth_attachment, clear_color, clear_depth } => {
                pass = None;
                let color_views = color_attachments
                    .iter()
                    .map(|&res| storage.texture_view(res, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(res.to_string())))
                    .collect::<Result<Vec<_>>>()?;
                let load = if *clear_color { wgpu::LoadOp::Clear(wgpu::Color::BLACK) } else { wgpu::LoadOp::Load };
                let attachments: Vec<Option<wgpu::RenderPassColorAttachment<'_>>> = color_views
                    .into_iter()
                    .map(|view| {
                        Some(wgpu::RenderPassColorAttachment { view, resolve_target: None, ops: wgpu::Operations { load, store: wgpu::StoreOp::Store } })
                    })
                    .collect();
                let depth_view = depth_attachment
                    .map(|res| storage.texture_view(res, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(res.to_string())))
                    .transpose()?;
                let depth_stencil_attachment = depth_view.map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: if *clear_depth { wgpu::LoadOp::Clear(1.0) } else { wgpu::LoadOp::Load },
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });
                let render_pass = list.begin_rendering(&wgpu::RenderPassDescriptor {
                    label: Some(&name.to_string()),
                    color_attachments: &attachments,
                    depth_stencil_attachment,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                pass = Some(ActivePass::Render(render_pass));
                graphics_pipeline = None;
            }

            Command::EndRenderPass => {
                pass = None;
            }

            Command::BindGraphicsPipeline(id) => {
                graphics_pipeline = Some(*id);
                if let Some(ActivePass::Render(render_pass)) = pass.as_mut() {
                    render_pass.set_pipeline(pipeline_cache.get_render_pipeline(*id));
                } else {
                    log::warn!("BindGraphicsPipeline outside a render pass in job {job}");
                }
            }

            Command::BindComputePipeline(id) => {
                compute_pipeline = Some(*id);
                if pass.is_none() {
                    pass = Some(ActivePass::Compute(list.begin_compute(&job.to_string())));
                }
                if let Some(ActivePass::Compute(compute_pass)) = pass.as_mut() {
                    compute_pass.set_pipeline(pipeline_cache.get_compute_pipeline(*id));
                } else {
                    log::warn!("BindComputePipeline while a render pass was open in job {job}");
                }
            }

            Command::BindDescriptors { stage, bindings } => {
                let entries =
                    bindings.iter().map(|binding| resolve_bound_resource(&binding.resource, storage, frame_index)).collect::<Result<Vec<_>>>()?;

                let (pipeline_index, stage_tag, layout) = match stage {
                    StageSet::Graphics => {
                        let id = graphics_pipeline
                            .ok_or_else(|| ForgeError::ResourceNotDeclared(format!("descriptors bound with no graphics pipeline active in job {job}")))?;
                        (id.index(), 0u64, pipeline_cache.get_render_pipeline(id).get_bind_group_layout(0))
                    }
                    StageSet::Compute => {
                        let id = compute_pipeline
                            .ok_or_else(|| ForgeError::ResourceNotDeclared(format!("descriptors bound with no compute pipeline active in job {job}")))?;
                        (id.index(), 1u64, pipeline_cache.get_compute_pipeline(id).get_bind_group_layout(0))
                    }
                };

                let mut key = BindGroupKey::new((pipeline_index as u64) << 1 | stage_tag);
                for binding in bindings {
                    key = key.with_resource(bound_resource_fingerprint(&binding.resource, frame_index));
                }

                let bind_group = descriptors.get_or_create(key, || write_descriptors(device, &layout, job, &entries));
                match pass.as_mut() {
                    Some(ActivePass::Render(render_pass)) => render_pass.set_bind_group(0, bind_group, &[]),
                    Some(ActivePass::Compute(compute_pass)) => compute_pass.set_bind_group(0, bind_group, &[]),
                    None => log::warn!("BindDescriptors issued with no active pass in job {job}"),
                }
            }

            Command::BindVertexBuffer { buffer, offset } => {
                let buffer = storage.buffer(*buffer, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(buffer.to_string()))?;
                if let Some(ActivePass::Render(render_pass)) = pass.as_mut() {
                    render_pass.set_vertex_buffer(0, buffer.slice(*offset..));
                }
            }

            Command::BindIndexBuffer { buffer, offset, format } => {
                let buffer = storage.buffer(*buffer, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(buffer.to_string()))?;
                if let Some(ActivePass::Render(render_pass)) = pass.as_mut() {
                    render_pass.set_index_buffer(buffer.slice(*offset..), *format);
                }
            }

            Command::Draw { vertex_count, instance_count, first_vertex, first_instance } => {
                if let Some(ActivePass::Render(render_pass)) = pass.as_mut() {
                    render_pass.draw(*first_vertex..first_vertex + vertex_count, *first_instance..first_instance + instance_count);
                }
            }

            Command::DrawIndexed { index_count, instance_count, first_index, base_vertex, first_instance } => {
                if let Some(ActivePass::Render(render_pass)) = pass.as_mut() {
                    render_pass.draw_indexed(*first_index..first_index + index_count, *base_vertex, *first_instance..first_instance + instance_count);
                }
            }

            // `stride` is not consumed here: `wgpu::RenderPass::multi_draw_indexed_indirect_count`
            // assumes the standard fixed `DrawIndexedIndirect` record size and has no
            // custom-stride variant.
            Command::DrawIndexedIndirectWithCount { indirect_buffer, count_buffer, count_offset, max_draws, stride: _ } => {
                let indirect =
                    storage.buffer(*indirect_buffer, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(indirect_buffer.to_string()))?;
                let count = storage.buffer(*count_buffer, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(count_buffer.to_string()))?;
                if let Some(ActivePass::Render(render_pass)) = pass.as_mut() {
                    render_pass.multi_draw_indexed_indirect_count(indirect, 0, count, *count_offset, *max_draws);
                }
            }

            Command::Dispatch { x, y, z } => {
                if pass.is_none() {
                    pass = Some(ActivePass::Compute(list.begin_compute(&job.to_string())));
                }
                if let Some(ActivePass::Compute(compute_pass)) = pass.as_mut() {
                    compute_pass.dispatch_workgroups(*x, *y, *z);
                }
            }

            Command::CopyBuffer { src, dst, size } => {
                pass = None;
                let src_buffer = storage.buffer(*src, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(src.to_string()))?;
                let dst_buffer = storage.buffer(*dst, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(dst.to_string()))?;
                list.copy_buffer_to_buffer(src_buffer, 0, dst_buffer, 0, *size);
            }

            Command::CopyTextureToBuffer { texture, buffer } => {
                pass = None;
                let tex = storage.texture(*texture, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(texture.to_string()))?;
                let buf = storage.buffer(*buffer, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(buffer.to_string()))?;
                let (extent, layout) = full_resource_copy_layout(tex);
                list.copy_texture_to_buffer(
                    wgpu::TexelCopyTextureInfo { texture: tex, mip_level: 0, origin: wgpu::Origin3d::ZERO, aspect: wgpu::TextureAspect::All },
                    wgpu::TexelCopyBufferInfo { buffer: buf, layout },
                    extent,
                );
            }

            Command::CopyBufferToTexture { buffer, texture } => {
                pass = None;
                let buf = storage.buffer(*buffer, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(buffer.to_string()))?;
                let tex = storage.texture(*texture, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(texture.to_string()))?;
                let (extent, layout) = full_resource_copy_layout(tex);
                list.copy_buffer_to_texture(
                    wgpu::TexelCopyBufferInfo { buffer: buf, layout },
                    wgpu::TexelCopyTextureInfo { texture: tex, mip_level: 0, origin: wgpu::Origin3d::ZERO, aspect: wgpu::TextureAspect::All },
                    extent,
                );
            }

            Command::FillBufferRaw { buffer, bytes } => {
                pass = None;
                let buf = storage.buffer(*buffer, frame_index).ok_or_else(|| ForgeError::ResourceNotDeclared(buffer.to_string()))?;
                queue.write_buffer(buf, 0, bytes);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ComputePipelineId, ComputePipelineKey, GraphicsPipelineKey, RenderPipelineId};
    use crate::render_graph::build_context::PipelineResolver;

    struct NullResolver;
    impl PipelineResolver for NullResolver {
        fn resolve_graphics(&mut self, _key: &GraphicsPipelineKey) -> RenderPipelineId {
            RenderPipelineId::from_raw(0)
        }
        fn resolve_compute(&mut self, _key: &ComputePipelineKey) -> ComputePipelineId {
            ComputePipelineId::from_raw(0)
        }
    }

    fn graph_with_chain() -> JobGraph {
        let mut graph = JobGraph::new(800, 600, JobGraphSettings::default());
        let mut resolver = NullResolver;
        graph.add_job(Name::new("depth_prepass"), &mut resolver, |_| {});
        graph.add_job(Name::new("hi_z"), &mut resolver, |_| {});
        graph.add_job(Name::new("cull"), &mut resolver, |_| {});
        graph.add_job(Name::new("gbuffer"), &mut resolver, |_| {});
        graph.add_dependency(Name::new("hi_z"), Name::new("depth_prepass"), false);
        graph.add_dependency(Name::new("cull"), Name::new("hi_z"), false);
        graph.add_dependency(Name::new("gbuffer"), Name::new("cull"), false);
        graph
    }

    #[test]
    fn topological_order_respects_same_frame_edges() {
        let mut graph = graph_with_chain();
        let order = graph.topological_order(Name::new("gbuffer")).unwrap();
        let pos = |n: &str| order.iter().position(|&x| x == Name::new(n)).unwrap();
        assert!(pos("depth_prepass") < pos("hi_z"));
        assert!(pos("hi_z") < pos("cull"));
        assert!(pos("cull") < pos("gbuffer"));
    }

    #[test]
    fn same_frame_cycle_is_rejected() {
        let mut graph = graph_with_chain();
        graph.add_dependency(Name::new("depth_prepass"), Name::new("gbuffer"), false);
        assert!(graph.topological_order(Name::new("gbuffer")).is_err());
    }

    #[test]
    fn previous_frame_edge_does_not_create_a_same_frame_cycle() {
        let mut graph = graph_with_chain();
        // a feedback edge is fine as long as it crosses the frame boundary
        graph.add_dependency(Name::new("depth_prepass"), Name::new("gbuffer"), true);
        assert!(graph.topological_order(Name::new("gbuffer")).is_ok());
    }

    #[test]
    fn build_semaphores_wires_previous_frame_edges_across_the_frame_boundary() {
        let mut graph = graph_with_chain();
        graph.add_dependency(Name::new("depth_prepass"), Name::new("gbuffer"), true);
        graph.build_semaphores();

        let token_frame0 = graph.signal_semaphores(Name::new("gbuffer"), 0).last().copied();
        assert!(token_frame0.is_some());
        assert!(graph.wait_semaphores(Name::new("depth_prepass"), 1).contains(&token_frame0.unwrap()));
    }

    #[test]
    fn semaphore_lookup_finds_membership_in_both_sets() {
        let mut graph = graph_with_chain();
        graph.build_semaphores();
        let token = graph.semaphore(Name::new("hi_z"), Name::new("depth_prepass"), 0).unwrap();
        assert!(graph.signal_semaphores(Name::new("depth_prepass"), 0).contains(&token));
        assert!(graph.wait_semaphores(Name::new("hi_z"), 0).contains(&token));
    }

    #[test]
    fn frames_in_flight_defaults_to_three() {
        let graph = JobGraph::new(320, 240, JobGraphSettings::default());
        assert_eq!(graph.frames_in_flight(), 3);
    }
}
