//! Thin recording surface over `wgpu::CommandEncoder`.
//!
//! `render_graph::Job` plays its recorded `Command` stream against a
//! `CommandList` once per frame-in-flight. Barrier calls are no-ops on the
//! encoder itself — `wgpu` synchronizes automatically — but are still routed
//! through here so a caller recording a [`crate::render_graph::BarrierTrace`]
//! sees the same call shape a backend with explicit barriers would.

pub struct CommandList<'enc> {
    encoder: &'enc mut wgpu::CommandEncoder,
}

impl<'enc> CommandList<'enc> {
    pub fn new(encoder: &'enc mut wgpu::CommandEncoder) -> Self {
        Self { encoder }
    }

    pub fn begin_rendering<'pass>(
        &'pass mut self,
        descriptor: &wgpu::RenderPassDescriptor<'pass>,
    ) -> wgpu::RenderPass<'pass> {
        self.encoder.begin_render_pass(descriptor)
    }

    pub fn begin_compute(&mut self, label: &str) -> wgpu::ComputePass<'_> {
        self.encoder.begin_compute_pass(&wgpu::ComputePassDescriptor { label: Some(label), timestamp_writes: None })
    }

    pub fn copy_buffer_to_buffer(
        &mut self,
        src: &wgpu::Buffer,
        src_offset: u64,
        dst: &wgpu::Buffer,
        dst_offset: u64,
        size: u64,
    ) {
        self.encoder.copy_buffer_to_buffer(src, src_offset, dst, dst_offset, size);
    }

    pub fn copy_buffer_to_texture(
        &mut self,
        source: wgpu::TexelCopyBufferInfo<'_>,
        destination: wgpu::TexelCopyTextureInfo<'_>,
        copy_size: wgpu::Extent3d,
    ) {
        self.encoder.copy_buffer_to_texture(source, destination, copy_size);
    }

    pub fn copy_texture_to_buffer(
        &mut self,
        source: wgpu::TexelCopyTextureInfo<'_>,
        destination: wgpu::TexelCopyBufferInfo<'_>,
        copy_size: wgpu::Extent3d,
    ) {
        self.encoder.copy_texture_to_buffer(source, destination, copy_size);
    }

    /// Logical barrier marker. `wgpu` orders GPU work itself; this exists so
    /// the command stream's barrier commands have somewhere to land.
    pub fn buffer_barrier(&mut self, _buffer: &wgpu::Buffer) {}

    /// See [`Self::buffer_barrier`].
    pub fn texture_barrier(&mut self, _texture: &wgpu::Texture) {}

    pub fn finish_into(self) {}
}
