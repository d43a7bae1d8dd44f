use criterion::{criterion_group, criterion_main, Criterion};

use forma::name::Name;
use forma::pipeline::{ComputePipelineId, ComputePipelineKey, GraphicsPipelineKey, RenderPipelineId};
use forma::render_graph::BuildContext;

struct BenchResolver {
    next_render: u32,
    next_compute: u32,
}

impl forma::render_graph::PipelineResolver for BenchResolver {
    fn resolve_graphics(&mut self, _key: &GraphicsPipelineKey) -> RenderPipelineId {
        let id = self.next_render;
        self.next_render += 1;
        RenderPipelineId::from_raw(id)
    }

    fn resolve_compute(&mut self, _key: &ComputePipelineKey) -> ComputePipelineId {
        let id = self.next_compute;
        self.next_compute += 1;
        ComputePipelineId::from_raw(id)
    }
}

fn record_gbuffer_like_job(resolver: &mut BenchResolver) {
    let mut ctx = BuildContext::new(Name::new("bench.gbuffer"), resolver);

    ctx.declare_render_target(Name::new("gbuffer.albedo"), wgpu::TextureFormat::Rgba8UnormSrgb);
    ctx.declare_depth_target(Name::new("gbuffer.depth"), wgpu::TextureFormat::Depth32Float);

    ctx.begin_render_pass(Name::new("gbuffer.pass"), &[Name::new("gbuffer.albedo")], Some(Name::new("gbuffer.depth")), true, true);
    ctx.bind_vertex_shader(Name::new("gbuffer/opaque.vshader"));
    ctx.bind_fragment_shader(Name::new("gbuffer/opaque.fshader"));

    for object in 0..256u32 {
        let texture = Name::new(&format!("material.texture{}", object % 16));
        ctx.bind_samplable_texture(0, texture);
        ctx.draw_indexed_primitives(36, 0, 0, 1, object).expect("draw should succeed with a bound vertex shader");
    }

    ctx.end_render_pass();
}

fn bench_build_context_recording(c: &mut Criterion) {
    c.bench_function("build_context_record_gbuffer_like_job", |b| {
        b.iter(|| {
            let mut resolver = BenchResolver { next_render: 0, next_compute: 0 };
            record_gbuffer_like_job(&mut resolver);
        });
    });
}

criterion_group!(benches, bench_build_context_recording);
criterion_main!(benches);
