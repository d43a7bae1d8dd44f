use forma::config::JobGraphSettings;
use forma::name::Name;
use forma::pipeline::{ComputePipelineId, ComputePipelineKey, GraphicsPipelineKey, RenderPipelineId};
use forma::render_graph::{BuildContext, JobGraph, PipelineResolver};

struct NullResolver;
impl PipelineResolver for NullResolver {
    fn resolve_graphics(&mut self, _key: &GraphicsPipelineKey) -> RenderPipelineId {
        RenderPipelineId::from_raw(0)
    }
    fn resolve_compute(&mut self, _key: &ComputePipelineKey) -> ComputePipelineId {
        ComputePipelineId::from_raw(0)
    }
}

fn update_view_params_then_gbuffer_graph() -> JobGraph {
    let mut graph = JobGraph::new(1920, 1080, JobGraphSettings::default());
    let mut resolver = NullResolver;
    graph.add_job(Name::new("update_view_params"), &mut resolver, |ctx: &mut BuildContext| {
        ctx.declare_buffer(Name::new("view_params"), 192, wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST);
    });
    graph.add_job(Name::new("gbuffer"), &mut resolver, |ctx: &mut BuildContext| {
        ctx.declare_render_target(Name::new("gbuffer.albedo"), wgpu::TextureFormat::Rgba8UnormSrgb);
    });
    graph.add_external_job(Name::new("acquire_swapchain_image"));
    graph.add_dependency(Name::new("gbuffer"), Name::new("update_view_params"), false);
    graph.add_dependency(Name::new("gbuffer"), Name::new("acquire_swapchain_image"), false);
    graph
}

#[test]
fn execution_order_is_a_valid_topological_sort() {
    let graph = update_view_params_then_gbuffer_graph();
    let order = graph.dry_run_order(Name::new("gbuffer")).unwrap();
    let pos = |n: &str| order.iter().position(|&x| x == Name::new(n)).unwrap();
    assert!(pos("update_view_params") < pos("gbuffer"));
    assert!(pos("acquire_swapchain_image") < pos("gbuffer"));
}

#[test]
fn same_frame_cycles_are_rejected_as_a_job_graph_error() {
    let mut graph = update_view_params_then_gbuffer_graph();
    graph.add_dependency(Name::new("update_view_params"), Name::new("gbuffer"), false);
    assert!(graph.dry_run_order(Name::new("gbuffer")).is_err());
}

#[test]
fn cross_frame_edge_token_is_a_member_of_both_wait_and_signal_sets() {
    let mut graph = update_view_params_then_gbuffer_graph();
    graph.add_dependency(Name::new("update_view_params"), Name::new("gbuffer"), true);
    graph.build_semaphores();

    let token = graph.signal_semaphores(Name::new("gbuffer"), 0).last().copied();
    assert!(token.is_some());
    assert!(graph.wait_semaphores(Name::new("update_view_params"), 1).contains(&token.unwrap()));
}

#[test]
fn a_graph_with_no_jobs_declared_has_an_empty_dry_run_order() {
    let graph = JobGraph::new(800, 600, JobGraphSettings::default());
    assert_eq!(graph.dry_run_order(Name::new("final")).unwrap().len(), 0);
}
