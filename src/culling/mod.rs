//! Depth-prepass + hierarchical-Z occlusion culling feeding the GBuffer
//! stage's indirect draws, grouped by material template.

mod occlusion;

pub use occlusion::{frustum_cull, hi_z_max_reduce, OcclusionCulling};
