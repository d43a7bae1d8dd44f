//! Composes the GBuffer, ShadowMap, AmbientOcclusion, Shading, and
//! PostProcess stages into one `JobGraph` job.

use crate::errors::Result;
use crate::render_graph::BuildContext;
use crate::stages::{StageConfig, StageKind};

/// A single job made of an ordered list of stages, run back to back inside
/// one `BuildContext` recording.
pub struct RenderingJob {
    stages: Vec<StageKind>,
}

impl RenderingJob {
    #[must_use]
    pub fn new(stages: Vec<StageKind>) -> Self {
        Self { stages }
    }

    /// Declares every stage's resources, then records every stage's
    /// commands in order. Intended as the `populate` closure handed to
    /// `JobGraph::add_job`.
    pub fn populate(&self, ctx: &mut BuildContext, config: &StageConfig) -> Result<()> {
        for stage in &self.stages {
            stage.declare_resources(ctx, config);
        }
        for stage in &self.stages {
            stage.build(ctx, config)?;
        }
        Ok(())
    }
}
