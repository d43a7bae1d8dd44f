//! Command-recording DSL and job scheduling: the render-graph core.
//!
//! [`BuildContext`] is populated once per job build and records an ordered
//! [`Command`] stream plus inferred barriers; [`JobGraph`] topologically
//! sorts jobs, materializes their declared resources into
//! `crate::resource::ResourceStorage`, and submits command lists in
//! dependency order once per frame.

mod build_context;
mod command;
mod job;

pub use build_context::{AccessKind, BuildContext, PipelineResolver, PipelineStage, ResourceState};
pub use command::{BarrierRecord, Command};
pub use job::{Job, JobGraph, SemaphoreToken};
