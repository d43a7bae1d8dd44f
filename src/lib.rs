#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod bindless_scene;
pub mod config;
pub mod culling;
pub mod errors;
pub mod gpu;
pub mod memory;
pub mod name;
pub mod pipeline;
pub mod render_graph;
pub mod rendering_job;
pub mod resource;
pub mod stages;

pub use bindless_scene::{BindlessScene, BindlessSceneObject};
pub use config::{CullingSettings, JobGraphSettings, RenderSettings};
pub use errors::{ForgeError, Result};
pub use gpu::{GpuContext, GpuSettings, RenderSurface};
pub use name::Name;
pub use render_graph::{BuildContext, Job, JobGraph};
pub use rendering_job::RenderingJob;
