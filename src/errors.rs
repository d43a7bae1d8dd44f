//! Error Types
//!
//! This module defines the error types used throughout the render-graph core.
//!
//! # Overview
//!
//! The main error type [`ForgeError`] covers all failure modes including:
//! - GPU adapter/device initialization failures
//! - Swapchain / presentation errors
//! - Pipeline and shader compilation errors
//! - Job-graph and resource-declaration errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, ForgeError>`.

use thiserror::Error;

/// The main error type for the render-graph core.
///
/// Each variant provides specific context about what went wrong so callers
/// can decide which failures are fatal and which (like [`ForgeError::OutOfDateSwapchain`])
/// are part of ordinary frame lifecycle.
#[derive(Error, Debug)]
pub enum ForgeError {
    // ========================================================================
    // GPU & Device Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("failed to request adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("failed to create device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// The adapter does not support a capability the core requires.
    #[error("unsupported device: {0}")]
    UnsupportedDevice(String),

    /// A requested texture format is not supported by the surface/adapter.
    #[error("unsupported texture format: {0:?}")]
    UnsupportedFormat(wgpu::TextureFormat),

    /// A requested color space is not supported by the surface.
    #[error("unsupported color space: {0}")]
    UnsupportedColorSpace(String),

    /// No adapter was found at all.
    #[error("no supported devices found")]
    NoSupportedDevicesFound,

    /// An adapter was found, but none support the requested feature set.
    #[error("no device supports requested features: {0:?}")]
    NoDeviceSupportsRequestedFeatures(wgpu::Features),

    // ========================================================================
    // Swapchain & Presentation Errors
    // ========================================================================
    /// The swapchain is out of date and must be recreated before the next present.
    #[error("swapchain out of date")]
    OutOfDateSwapchain,

    /// The surface was lost (e.g. window destroyed mid-frame).
    #[error("surface lost")]
    SurfaceLost,

    /// Acquiring the next swapchain image timed out.
    #[error("surface acquire timed out")]
    SurfaceTimeout,

    // ========================================================================
    // Pipeline & Shader Errors
    // ========================================================================
    /// Pipeline state object creation failed.
    #[error("pipeline creation failed: {0}")]
    PsoCreationFailed(String),

    /// A shader stage reference does not resolve to a compiled module.
    #[error("invalid shader stage: {0}")]
    InvalidShaderStage(String),

    /// A vertex layout is malformed (overlapping attributes, bad stride, ...).
    #[error("invalid vertex layout: {0}")]
    InvalidVertexLayout(String),

    // ========================================================================
    // Resource / Job-Graph Errors
    // ========================================================================
    /// A copy or write targeted a resource that cannot receive it.
    #[error("invalid transfer destination: {0}")]
    InvalidTransferDestination(String),

    /// A `BuildContext` command referenced a `Name` that was never declared.
    #[error("resource not declared: {0}")]
    ResourceNotDeclared(String),

    /// `JobGraph::build_jobs` found a cycle that previous-frame edges cannot resolve.
    #[error("job graph contains a cycle: {0}")]
    JobGraphCycle(String),

    /// A descriptor pool ran out of room for a given descriptor kind.
    #[error("descriptor pool exhausted for {kind}: requested {requested}, available {available}")]
    DescriptorPoolExhausted {
        /// Descriptor kind name (e.g. "uniform_buffer").
        kind: String,
        /// Number of descriptors requested.
        requested: u32,
        /// Number of descriptors the pool was sized for.
        available: u32,
    },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Alias for `Result<T, ForgeError>`.
pub type Result<T> = std::result::Result<T, ForgeError>;
