//! GPU sharpen-and-resize pipeline.
//!
//! Runs the combined resize+sharpen compute kernel via wgpu compute
//! shaders. The long-lived state - device, queue, the two compiled kernel
//! variants for the selected color space, and one reusable parameter
//! buffer - is owned by [`SharpenPipeline`] and persists for a whole
//! batch; everything per-image is created fresh for a dispatch and
//! released right after readback.
//!
//! # Architecture
//!
//! ```text
//! SharpenPipeline
//!     ├── GpuContext (device + queue)
//!     ├── general / fixed-ratio compute pipelines (one color-space pair)
//!     └── reusable parameter buffer, overwritten per dispatch
//! ```

pub mod context;
pub mod pipeline;
pub mod setup;
pub mod shaders;

pub use context::GpuContext;
pub use pipeline::{KernelColorSpace, ScalingVariant, SharpenPipeline};
pub use setup::{AREA_LIMIT, derive_constants, scale_supported};
pub use shaders::{WORKGROUP_DIM, dispatch_extent};

use thiserror::Error;

/// GPU operation errors.
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to create device: {0}")]
    DeviceCreation(String),

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("GPU operation failed: {0}")]
    OperationFailed(String),

    #[error(transparent)]
    Buffer(#[from] cas_core::Error),
}

pub type GpuResult<T> = Result<T, GpuError>;
