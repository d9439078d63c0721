//! # cas-core
//!
//! Core types for the CAS sharpen/resize pipeline.
//!
//! This crate is the foundation of the workspace and has no internal
//! dependencies. It provides:
//!
//! - [`PixelFormat`] - the interleaved pixel layouts moving through the
//!   pipeline
//! - [`Precision`] - the working precision of the GPU path
//! - [`ImageBuffer`] - a tightly packed, owned pixel buffer with
//!   conversions to and from the compute backend's f32 RGBA wire format
//!
//! ## Crate Structure
//!
//! ```text
//! cas-core (this crate)
//!    ^
//!    |
//!    +-- cas-io  (codec boundary, CPU resampling, format conversion)
//!    +-- cas-gpu (sharpen-and-resize compute pipeline)
//!    +-- cas-cli (orchestrator and command line)
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod image;

pub use error::{Error, Result};
pub use format::{PixelFormat, Precision};
pub use image::ImageBuffer;
