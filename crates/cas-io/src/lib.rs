//! # cas-io
//!
//! Image I/O for the CAS sharpen/resize pipeline.
//!
//! This crate owns everything on the codec side of the pipeline:
//!
//! - [`ContainerFormat`] - destination container inference from file
//!   extensions
//! - [`decode`] / [`encode`] - the boundary over the `image` codec
//! - [`resample`] - the CPU resize path via `fast_image_resize`
//! - [`convert`] - pixel-format bridging between the decoded source, the
//!   GPU working formats, and the encodable output

pub mod codec;
pub mod container;
pub mod convert;
mod error;
pub mod resample;

pub use codec::{decode, encode};
pub use container::ContainerFormat;
pub use error::{IoError, IoResult};
pub use resample::{ResampleFilter, resample};
