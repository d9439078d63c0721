//! Error types for I/O operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Decoding failure from the codec.
    #[error("failed to decode {path}: {source}")]
    Decode {
        /// Source file.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: image::ImageError,
    },

    /// Encoding failure from the codec.
    #[error("failed to encode {path}: {source}")]
    Encode {
        /// Destination file.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: image::ImageError,
    },

    /// The codec has no encoder for the requested container.
    #[error("no encoder available for {0} output")]
    UnsupportedEncode(&'static str),

    /// Resampler failure.
    #[error("resample error: {0}")]
    Resample(String),

    /// Invalid pixel buffer.
    #[error(transparent)]
    Buffer(#[from] cas_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
