//! Per-file processing pipeline: decode, dispatch to the GPU or CPU path,
//! and encode.

use std::path::PathBuf;

use clap::ValueEnum;
use image::DynamicImage;
use tracing::info;

use cas_core::Precision;
use cas_gpu::{GpuError, KernelColorSpace, SharpenPipeline};
use cas_io::{ContainerFormat, IoError, ResampleFilter};

/// Top-level failure taxonomy. Every variant aborts the batch; the sole
/// non-fatal condition (scale ratio above the supported limit) is a
/// warning inside the GPU pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid request: bad file pairing or unsupported destination.
    #[error("configuration error: {0}")]
    Config(String),

    /// Codec or resampler failure.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Compute backend failure.
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

/// Interpolation modes selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// GPU sharpen-and-resize kernel.
    Cas,
    /// Nearest-neighbor resampling.
    NearestNeighbor,
    /// Bilinear resampling.
    Linear,
    /// Catmull-Rom cubic resampling.
    Cubic,
    /// Mitchell cubic resampling.
    HighQualityCubic,
    /// Box/area-average resampling, historically called Fant.
    #[value(name = "fant", alias = "area-average")]
    AreaAverage,
}

impl Mode {
    /// The CPU resample filter for this mode; `None` for the GPU path.
    pub fn resample_filter(self) -> Option<ResampleFilter> {
        match self {
            Self::Cas => None,
            Self::NearestNeighbor => Some(ResampleFilter::NearestNeighbor),
            Self::Linear => Some(ResampleFilter::Linear),
            Self::Cubic => Some(ResampleFilter::Cubic),
            Self::HighQualityCubic => Some(ResampleFilter::HighQualityCubic),
            Self::AreaAverage => Some(ResampleFilter::AreaAverage),
        }
    }

    /// Whether this mode runs on the GPU.
    pub fn needs_gpu(self) -> bool {
        self.resample_filter().is_none()
    }
}

/// One file to process.
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    /// Source image path.
    pub src: PathBuf,
    /// Destination image path; its extension picks the container.
    pub dst: PathBuf,
    /// Execution path and filter.
    pub mode: Mode,
    /// Destination size; `None` keeps the source size.
    pub dst_size: Option<(u32, u32)>,
    /// Unvalidated; the kernel parameter derivation saturates internally.
    pub sharpness: f32,
    /// Working precision of the GPU path.
    pub precision: Precision,
    /// Treat pixel data as linear rather than display-encoded.
    pub linear: bool,
}

/// Splits trailing positionals into (source, destination) pairs.
pub fn pair_files(files: &[PathBuf]) -> Result<Vec<(PathBuf, PathBuf)>, Error> {
    if files.len() % 2 != 0 {
        return Err(Error::Config(format!(
            "file arguments must come in <SRC> <DST> pairs, got {} paths",
            files.len()
        )));
    }
    Ok(files
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect())
}

/// Sequential batch processor.
///
/// The GPU pipeline is built once, at the first request that needs it, and
/// reused for the rest of the batch. CPU-only batches never touch the GPU.
#[derive(Default)]
pub struct Processor {
    sharpen: Option<SharpenPipeline>,
}

impl Processor {
    /// Creates a processor with no GPU state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes requests in order; the first failure aborts the batch.
    pub fn process(&mut self, requests: &[ProcessingRequest]) -> Result<(), Error> {
        for request in requests {
            self.process_one(request)?;
        }
        Ok(())
    }

    fn process_one(&mut self, request: &ProcessingRequest) -> Result<(), Error> {
        info!("loading {}", request.src.display());
        let decoded = cas_io::decode(&request.src)?;

        let (src_w, src_h) = (decoded.width(), decoded.height());
        let (dst_w, dst_h) = request.dst_size.unwrap_or((src_w, src_h));

        let container = ContainerFormat::from_path(&request.dst).ok_or_else(|| {
            Error::Config(format!(
                "unsupported destination extension: {}",
                request.dst.display()
            ))
        })?;

        let result = if let Some(filter) = request.mode.resample_filter() {
            cas_io::resample(&decoded, dst_w, dst_h, filter)?
        } else {
            let pipeline = self.sharpen_pipeline(request.precision, request.linear)?;
            let working = cas_io::convert::to_working(&decoded, request.precision)?;
            let sharpened = pipeline.sharpen(&working, dst_w, dst_h, request.sharpness)?;
            DynamicImage::ImageRgb8(cas_io::convert::to_encodable(&sharpened)?)
        };

        info!("saving {}", request.dst.display());
        cas_io::encode(&result, &request.dst, container)?;
        Ok(())
    }

    /// Returns the batch-wide GPU pipeline, creating it on first use.
    ///
    /// The color-space pair is fixed by the request that triggers
    /// creation; flags are process-wide, so later requests match.
    fn sharpen_pipeline(
        &mut self,
        precision: Precision,
        linear: bool,
    ) -> Result<&SharpenPipeline, GpuError> {
        if self.sharpen.is_none() {
            let color = KernelColorSpace::select(precision, linear);
            self.sharpen = Some(SharpenPipeline::new(color)?);
        }
        self.sharpen
            .as_ref()
            .ok_or_else(|| GpuError::OperationFailed("sharpen pipeline not initialized".into()))
    }

    #[cfg(test)]
    fn gpu_initialized(&self) -> bool {
        self.sharpen.is_some()
    }
}
