//! Owned image buffers and f32 RGBA bridging for the compute backend.

use half::f16;
use rayon::prelude::*;

use crate::{Error, PixelFormat, Result};

/// Owned, tightly packed pixel buffer.
///
/// Memory is row-major, top-to-bottom, with interleaved channels. The
/// stride is always `width * bytes_per_pixel`; no row padding is ever
/// introduced or assumed.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Creates a zero-filled buffer.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let size = Self::byte_size(width, height, format)?;
        Ok(Self {
            width,
            height,
            format,
            data: vec![0; size],
        })
    }

    /// Wraps existing pixel data, validating its size against the layout.
    pub fn from_vec(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let expected = Self::byte_size(width, height, format)?;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    fn byte_size(width: u32, height: u32, format: PixelFormat) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(width, height, "zero dimension"));
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .ok_or_else(|| Error::invalid_dimensions(width, height, "byte size overflow"))
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout of the data.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Row stride in bytes. Always `width * bytes_per_pixel`.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Raw pixel bytes, `stride * height` long.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer, returning the pixel bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Expands the buffer into the backend's f32 RGBA wire format.
    ///
    /// Integer samples are normalized to [0, 1]; half floats are widened
    /// as-is. RGB input gets an opaque alpha channel.
    pub fn to_f32_rgba(&self) -> Vec<f32> {
        let pixels = self.width as usize * self.height as usize;
        match self.format {
            PixelFormat::Rgba8 => self.data.par_iter().map(|&b| b as f32 / 255.0).collect(),
            PixelFormat::Rgba16f => self
                .data
                .par_chunks_exact(2)
                .map(|b| f16::from_le_bytes([b[0], b[1]]).to_f32())
                .collect(),
            PixelFormat::Rgb8 => {
                let mut out = vec![0.0f32; pixels * 4];
                out.par_chunks_exact_mut(4)
                    .zip(self.data.par_chunks_exact(3))
                    .for_each(|(dst, src)| {
                        dst[0] = src[0] as f32 / 255.0;
                        dst[1] = src[1] as f32 / 255.0;
                        dst[2] = src[2] as f32 / 255.0;
                        dst[3] = 1.0;
                    });
                out
            }
        }
    }

    /// Rebuilds a buffer in `format` from f32 RGBA samples.
    ///
    /// Integer targets are clamped and rounded; RGB targets drop alpha.
    pub fn from_f32_rgba(
        samples: &[f32],
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self> {
        let pixels = width as usize * height as usize;
        if samples.len() != pixels * 4 {
            return Err(Error::BufferSizeMismatch {
                expected: pixels * 4,
                actual: samples.len(),
            });
        }
        let size = Self::byte_size(width, height, format)?;
        let mut data = vec![0u8; size];
        match format {
            PixelFormat::Rgba8 => {
                data.par_iter_mut().zip(samples.par_iter()).for_each(|(b, &v)| {
                    *b = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                });
            }
            PixelFormat::Rgba16f => {
                data.par_chunks_exact_mut(2)
                    .zip(samples.par_iter())
                    .for_each(|(b, &v)| {
                        b.copy_from_slice(&f16::from_f32(v).to_le_bytes());
                    });
            }
            PixelFormat::Rgb8 => {
                data.par_chunks_exact_mut(3)
                    .zip(samples.par_chunks_exact(4))
                    .for_each(|(dst, src)| {
                        dst[0] = (src[0].clamp(0.0, 1.0) * 255.0).round() as u8;
                        dst[1] = (src[1].clamp(0.0, 1.0) * 255.0).round() as u8;
                        dst[2] = (src[2].clamp(0.0, 1.0) * 255.0).round() as u8;
                    });
            }
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stride_is_width_times_bpp() {
        let img = ImageBuffer::new(10, 5, PixelFormat::Rgba8).unwrap();
        assert_eq!(img.stride(), 40);
        assert_eq!(img.data().len(), 200);

        let img = ImageBuffer::new(10, 5, PixelFormat::Rgba16f).unwrap();
        assert_eq!(img.stride(), 80);

        let img = ImageBuffer::new(10, 5, PixelFormat::Rgb8).unwrap();
        assert_eq!(img.stride(), 30);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(ImageBuffer::new(0, 5, PixelFormat::Rgba8).is_err());
        assert!(ImageBuffer::new(5, 0, PixelFormat::Rgba8).is_err());
    }

    #[test]
    fn test_from_vec_validates_size() {
        let ok = ImageBuffer::from_vec(2, 2, PixelFormat::Rgba8, vec![0; 16]);
        assert!(ok.is_ok());

        let err = ImageBuffer::from_vec(2, 2, PixelFormat::Rgba8, vec![0; 15]);
        assert!(matches!(
            err,
            Err(Error::BufferSizeMismatch {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn test_rgba8_f32_roundtrip() {
        let data = vec![0u8, 128, 255, 64, 32, 16, 8, 250];
        let img = ImageBuffer::from_vec(2, 1, PixelFormat::Rgba8, data.clone()).unwrap();
        let f = img.to_f32_rgba();
        assert_eq!(f.len(), 8);
        assert_relative_eq!(f[1], 128.0 / 255.0);
        assert_relative_eq!(f[2], 1.0);

        let back = ImageBuffer::from_f32_rgba(&f, 2, 1, PixelFormat::Rgba8).unwrap();
        assert_eq!(back.data(), data.as_slice());
    }

    #[test]
    fn test_rgba16f_f32_roundtrip() {
        let half = f16::from_f32(0.25).to_le_bytes();
        let mut data = Vec::new();
        for _ in 0..4 {
            data.extend_from_slice(&half);
        }
        let img = ImageBuffer::from_vec(1, 1, PixelFormat::Rgba16f, data.clone()).unwrap();
        let f = img.to_f32_rgba();
        assert_relative_eq!(f[0], 0.25);

        let back = ImageBuffer::from_f32_rgba(&f, 1, 1, PixelFormat::Rgba16f).unwrap();
        assert_eq!(back.data(), data.as_slice());
    }

    #[test]
    fn test_rgb8_gains_opaque_alpha() {
        let img = ImageBuffer::from_vec(1, 1, PixelFormat::Rgb8, vec![10, 20, 30]).unwrap();
        let f = img.to_f32_rgba();
        assert_eq!(f.len(), 4);
        assert_relative_eq!(f[3], 1.0);
    }

    #[test]
    fn test_from_f32_drops_alpha_for_rgb() {
        let samples = [1.0, 0.5, 0.0, 0.25];
        let img = ImageBuffer::from_f32_rgba(&samples, 1, 1, PixelFormat::Rgb8).unwrap();
        assert_eq!(img.data(), &[255, 128, 0]);
    }

    #[test]
    fn test_from_f32_validates_sample_count() {
        let err = ImageBuffer::from_f32_rgba(&[0.0; 7], 1, 2, PixelFormat::Rgba8);
        assert!(err.is_err());
    }
}
