//! CPU resampling via `fast_image_resize`.
//!
//! Pure resize with no sharpening. This path never touches the GPU.

use fast_image_resize as fir;
use fir::images::Image as FirImage;
use image::{DynamicImage, RgbaImage};

use crate::{IoError, IoResult};

/// Interpolation policies for the CPU resample path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleFilter {
    /// Nearest-neighbor (fast, blocky).
    NearestNeighbor,
    /// Bilinear interpolation.
    Linear,
    /// Catmull-Rom cubic.
    Cubic,
    /// Mitchell-Netravali cubic (less ringing on downscale).
    HighQualityCubic,
    /// Box/area averaging, the original tool's "Fant" mode.
    AreaAverage,
}

impl ResampleFilter {
    /// The resampler algorithm backing this policy.
    pub(crate) fn resize_alg(self) -> fir::ResizeAlg {
        use fir::{FilterType, ResizeAlg};
        match self {
            Self::NearestNeighbor => ResizeAlg::Nearest,
            Self::Linear => ResizeAlg::Convolution(FilterType::Bilinear),
            Self::Cubic => ResizeAlg::Convolution(FilterType::CatmullRom),
            Self::HighQualityCubic => ResizeAlg::Convolution(FilterType::Mitchell),
            Self::AreaAverage => ResizeAlg::Convolution(FilterType::Box),
        }
    }
}

/// Resizes `src` to `dst_w` x `dst_h` with the given filter.
///
/// The resampler operates on the decoded pixels directly; the output is
/// handed to the encoder without any precision conversion.
pub fn resample(
    src: &DynamicImage,
    dst_w: u32,
    dst_h: u32,
    filter: ResampleFilter,
) -> IoResult<DynamicImage> {
    let (src_w, src_h) = (src.width(), src.height());
    let rgba = src.to_rgba8();

    let src_image = FirImage::from_vec_u8(src_w, src_h, rgba.into_raw(), fir::PixelType::U8x4)
        .map_err(|e| IoError::Resample(e.to_string()))?;
    let mut dst_image = FirImage::new(dst_w, dst_h, fir::PixelType::U8x4);

    let options = fir::ResizeOptions::new().resize_alg(filter.resize_alg());
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| IoError::Resample(e.to_string()))?;

    let out = RgbaImage::from_raw(dst_w, dst_h, dst_image.into_vec())
        .ok_or_else(|| IoError::Resample("resized buffer has unexpected size".into()))?;
    Ok(DynamicImage::ImageRgba8(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fast_image_resize::{FilterType, ResizeAlg};
    use image::Rgba;

    #[test]
    fn test_filter_mapping() {
        assert!(matches!(
            ResampleFilter::NearestNeighbor.resize_alg(),
            ResizeAlg::Nearest
        ));
        assert!(matches!(
            ResampleFilter::Linear.resize_alg(),
            ResizeAlg::Convolution(FilterType::Bilinear)
        ));
        assert!(matches!(
            ResampleFilter::Cubic.resize_alg(),
            ResizeAlg::Convolution(FilterType::CatmullRom)
        ));
        assert!(matches!(
            ResampleFilter::HighQualityCubic.resize_alg(),
            ResizeAlg::Convolution(FilterType::Mitchell)
        ));
        assert!(matches!(
            ResampleFilter::AreaAverage.resize_alg(),
            ResizeAlg::Convolution(FilterType::Box)
        ));
    }

    #[test]
    fn test_downscale_preserves_solid_color() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([120, 60, 30, 255]));
        let out = resample(
            &DynamicImage::ImageRgba8(src),
            2,
            2,
            ResampleFilter::AreaAverage,
        )
        .unwrap();
        assert_eq!((out.width(), out.height()), (2, 2));
        assert_eq!(out.to_rgba8().get_pixel(1, 1).0, [120, 60, 30, 255]);
    }

    #[test]
    fn test_nearest_upscale_dimensions() {
        let src = RgbaImage::from_pixel(3, 5, Rgba([1, 2, 3, 255]));
        let out = resample(
            &DynamicImage::ImageRgba8(src),
            9,
            10,
            ResampleFilter::NearestNeighbor,
        )
        .unwrap();
        assert_eq!((out.width(), out.height()), (9, 10));
    }
}
