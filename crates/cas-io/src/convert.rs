//! Pixel-format bridging between the codec, the GPU backend, and the
//! encoder.

use cas_core::{Error as CoreError, ImageBuffer, PixelFormat, Precision};
use half::f16;
use image::{DynamicImage, RgbImage};
use rayon::prelude::*;

use crate::IoResult;

/// sRGB display encoding to linear light, one channel.
#[inline]
fn to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear light to sRGB display encoding, one channel.
#[inline]
fn to_display(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Converts a decoded image into the GPU working format for `precision`.
///
/// Standard precision keeps display-encoded 8-bit RGBA. Extended precision
/// stores linear-light half floats; the display-to-linear transfer happens
/// here, during the conversion itself, which is what ties extended
/// precision to the linear kernel pair.
pub fn to_working(src: &DynamicImage, precision: Precision) -> IoResult<ImageBuffer> {
    let (w, h) = (src.width(), src.height());
    let rgba = src.to_rgba8();
    match precision {
        Precision::Standard => {
            Ok(ImageBuffer::from_vec(w, h, PixelFormat::Rgba8, rgba.into_raw())?)
        }
        Precision::Extended => {
            let mut data = vec![0u8; w as usize * h as usize * 8];
            data.par_chunks_exact_mut(8)
                .zip(rgba.as_raw().par_chunks_exact(4))
                .for_each(|(dst, px)| {
                    for ch in 0..4 {
                        let v = px[ch] as f32 / 255.0;
                        let v = if ch < 3 { to_linear(v) } else { v };
                        dst[ch * 2..ch * 2 + 2].copy_from_slice(&f16::from_f32(v).to_le_bytes());
                    }
                });
            Ok(ImageBuffer::from_vec(w, h, PixelFormat::Rgba16f, data)?)
        }
    }
}

/// Converts a processed working buffer into the 24-bit encodable format.
///
/// Extended-precision buffers hold linear light, so the display transfer
/// is re-applied on the way out. Alpha is dropped in both cases.
pub fn to_encodable(buf: &ImageBuffer) -> IoResult<RgbImage> {
    let (w, h) = (buf.width(), buf.height());
    let mut out = vec![0u8; w as usize * h as usize * 3];
    match buf.format() {
        PixelFormat::Rgba8 => {
            out.par_chunks_exact_mut(3)
                .zip(buf.data().par_chunks_exact(4))
                .for_each(|(dst, px)| dst.copy_from_slice(&px[..3]));
        }
        PixelFormat::Rgba16f => {
            out.par_chunks_exact_mut(3)
                .zip(buf.data().par_chunks_exact(8))
                .for_each(|(dst, px)| {
                    for ch in 0..3 {
                        let v = f16::from_le_bytes([px[ch * 2], px[ch * 2 + 1]]).to_f32();
                        dst[ch] = (to_display(v.clamp(0.0, 1.0)) * 255.0).round() as u8;
                    }
                });
        }
        PixelFormat::Rgb8 => out.copy_from_slice(buf.data()),
    }
    let actual = out.len();
    RgbImage::from_raw(w, h, out).ok_or_else(|| {
        CoreError::BufferSizeMismatch {
            expected: w as usize * h as usize * 3,
            actual,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_transfer_roundtrip() {
        for v in [0.0, 0.001, 0.02, 0.25, 0.5, 1.0] {
            assert_relative_eq!(to_display(to_linear(v)), v, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_standard_working_format() {
        let src = RgbaImage::from_pixel(2, 2, Rgba([100, 150, 200, 255]));
        let buf = to_working(&DynamicImage::ImageRgba8(src), Precision::Standard).unwrap();
        assert_eq!(buf.format(), PixelFormat::Rgba8);
        assert_eq!(buf.stride(), 8);
        assert_eq!(&buf.data()[..4], &[100, 150, 200, 255]);
    }

    #[test]
    fn test_extended_working_format_is_linear() {
        let src = RgbaImage::from_pixel(1, 1, Rgba([128, 128, 128, 255]));
        let buf = to_working(&DynamicImage::ImageRgba8(src), Precision::Extended).unwrap();
        assert_eq!(buf.format(), PixelFormat::Rgba16f);
        assert_eq!(buf.stride(), 8);

        let d = buf.data();
        let r = f16::from_le_bytes([d[0], d[1]]).to_f32();
        let a = f16::from_le_bytes([d[6], d[7]]).to_f32();
        // 128/255 display-encoded is ~0.2158 in linear light.
        assert_relative_eq!(r, to_linear(128.0 / 255.0), epsilon = 1e-3);
        assert_relative_eq!(a, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_encodable_from_standard() {
        let buf = ImageBuffer::from_vec(
            1,
            2,
            PixelFormat::Rgba8,
            vec![1, 2, 3, 255, 4, 5, 6, 128],
        )
        .unwrap();
        let rgb = to_encodable(&buf).unwrap();
        assert_eq!(rgb.dimensions(), (1, 2));
        assert_eq!(rgb.get_pixel(0, 0).0, [1, 2, 3]);
        assert_eq!(rgb.get_pixel(0, 1).0, [4, 5, 6]);
    }

    #[test]
    fn test_encodable_reapplies_display_transfer() {
        let src = RgbaImage::from_pixel(1, 1, Rgba([128, 64, 32, 255]));
        let buf = to_working(&DynamicImage::ImageRgba8(src), Precision::Extended).unwrap();
        let rgb = to_encodable(&buf).unwrap();
        let px = rgb.get_pixel(0, 0).0;
        // Half-float precision allows one code value of drift.
        assert!((px[0] as i32 - 128).abs() <= 1);
        assert!((px[1] as i32 - 64).abs() <= 1);
        assert!((px[2] as i32 - 32).abs() <= 1);
    }
}
