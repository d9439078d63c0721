//! Decode/encode boundary over the `image` codec.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::debug;

use crate::{ContainerFormat, IoError, IoResult};

/// Decodes `path` into the codec's native pixel buffer.
///
/// The source format is detected from magic bytes, falling back to the
/// file extension.
pub fn decode(path: &Path) -> IoResult<DynamicImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let img = reader.decode().map_err(|source| IoError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "decoded"
    );
    Ok(img)
}

/// Encodes `img` to `path` in the given container format.
///
/// Containers whose encoders reject alpha get the image flattened to RGB
/// first; that conversion is a codec concern, not part of the pixel-format
/// converter.
pub fn encode(img: &DynamicImage, path: &Path, container: ContainerFormat) -> IoResult<()> {
    let format = container
        .encode_format()
        .ok_or(IoError::UnsupportedEncode(container.name()))?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let result = if format == ImageFormat::Jpeg && img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut writer, format)
    } else {
        img.write_to(&mut writer, format)
    };
    result.map_err(|source| IoError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn test_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let src = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        encode(&DynamicImage::ImageRgba8(src), &path, ContainerFormat::Png).unwrap();

        let back = decode(&path).unwrap();
        assert_eq!((back.width(), back.height()), (3, 2));
        assert_eq!(back.to_rgba8().get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_jpeg_flattens_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");

        let src = RgbaImage::from_pixel(8, 8, image::Rgba([200, 100, 50, 128]));
        encode(&DynamicImage::ImageRgba8(src), &path, ContainerFormat::Jpeg).unwrap();

        let back = decode(&path).unwrap();
        assert!(!back.color().has_alpha());
    }

    #[test]
    fn test_encode_unsupported_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wmp");

        let src = RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
        let err = encode(&DynamicImage::ImageRgba8(src), &path, ContainerFormat::Wmp);
        assert!(matches!(err, Err(IoError::UnsupportedEncode("WMP"))));
    }

    #[test]
    fn test_decode_missing_file() {
        let err = decode(Path::new("/nonexistent/missing.png"));
        assert!(matches!(err, Err(IoError::Io(_))));
    }
}
