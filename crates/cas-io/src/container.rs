//! Destination container formats inferred from file extensions.

use std::path::Path;

/// Supported on-disk container formats.
///
/// The container is always inferred from the destination file's extension,
/// case-insensitively. An extension outside this set is a configuration
/// error at the pipeline level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Windows bitmap (`.bmp`, `.dib`).
    Bmp,
    /// PNG (`.png`).
    Png,
    /// Windows icon (`.ico`).
    Ico,
    /// JPEG (`.jpg`, `.jpeg`, `.jpe`).
    Jpeg,
    /// TIFF (`.tif`, `.tiff`).
    Tiff,
    /// GIF (`.gif`).
    Gif,
    /// DirectDraw surface (`.dds`).
    Dds,
    /// JPEG XR / Windows Media Photo (`.wmp`).
    Wmp,
}

impl ContainerFormat {
    /// Infers the container from the file extension, case-insensitively.
    ///
    /// Returns `None` for an unknown or missing extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "bmp" | "dib" => Some(Self::Bmp),
            "png" => Some(Self::Png),
            "ico" => Some(Self::Ico),
            "jpg" | "jpeg" | "jpe" => Some(Self::Jpeg),
            "tif" | "tiff" => Some(Self::Tiff),
            "gif" => Some(Self::Gif),
            "dds" => Some(Self::Dds),
            "wmp" => Some(Self::Wmp),
            _ => None,
        }
    }

    /// Human-readable name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bmp => "BMP",
            Self::Png => "PNG",
            Self::Ico => "ICO",
            Self::Jpeg => "JPEG",
            Self::Tiff => "TIFF",
            Self::Gif => "GIF",
            Self::Dds => "DDS",
            Self::Wmp => "WMP",
        }
    }

    /// The codec's format tag, when the codec can encode this container.
    ///
    /// The codec decodes DDS but has no DDS or JPEG XR encoders.
    pub(crate) fn encode_format(&self) -> Option<image::ImageFormat> {
        match self {
            Self::Bmp => Some(image::ImageFormat::Bmp),
            Self::Png => Some(image::ImageFormat::Png),
            Self::Ico => Some(image::ImageFormat::Ico),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Tiff => Some(image::ImageFormat::Tiff),
            Self::Gif => Some(image::ImageFormat::Gif),
            Self::Dds | Self::Wmp => None,
        }
    }
}
