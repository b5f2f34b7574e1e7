//! Image decoding capability
//!
//! The pipeline never decodes files itself. Callers hand it an
//! [`ImageDecoder`]; builds without the `image-decode` feature get
//! [`UnavailableDecoder`], which fails every request with
//! `DecoderUnavailable` instead of silently doing nothing.

use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::raster::RasterImage;

/// Vector and CAD extensions that are rejected up front
pub const UNSUPPORTED_EXTENSIONS: &[&str] = &["pdf", "dwg", "dxf", "svg", "eps", "ai"];

/// Something that can turn a file into a [`RasterImage`]
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<RasterImage>;
}

impl<D: ImageDecoder + ?Sized> ImageDecoder for &D {
    fn decode(&self, path: &Path) -> Result<RasterImage> {
        (**self).decode(path)
    }
}

impl<D: ImageDecoder + ?Sized> ImageDecoder for Box<D> {
    fn decode(&self, path: &Path) -> Result<RasterImage> {
        (**self).decode(path)
    }
}

/// Reject vector/CAD inputs by extension
pub fn check_format(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    if UNSUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ConvertError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: ext,
        });
    }
    Ok(())
}

/// Decoder used when no decoding backend is compiled in
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableDecoder;

impl ImageDecoder for UnavailableDecoder {
    fn decode(&self, _path: &Path) -> Result<RasterImage> {
        Err(ConvertError::DecoderUnavailable)
    }
}

/// PNG/JPEG decoder backed by the `image` crate
#[cfg(feature = "image-decode")]
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterDecoder;

#[cfg(feature = "image-decode")]
impl ImageDecoder for RasterDecoder {
    fn decode(&self, path: &Path) -> Result<RasterImage> {
        check_format(path)?;

        let decode_err = |reason: String| ConvertError::Decode {
            path: path.to_path_buf(),
            reason,
        };

        let img = image::ImageReader::open(path)
            .map_err(|e| decode_err(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| decode_err(e.to_string()))?
            .decode()
            .map_err(|e| decode_err(e.to_string()))?;

        let raster = from_dynamic(img)?;
        tracing::debug!(
            "Decoded {:?}: {}x{}, {} channel(s)",
            path,
            raster.width(),
            raster.height(),
            raster.channels()
        );
        Ok(raster)
    }
}

/// Keep 8/16-bit gray, RGB and RGBA as-is; everything else becomes RGBA8
#[cfg(feature = "image-decode")]
pub fn from_dynamic(img: image::DynamicImage) -> Result<RasterImage> {
    use image::DynamicImage;

    let (width, height) = (img.width(), img.height());
    match img {
        DynamicImage::ImageLuma8(buf) => RasterImage::from_u8(width, height, 1, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => RasterImage::from_u8(width, height, 3, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => RasterImage::from_u8(width, height, 4, buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => RasterImage::from_u16(width, height, 1, buf.into_raw()),
        DynamicImage::ImageRgb16(buf) => RasterImage::from_u16(width, height, 3, buf.into_raw()),
        DynamicImage::ImageRgba16(buf) => RasterImage::from_u16(width, height, 4, buf.into_raw()),
        other => RasterImage::from_u8(width, height, 4, other.to_rgba8().into_raw()),
    }
}

/// The best decoder this build provides
pub fn default_decoder() -> Box<dyn ImageDecoder + Send + Sync> {
    #[cfg(feature = "image-decode")]
    {
        Box::new(RasterDecoder)
    }
    #[cfg(not(feature = "image-decode"))]
    {
        Box::new(UnavailableDecoder)
    }
}
