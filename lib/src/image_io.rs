//! Image I/O using the `image` crate
//!
//! Decodes common raster formats into interleaved 8-bit `Raster`s and encodes
//! them back. Gray, gray+alpha, RGB and RGBA inputs of any bit depth are
//! reduced to 8 bits; gray+alpha is widened to RGBA so it stays supported.

use std::io::Cursor;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use ::image::{ColorType, DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};

use crate::error::FilterError;
use crate::plane::Raster;
use crate::Result;

/// Raster metadata information
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    /// Colour type reported by the decoder
    pub source_color: String,
}

impl ImageInfo {
    pub fn new(raster: &Raster, source_color: ColorType) -> Self {
        Self {
            width: raster.cols(),
            height: raster.rows(),
            channels: raster.channels(),
            source_color: format!("{:?}", source_color),
        }
    }
}

/// Convert a decoded image into a raster
pub fn from_dynamic(image: DynamicImage) -> Raster {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let (channels, data) = match image.color() {
        ColorType::L8 | ColorType::L16 => (1, image.into_luma8().into_raw()),
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => (3, image.into_rgb8().into_raw()),
        _ if image.color().has_alpha() => (4, image.into_rgba8().into_raw()),
        _ => (3, image.into_rgb8().into_raw()),
    };
    Raster::from_parts(height, width, channels, data)
}

/// Convert a raster into an `image` crate buffer
pub fn to_dynamic(raster: &Raster) -> Result<DynamicImage> {
    let width = raster.cols() as u32;
    let height = raster.rows() as u32;
    let data = raster.as_slice().to_vec();
    let buffer_error =
        || FilterError::InvalidShape(format!("cannot wrap {}x{} raster", width, height));

    match raster.channels() {
        1 => GrayImage::from_raw(width, height, data)
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(buffer_error),
        3 => RgbImage::from_raw(width, height, data)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(buffer_error),
        4 => RgbaImage::from_raw(width, height, data)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(buffer_error),
        n => Err(FilterError::UnsupportedChannelCount(n)),
    }
}

/// Decode an image from an in-memory buffer
pub fn load_bytes(data: &[u8]) -> Result<(ImageInfo, Raster)> {
    let decoded = ::image::load_from_memory(data)
        .map_err(|e| FilterError::ImageNotReadable(e.to_string()))?;
    let color = decoded.color();
    let raster = from_dynamic(decoded);
    Ok((ImageInfo::new(&raster, color), raster))
}

/// Read an image file from a filesystem path
#[cfg(not(target_arch = "wasm32"))]
pub fn load<P: AsRef<Path>>(path: P) -> Result<(ImageInfo, Raster)> {
    let path = path.as_ref();
    let decoded = ::image::open(path)
        .map_err(|e| FilterError::ImageNotReadable(format!("{}: {}", path.display(), e)))?;

    let color = decoded.color();
    let raster = from_dynamic(decoded);
    log::info!(
        "Loaded image {}: {}x{}, {} channels",
        path.display(),
        raster.cols(),
        raster.rows(),
        raster.channels()
    );
    Ok((ImageInfo::new(&raster, color), raster))
}

/// Write a raster to disk, format chosen from the file extension
#[cfg(not(target_arch = "wasm32"))]
pub fn save<P: AsRef<Path>>(raster: &Raster, path: P) -> Result<()> {
    let path = path.as_ref();
    to_dynamic(raster)?
        .save(path)
        .map_err(|e| FilterError::ImageNotWritable(format!("{}: {}", path.display(), e)))?;
    log::info!("Saved image {}", path.display());
    Ok(())
}

/// Encode a raster as PNG bytes
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    to_dynamic(raster)?
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| FilterError::ImageNotWritable(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_roundtrip_rgb() {
        let data = (0..4 * 3 * 3).map(|i| (i * 7) as u8).collect();
        let raster = Raster::new(4, 3, 3, data).unwrap();

        let bytes = encode_png(&raster).unwrap();
        let (info, decoded) = load_bytes(&bytes).unwrap();

        assert_eq!(decoded, raster);
        assert_eq!(info.width, 3);
        assert_eq!(info.height, 4);
        assert_eq!(info.channels, 3);
    }

    #[test]
    fn test_gray_alpha_widens_to_rgba() {
        let buffer = ::image::GrayAlphaImage::from_raw(1, 1, vec![9, 200]).unwrap();
        let image = DynamicImage::ImageLumaA8(buffer);
        let raster = from_dynamic(image);

        assert_eq!(raster.channels(), 4);
        assert_eq!(raster.as_slice(), &[9, 9, 9, 200]);
    }

    #[test]
    fn test_unreadable_bytes() {
        assert!(matches!(
            load_bytes(b"definitely not an image"),
            Err(FilterError::ImageNotReadable(_))
        ));
    }

    #[test]
    fn test_unreadable_path() {
        assert!(matches!(
            load("/nonexistent/path/to/image.png"),
            Err(FilterError::ImageNotReadable(_))
        ));
    }

    #[test]
    fn test_unsupported_channels_cannot_encode() {
        let raster = Raster::filled(2, 2, 2, 0);
        assert_eq!(
            encode_png(&raster).unwrap_err(),
            FilterError::UnsupportedChannelCount(2)
        );
    }
}
