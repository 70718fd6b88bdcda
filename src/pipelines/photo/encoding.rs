// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot encoding
//!
//! This module encodes the presented surface to:
//! - PNG (lossless, keeps alpha)
//! - JPEG (with quality control, alpha dropped)
//!
//! Encoding is synchronous; the capture path never touches the live buffers.

use crate::config::{PhotoOutputFormat, PhotoQuality};
use crate::errors::{AppResult, CaptureError};
use crate::media::RasterSurface;
use image::buffer::ConvertBuffer;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingFormat {
    /// PNG format (lossless compression)
    #[default]
    Png,
    /// JPEG format (lossy compression)
    Jpeg,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Png => "png",
            EncodingFormat::Jpeg => "jpg",
        }
    }
}

impl From<PhotoOutputFormat> for EncodingFormat {
    fn from(format: PhotoOutputFormat) -> Self {
        match format {
            PhotoOutputFormat::Png => EncodingFormat::Png,
            PhotoOutputFormat::Jpeg => EncodingFormat::Jpeg,
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

impl From<PhotoQuality> for EncodingQuality {
    fn from(quality: PhotoQuality) -> Self {
        match quality {
            PhotoQuality::Low => EncodingQuality::Low,
            PhotoQuality::Medium => EncodingQuality::Medium,
            PhotoQuality::High => EncodingQuality::High,
            PhotoQuality::Maximum => EncodingQuality::Maximum,
        }
    }
}

/// Photo encoder
#[derive(Debug, Clone, Default)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    /// Create a new encoder with PNG format and high quality
    pub fn new() -> Self {
        Self::default()
    }

    /// Set encoding format
    pub fn set_format(&mut self, format: EncodingFormat) {
        self.format = format;
    }

    /// Set encoding quality (only affects JPEG)
    pub fn set_quality(&mut self, quality: EncodingQuality) {
        self.quality = quality;
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    pub fn quality(&self) -> EncodingQuality {
        self.quality
    }

    /// Encode a surface in the configured format
    pub fn encode(&self, surface: &RasterSurface) -> AppResult<Vec<u8>> {
        let data = match self.format {
            EncodingFormat::Png => Self::encode_png(surface)?,
            EncodingFormat::Jpeg => Self::encode_jpeg(&rgba_to_rgb(surface), self.quality)?,
        };
        debug!(size = data.len(), format = ?self.format, "Encoding complete");
        Ok(data)
    }

    /// Encode image as JPEG
    fn encode_jpeg(image: &RgbImage, quality: EncodingQuality) -> AppResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| CaptureError::EncodingFailed(format!("JPEG encoding failed: {}", e)))?;

        Ok(buffer)
    }

    /// Encode image as PNG
    fn encode_png(surface: &RasterSurface) -> AppResult<Vec<u8>> {
        let mut buffer = Vec::new();

        surface
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| CaptureError::EncodingFailed(format!("PNG encoding failed: {}", e)))?;

        Ok(buffer)
    }
}

/// Drop the alpha channel
fn rgba_to_rgb(surface: &RasterSurface) -> RgbImage {
    surface.convert()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_format_extensions() {
        assert_eq!(EncodingFormat::Jpeg.extension(), "jpg");
        assert_eq!(EncodingFormat::Png.extension(), "png");
    }

    #[test]
    fn test_jpeg_quality_values() {
        assert_eq!(EncodingQuality::Low.jpeg_quality(), 60);
        assert_eq!(EncodingQuality::Medium.jpeg_quality(), 80);
        assert_eq!(EncodingQuality::High.jpeg_quality(), 92);
        assert_eq!(EncodingQuality::Maximum.jpeg_quality(), 98);
    }

    #[test]
    fn test_rgb_conversion_keeps_color_channels() {
        let surface = RasterSurface::from_fn(5, 3, |x, y| {
            Rgba([(x * 40) as u8, (y * 90) as u8, 200, (x * 50) as u8])
        });
        let rgb = rgba_to_rgb(&surface);
        assert_eq!(rgb.dimensions(), (5, 3));
        for (x, y, px) in rgb.enumerate_pixels() {
            let src = surface.get_pixel(x, y);
            assert_eq!(px.0, [src[0], src[1], src[2]]);
        }
    }

    #[test]
    fn test_png_keeps_alpha() {
        let surface = RasterSurface::from_pixel(3, 2, Rgba([10, 20, 30, 128]));
        let bytes = PhotoEncoder::new().encode(&surface).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded, surface);
    }

    #[test]
    fn test_jpeg_decodes() {
        let mut encoder = PhotoEncoder::new();
        encoder.set_format(EncodingFormat::Jpeg);
        let surface = RasterSurface::from_pixel(16, 8, Rgba([200, 120, 60, 255]));
        let bytes = encoder.encode(&surface).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }
}
