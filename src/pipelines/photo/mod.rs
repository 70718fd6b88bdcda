// SPDX-License-Identifier: MPL-2.0

//! Snapshot export
//!
//! ```text
//! Presented surface → Encoding → CapturedImage → (storage / download)
//!        ↓
//! Live pipeline continues untouched
//! ```
//!
//! Capture reads the presented surface at the instant of the call and never
//! writes to it. The resulting [`CapturedImage`] is immutable and owned by
//! whoever receives it.

pub mod encoding;

pub use encoding::{EncodingFormat, EncodingQuality, PhotoEncoder};

use crate::config::ExportSettings;
use crate::constants::export::FILENAME_PREFIX;
use crate::errors::{AppResult, CaptureError};
use crate::media::RasterSurface;
use chrono::{NaiveDate, Utc};
use tracing::info;

/// Encoded snapshot plus its suggested name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    bytes: Vec<u8>,
    suggested_filename: String,
    format: EncodingFormat,
    width: u32,
    height: u32,
}

impl CapturedImage {
    /// Encoded image bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// `ghibli-moment-YYYY-MM-DD`, without extension
    pub fn suggested_filename(&self) -> &str {
        &self.suggested_filename
    }

    /// Suggested filename with the format's extension
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.suggested_filename, self.format.extension())
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Filename stem for a snapshot taken on `date`
pub fn suggested_filename(date: NaiveDate) -> String {
    format!("{}-{}", FILENAME_PREFIX, date.format("%Y-%m-%d"))
}

/// Encodes the presented surface on demand
#[derive(Debug, Clone, Default)]
pub struct CaptureExporter {
    encoder: PhotoEncoder,
}

impl CaptureExporter {
    /// PNG exporter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &ExportSettings) -> Self {
        let mut encoder = PhotoEncoder::new();
        encoder.set_format(settings.format.into());
        encoder.set_quality(settings.quality.into());
        Self { encoder }
    }

    pub fn encoder(&self) -> &PhotoEncoder {
        &self.encoder
    }

    /// Snapshot the presented surface, named after today's UTC date
    ///
    /// Fails with `CaptureError::Unavailable` when nothing has been presented.
    pub fn capture_current_frame(&self, presented: Option<&RasterSurface>) -> AppResult<CapturedImage> {
        let surface = presented.ok_or(CaptureError::Unavailable)?;
        self.capture_at(surface, Utc::now().date_naive())
    }

    /// Snapshot a surface with an explicit date for the filename
    pub fn capture_at(&self, surface: &RasterSurface, date: NaiveDate) -> AppResult<CapturedImage> {
        let (width, height) = surface.dimensions();
        info!(width, height, format = ?self.encoder.format(), "Capturing snapshot");

        let bytes = self.encoder.encode(surface)?;
        Ok(CapturedImage {
            bytes,
            suggested_filename: suggested_filename(date),
            format: self.encoder.format(),
            width,
            height,
        })
    }
}
