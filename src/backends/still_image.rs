// SPDX-License-Identifier: MPL-2.0

//! Still image frame source
//!
//! Decodes a single image file once and supplies it as every frame, which
//! is how a photo on disk is run through the live pipeline.

use super::FrameSource;
use crate::constants::file_formats;
use crate::errors::{AppResult, SourceError};
use crate::media::RasterBuffer;
use image::RgbaImage;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug)]
pub struct StillImageSource {
    name: String,
    frame: Option<RgbaImage>,
}

impl StillImageSource {
    /// Decode an image file
    ///
    /// Only extensions in [`file_formats::IMAGE_EXTENSIONS`] are accepted.
    /// Unsupported, missing or unreadable files fail with
    /// `SourceError::Unavailable`.
    pub fn open(path: &Path) -> AppResult<Self> {
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(file_formats::is_image_extension);
        if !supported {
            return Err(SourceError::Unavailable(format!(
                "Unsupported image file '{}'",
                path.display()
            ))
            .into());
        }

        info!(path = %path.display(), "Loading image file");

        let img = image::open(path).map_err(|e| {
            SourceError::Unavailable(format!("Failed to load image '{}': {}", path.display(), e))
        })?;
        let rgba = img.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(SourceError::Unavailable(format!(
                "Image '{}' has no pixels",
                path.display()
            ))
            .into());
        }

        info!(width = rgba.width(), height = rgba.height(), "Image loaded successfully");

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_image(name, rgba))
    }

    /// Wrap an already decoded frame
    pub fn from_image(name: impl Into<String>, frame: RgbaImage) -> Self {
        Self {
            name: name.into(),
            frame: Some(frame),
        }
    }
}

impl FrameSource for StillImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        self.frame.is_some()
    }

    fn current_width(&self) -> u32 {
        self.frame.as_ref().map_or(0, |f| f.width())
    }

    fn current_height(&self) -> u32 {
        self.frame.as_ref().map_or(0, |f| f.height())
    }

    fn has_ended(&self) -> bool {
        self.frame.is_none()
    }

    fn read_into(&mut self, buffer: &mut RasterBuffer) -> AppResult<()> {
        let frame = self.frame.as_ref().ok_or(SourceError::Ended)?;
        buffer.copy_from(frame);
        Ok(())
    }

    fn resume(&mut self) -> AppResult<()> {
        Ok(())
    }

    fn stop(&mut self) {
        if self.frame.take().is_some() {
            debug!(source = %self.name, "Released still image");
        }
    }
}
