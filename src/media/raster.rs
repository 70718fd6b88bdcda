// SPDX-License-Identifier: GPL-3.0-only

//! Owned RGBA raster buffer
//!
//! The buffer is the unit of work for every filter stage. Its backing
//! storage is an [`RgbaImage`], so the `width * height * 4` length invariant
//! holds for the buffer's whole lifetime.

use crate::errors::{AppResult, RasterError};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::ops::Deref;

/// Raster surface consumed and produced by filter stages
pub type RasterSurface = RgbaImage;

/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Owned RGBA pixel buffer sized to the frame dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    image: RgbaImage,
}

impl RasterBuffer {
    /// Allocate a zeroed buffer
    ///
    /// Fails with `InvalidDimension` if either side is zero.
    pub fn allocate(width: u32, height: u32) -> AppResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimension { width, height }.into());
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    /// Wrap an existing image
    pub fn from_image(image: RgbaImage) -> AppResult<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RasterError::InvalidDimension {
                width: image.width(),
                height: image.height(),
            }
            .into());
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Expected byte length for the current dimensions
    pub fn byte_len(&self) -> usize {
        self.width() as usize * self.height() as usize * BYTES_PER_PIXEL
    }

    /// Blit a frame into the buffer
    ///
    /// Frames with the buffer's dimensions are copied byte for byte. Frames
    /// of any other size are resampled to fit.
    pub fn copy_from<C>(&mut self, frame: &ImageBuffer<Rgba<u8>, C>)
    where
        C: Deref<Target = [u8]>,
    {
        if frame.dimensions() == self.image.dimensions() {
            let len = self.byte_len();
            self.image.copy_from_slice(&frame.as_raw()[..len]);
            return;
        }

        let resized = imageops::resize(frame, self.width(), self.height(), FilterType::Triangle);
        self.image.copy_from_slice(resized.as_raw());
    }

    /// Blit raw RGBA bytes of the given dimensions into the buffer
    pub fn copy_from_raw(&mut self, width: u32, height: u32, data: &[u8]) -> AppResult<()> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimension { width, height }.into());
        }
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        let mismatch = RasterError::SizeMismatch {
            expected,
            actual: data.len(),
        };
        if data.len() != expected {
            return Err(mismatch.into());
        }
        let frame = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(width, height, data).ok_or(mismatch)?;
        self.copy_from(&frame);
        Ok(())
    }

    /// Expose the buffer for stage consumption
    pub fn as_surface(&self) -> &RasterSurface {
        &self.image
    }

    pub fn as_surface_mut(&mut self) -> &mut RasterSurface {
        &mut self.image
    }
}
