// SPDX-License-Identifier: GPL-3.0-only

//! Pixel storage shared by sources, filters and exporters

pub mod raster;

pub use raster::{BYTES_PER_PIXEL, RasterBuffer, RasterSurface};
