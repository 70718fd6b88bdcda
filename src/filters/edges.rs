// SPDX-License-Identifier: MPL-2.0

//! Sobel edge extraction
//!
//! Edges are detected on the mean RGB intensity and inked onto the working
//! surface with a multiply-by-black composite. The 1-pixel border is never
//! classified as an edge.

use super::FilterStage;
use super::blend::{alpha_u8, darken};
use crate::config::EdgeSettings;
use crate::errors::AppResult;
use crate::media::RasterSurface;

#[derive(Debug, Clone)]
pub struct EdgeExtract {
    settings: EdgeSettings,
}

impl EdgeExtract {
    pub fn new(settings: EdgeSettings) -> Self {
        Self { settings }
    }

    /// Classify every pixel, row-major; `true` marks an edge
    pub fn edge_mask(&self, surface: &RasterSurface) -> Vec<bool> {
        let width = surface.width() as usize;
        let height = surface.height() as usize;
        let mut mask = vec![false; width * height];
        if width < 3 || height < 3 {
            return mask;
        }

        // Sum of R+G+B (3x the mean) keeps the scan in integers; the
        // threshold is scaled to match.
        let intensity: Vec<i32> = surface
            .pixels()
            .map(|p| i32::from(p[0]) + i32::from(p[1]) + i32::from(p[2]))
            .collect();

        let threshold = f64::from(self.settings.threshold) * 3.0;
        let threshold_sq = threshold * threshold;

        // Neighbor lookups clamp to the nearest valid pixel
        let sample = |x: isize, y: isize| -> i32 {
            let x = x.clamp(0, width as isize - 1) as usize;
            let y = y.clamp(0, height as isize - 1) as usize;
            intensity[y * width + x]
        };

        for py in 1..height - 1 {
            for px in 1..width - 1 {
                let x = px as isize;
                let y = py as isize;

                let tl = sample(x - 1, y - 1);
                let tm = sample(x, y - 1);
                let tr = sample(x + 1, y - 1);
                let ml = sample(x - 1, y);
                let mr = sample(x + 1, y);
                let bl = sample(x - 1, y + 1);
                let bm = sample(x, y + 1);
                let br = sample(x + 1, y + 1);

                let gx = (tl + 2 * ml + bl) - (tr + 2 * mr + br);
                let gy = (tl + 2 * tm + tr) - (bl + 2 * bm + br);
                let magnitude_sq = f64::from(gx * gx + gy * gy);

                mask[py * width + px] = magnitude_sq > threshold_sq;
            }
        }

        mask
    }
}

impl FilterStage for EdgeExtract {
    fn name(&self) -> &'static str {
        "edge_extract"
    }

    fn apply(&mut self, surface: &mut RasterSurface) -> AppResult<()> {
        let mask = self.edge_mask(surface);
        let ink = alpha_u8(self.settings.opacity);
        if ink == 0 {
            return Ok(());
        }

        for (pixel, is_edge) in surface.pixels_mut().zip(mask) {
            if is_edge {
                pixel[0] = darken(pixel[0], ink);
                pixel[1] = darken(pixel[1], ink);
                pixel[2] = darken(pixel[2], ink);
            }
        }
        Ok(())
    }
}
