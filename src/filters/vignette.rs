// SPDX-License-Identifier: MPL-2.0

//! Radial edge darkening

use super::FilterStage;
use crate::config::VignetteSettings;
use crate::errors::AppResult;
use crate::media::RasterSurface;

#[derive(Debug, Clone)]
pub struct Vignette {
    settings: VignetteSettings,
}

impl Vignette {
    pub fn new(settings: VignetteSettings) -> Self {
        Self { settings }
    }
}

/// Darkening alpha at pixel `(x, y)` of a `width` x `height` surface
///
/// Zero at the center, growing linearly with distance and capped at
/// `max_alpha` once the distance reaches `radius_factor * width / 2`.
pub fn vignette_alpha(x: u32, y: u32, width: u32, height: u32, settings: &VignetteSettings) -> f32 {
    let radius = settings.radius_factor * width as f32 / 2.0;
    if radius <= 0.0 {
        return settings.max_alpha;
    }
    let dx = x as f32 + 0.5 - width as f32 / 2.0;
    let dy = y as f32 + 0.5 - height as f32 / 2.0;
    let distance = (dx * dx + dy * dy).sqrt();
    settings.max_alpha * (distance / radius).min(1.0)
}

impl FilterStage for Vignette {
    fn name(&self) -> &'static str {
        "vignette"
    }

    fn apply(&mut self, surface: &mut RasterSurface) -> AppResult<()> {
        if self.settings.max_alpha <= 0.0 {
            return Ok(());
        }
        let (width, height) = surface.dimensions();
        for (x, y, pixel) in surface.enumerate_pixels_mut() {
            let keep = 1.0 - vignette_alpha(x, y, width, height, &self.settings);
            for c in 0..3 {
                pixel[c] = (f32::from(pixel[c]) * keep).round().clamp(0.0, 255.0) as u8;
            }
        }
        Ok(())
    }
}
