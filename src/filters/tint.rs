// SPDX-License-Identifier: MPL-2.0

//! Warm soft-light wash over the whole surface

use super::FilterStage;
use super::blend::{alpha_u8, light_mix, mix};
use crate::config::TintSettings;
use crate::errors::AppResult;
use crate::media::RasterSurface;

#[derive(Debug, Clone)]
pub struct SoftOverlayTint {
    settings: TintSettings,
}

impl SoftOverlayTint {
    pub fn new(settings: TintSettings) -> Self {
        Self { settings }
    }
}

impl FilterStage for SoftOverlayTint {
    fn name(&self) -> &'static str {
        "soft_overlay_tint"
    }

    fn apply(&mut self, surface: &mut RasterSurface) -> AppResult<()> {
        let alpha = alpha_u8(self.settings.alpha);
        if alpha == 0 {
            return Ok(());
        }

        // One lookup table per channel; the tint color is uniform
        let luts: [[u8; 256]; 3] = std::array::from_fn(|c| {
            let layer = self.settings.color[c];
            std::array::from_fn(|base| {
                let base = base as u8;
                mix(base, light_mix(base, layer), alpha)
            })
        });

        for pixel in surface.pixels_mut() {
            for c in 0..3 {
                pixel[c] = luts[c][usize::from(pixel[c])];
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_warm_tint_lightens_midtones() {
        let mut surface = RgbaImage::from_pixel(3, 3, Rgba([100, 100, 100, 255]));
        SoftOverlayTint::new(TintSettings::default())
            .apply(&mut surface)
            .unwrap();
        let p = surface.get_pixel(1, 1);
        assert!(p[0] > 100 && p[1] > 100 && p[2] > 100);
        // Red layer (255) is warmer than blue layer (230)
        assert!(p[0] >= p[2]);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_zero_alpha_is_noop() {
        let original = RgbaImage::from_fn(4, 4, |x, y| Rgba([x as u8 * 60, y as u8 * 60, 7, 255]));
        let mut surface = original.clone();
        SoftOverlayTint::new(TintSettings {
            alpha: 0.0,
            ..Default::default()
        })
        .apply(&mut surface)
        .unwrap();
        assert_eq!(surface, original);
    }

    #[test]
    fn test_dark_layer_darkens() {
        let mut surface = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 255]));
        SoftOverlayTint::new(TintSettings {
            color: [0, 0, 0],
            alpha: 1.0,
        })
        .apply(&mut surface)
        .unwrap();
        assert_eq!(*surface.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }
}
