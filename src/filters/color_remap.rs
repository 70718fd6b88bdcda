// SPDX-License-Identifier: MPL-2.0

//! Quantize-and-warm color remap
//!
//! Compresses each channel toward a warm baseline, boosts whichever channel
//! dominates the pixel (sunset reds, sky blues, foliage greens) and optionally
//! posterizes into flat cartoon regions. Integer math only, so the output is
//! fully deterministic.

use super::FilterStage;
use crate::config::{ChannelCurve, ColorRemapSettings};
use crate::errors::AppResult;
use crate::media::RasterSurface;

#[derive(Debug, Clone)]
pub struct ColorRemap {
    settings: ColorRemapSettings,
}

impl ColorRemap {
    pub fn new(settings: ColorRemapSettings) -> Self {
        Self { settings }
    }

    /// Remap a single RGB triple
    pub fn remap_rgb(&self, rgb: [u8; 3]) -> [u8; 3] {
        let s = &self.settings;
        let mut r = apply_curve(rgb[0], s.red);
        let mut g = apply_curve(rgb[1], s.green);
        let mut b = apply_curve(rgb[2], s.blue);

        if r > g && r > b {
            r = boost(r, s.warm_boost_pct);
        } else if b > r && b > g {
            b = boost(b, s.sky_boost_pct);
        } else if g > r && g > b {
            g = boost(g, s.foliage_boost_pct);
        }

        if let Some(step) = s.posterize_step {
            r = posterize(r, step);
            g = posterize(g, step);
            b = posterize(b, step);
        }

        [r, g, b]
    }
}

impl FilterStage for ColorRemap {
    fn name(&self) -> &'static str {
        "color_remap"
    }

    fn apply(&mut self, surface: &mut RasterSurface) -> AppResult<()> {
        for pixel in surface.pixels_mut() {
            let [r, g, b] = self.remap_rgb([pixel[0], pixel[1], pixel[2]]);
            pixel[0] = r;
            pixel[1] = g;
            pixel[2] = b;
        }
        Ok(())
    }
}

/// `clamp(0, 255, c * gain + bias)`
#[inline]
fn apply_curve(c: u8, curve: ChannelCurve) -> u8 {
    let scaled = (i32::from(c) * i32::from(curve.gain_pct) + 50) / 100;
    (scaled + i32::from(curve.bias)).clamp(0, 255) as u8
}

#[inline]
fn boost(c: u8, pct: u16) -> u8 {
    ((u32::from(c) * u32::from(pct) + 50) / 100).min(255) as u8
}

/// Round to the nearest multiple of `step`, saturating at 255
#[inline]
fn posterize(c: u8, step: u8) -> u8 {
    let step = u32::from(step.max(1));
    (((u32::from(c) + step / 2) / step) * step).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn unquantized() -> ColorRemap {
        ColorRemap::new(ColorRemapSettings {
            posterize_step: None,
            ..Default::default()
        })
    }

    #[test]
    fn test_black_frame_gets_warm_bias() {
        // Bias (25, 20, 30) makes blue dominant, so blue gets the sky boost
        let mut surface = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        unquantized().apply(&mut surface).unwrap();
        for pixel in surface.pixels() {
            assert_eq!(*pixel, Rgba([25, 20, 32, 255]));
        }
    }

    #[test]
    fn test_black_frame_posterized() {
        let mut surface = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        ColorRemap::new(ColorRemapSettings {
            posterize_step: Some(16),
            ..Default::default()
        })
        .apply(&mut surface)
        .unwrap();
        // 25 -> 32, 20 -> 16, 32 -> 32 with a bucket size of 16
        assert_eq!(*surface.get_pixel(1, 1), Rgba([32, 16, 32, 255]));
    }

    #[test]
    fn test_red_dominant_gets_warm_boost() {
        let remap = unquantized();
        // 200 -> 205 -> 226 (x1.1)
        assert_eq!(remap.remap_rgb([200, 50, 50]), [226, 65, 73]);
    }

    #[test]
    fn test_ties_get_no_boost() {
        let remap = ColorRemap::new(ColorRemapSettings {
            red: ChannelCurve {
                gain_pct: 100,
                bias: 0,
            },
            green: ChannelCurve {
                gain_pct: 100,
                bias: 0,
            },
            blue: ChannelCurve {
                gain_pct: 100,
                bias: 0,
            },
            posterize_step: None,
            ..Default::default()
        });
        assert_eq!(remap.remap_rgb([100, 100, 40]), [100, 100, 40]);
    }

    #[test]
    fn test_output_clamped_for_extreme_curves() {
        let remap = ColorRemap::new(ColorRemapSettings {
            red: ChannelCurve {
                gain_pct: u16::MAX,
                bias: i16::MAX,
            },
            green: ChannelCurve {
                gain_pct: 0,
                bias: i16::MIN,
            },
            blue: ChannelCurve {
                gain_pct: 300,
                bias: -40,
            },
            ..Default::default()
        });
        for v in [0u8, 1, 127, 128, 254, 255] {
            let [r, g, _b] = remap.remap_rgb([v, v, v]);
            assert_eq!(r, 255);
            assert_eq!(g, 0);
        }
    }

    #[test]
    fn test_alpha_untouched() {
        let mut surface = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 77]));
        unquantized().apply(&mut surface).unwrap();
        assert_eq!(surface.get_pixel(0, 0)[3], 77);
    }

    #[test]
    fn test_posterize_saturates() {
        assert_eq!(posterize(255, 16), 255);
        assert_eq!(posterize(7, 16), 0);
        assert_eq!(posterize(8, 16), 16);
    }
}
