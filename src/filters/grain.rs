// SPDX-License-Identifier: MPL-2.0

//! Film grain overlay
//!
//! Every call draws a fresh luminance delta per pixel from the injected
//! random source and overlays it at low alpha. Noise is generated on the fly,
//! nothing is retained between calls.

use super::FilterStage;
use super::blend::{alpha_u8, mix, overlay};
use crate::config::GrainSettings;
use crate::errors::AppResult;
use crate::media::RasterSurface;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Random source used by the grain stage
pub type NoiseSource = Box<dyn RngCore + Send>;

pub struct GrainOverlay {
    settings: GrainSettings,
    rng: NoiseSource,
}

impl GrainOverlay {
    /// Grain seeded from the operating system
    pub fn new(settings: GrainSettings) -> Self {
        Self::with_rng(settings, Box::new(StdRng::from_os_rng()))
    }

    /// Grain drawing from the given random source
    pub fn with_rng(settings: GrainSettings, rng: NoiseSource) -> Self {
        Self { settings, rng }
    }
}

impl std::fmt::Debug for GrainOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrainOverlay")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl FilterStage for GrainOverlay {
    fn name(&self) -> &'static str {
        "grain_overlay"
    }

    fn apply(&mut self, surface: &mut RasterSurface) -> AppResult<()> {
        let alpha = alpha_u8(self.settings.alpha);
        let amplitude = i16::from(self.settings.amplitude);
        if alpha == 0 || amplitude == 0 {
            return Ok(());
        }

        for pixel in surface.pixels_mut() {
            let delta = self.rng.random_range(-amplitude..=amplitude);
            let layer = (128 + delta).clamp(0, 255) as u8;
            for c in 0..3 {
                pixel[c] = mix(pixel[c], overlay(pixel[c], layer), alpha);
            }
        }
        Ok(())
    }
}
