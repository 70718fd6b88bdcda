// SPDX-License-Identifier: GPL-3.0-only

//! Runtime configuration
//!
//! Values are read once at startup (defaults or a JSON file) and never
//! written back.

use crate::constants::{FilterMode, filter_defaults, source, timing};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Affine curve for one color channel: `c * gain_pct / 100 + bias`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCurve {
    /// Gain in percent (90 = 0.9x)
    pub gain_pct: u16,
    /// Bias added after the gain
    pub bias: i16,
}

/// Quantize-and-warm color remap settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRemapSettings {
    pub red: ChannelCurve,
    pub green: ChannelCurve,
    pub blue: ChannelCurve,
    /// Red boost in percent when red strictly dominates
    pub warm_boost_pct: u16,
    /// Blue boost in percent when blue strictly dominates
    pub sky_boost_pct: u16,
    /// Green boost in percent when green strictly dominates
    pub foliage_boost_pct: u16,
    /// Round channels to the nearest multiple of this step (None = no posterize, the default)
    pub posterize_step: Option<u8>,
}

impl Default for ColorRemapSettings {
    fn default() -> Self {
        let [rg, gg, bg] = filter_defaults::CHANNEL_GAIN_PCT;
        let [rb, gb, bb] = filter_defaults::CHANNEL_BIAS;
        Self {
            red: ChannelCurve {
                gain_pct: rg,
                bias: rb,
            },
            green: ChannelCurve {
                gain_pct: gg,
                bias: gb,
            },
            blue: ChannelCurve {
                gain_pct: bg,
                bias: bb,
            },
            warm_boost_pct: filter_defaults::WARM_BOOST_PCT,
            sky_boost_pct: filter_defaults::SKY_BOOST_PCT,
            foliage_boost_pct: filter_defaults::FOLIAGE_BOOST_PCT,
            posterize_step: None,
        }
    }
}

/// Sobel edge overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSettings {
    /// Gradient magnitude above which a pixel is inked
    pub threshold: f32,
    /// Ink opacity (1.0 = opaque black)
    pub opacity: f32,
}

impl Default for EdgeSettings {
    fn default() -> Self {
        Self {
            threshold: filter_defaults::EDGE_THRESHOLD,
            opacity: filter_defaults::EDGE_OPACITY,
        }
    }
}

/// Warm soft-light wash settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TintSettings {
    pub color: [u8; 3],
    pub alpha: f32,
}

impl Default for TintSettings {
    fn default() -> Self {
        Self {
            color: filter_defaults::TINT_COLOR,
            alpha: filter_defaults::TINT_ALPHA,
        }
    }
}

/// Film grain settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrainSettings {
    /// Luminance deltas are drawn from `-amplitude..=amplitude`
    pub amplitude: u8,
    pub alpha: f32,
}

impl Default for GrainSettings {
    fn default() -> Self {
        Self {
            amplitude: filter_defaults::GRAIN_AMPLITUDE,
            alpha: filter_defaults::GRAIN_ALPHA,
        }
    }
}

/// Radial vignette settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VignetteSettings {
    /// Darkening at and beyond the outer radius
    pub max_alpha: f32,
    /// Outer radius in multiples of the half-width
    pub radius_factor: f32,
}

impl Default for VignetteSettings {
    fn default() -> Self {
        Self {
            max_alpha: filter_defaults::VIGNETTE_MAX_ALPHA,
            radius_factor: filter_defaults::VIGNETTE_RADIUS_FACTOR,
        }
    }
}

/// Settings for every stage of the filter chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub color: ColorRemapSettings,
    pub edges: EdgeSettings,
    pub tint: TintSettings,
    pub grain: GrainSettings,
    pub vignette: VignetteSettings,
}

impl FilterSettings {
    /// Check every value is inside the range its stage accepts
    pub fn validate(&self) -> AppResult<()> {
        if let Some(step) = self.color.posterize_step
            && step < 2
        {
            return Err(AppError::Config(format!(
                "posterize_step must be at least 2, got {}",
                step
            )));
        }
        if !(self.edges.threshold > 0.0) {
            return Err(AppError::Config(format!(
                "edge threshold must be positive, got {}",
                self.edges.threshold
            )));
        }
        check_unit("edge opacity", self.edges.opacity)?;
        check_unit("tint alpha", self.tint.alpha)?;
        if self.grain.amplitude > filter_defaults::GRAIN_MAX_AMPLITUDE {
            return Err(AppError::Config(format!(
                "grain amplitude must be at most {}, got {}",
                filter_defaults::GRAIN_MAX_AMPLITUDE,
                self.grain.amplitude
            )));
        }
        check_unit("grain alpha", self.grain.alpha)?;
        check_unit("vignette max_alpha", self.vignette.max_alpha)?;
        if !(self.vignette.radius_factor > 0.0) {
            return Err(AppError::Config(format!(
                "vignette radius_factor must be positive, got {}",
                self.vignette.radius_factor
            )));
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f32) -> AppResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

/// Snapshot output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhotoOutputFormat {
    /// Lossless, keeps alpha (default)
    #[default]
    Png,
    /// Lossy, smaller files
    Jpeg,
}

/// JPEG quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhotoQuality {
    Low,
    Medium,
    #[default]
    High,
    Maximum,
}

/// Snapshot export settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub format: PhotoOutputFormat,
    pub quality: PhotoQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Mode the driver starts in
    pub initial_mode: FilterMode,
    /// Display refreshes to wait before re-polling a source that was not ready
    pub resume_backoff_refreshes: u32,
    /// Buffer width when the source does not report one yet
    pub fallback_width: u32,
    /// Buffer height when the source does not report one yet
    pub fallback_height: u32,
    pub filters: FilterSettings,
    pub export: ExportSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            initial_mode: FilterMode::Active, // Filter on from the first frame
            resume_backoff_refreshes: timing::RESUME_BACKOFF_REFRESHES,
            fallback_width: source::FALLBACK_WIDTH,
            fallback_height: source::FALLBACK_HEIGHT,
            filters: FilterSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        info!(path = %path.display(), "Loading configuration");
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.fallback_width == 0 || self.fallback_height == 0 {
            return Err(AppError::Config(format!(
                "fallback dimensions must be positive, got {}x{}",
                self.fallback_width, self.fallback_height
            )));
        }
        self.filters.validate()
    }
}
