// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Filter mode of the pipeline
///
/// Owned by the pipeline driver and read once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Full stylization pipeline runs on every frame (default)
    #[default]
    Active,
    /// Frames are presented exactly as the source supplied them
    Bypassed,
}

impl FilterMode {
    /// Get all modes for UI iteration
    pub const ALL: [FilterMode; 2] = [FilterMode::Active, FilterMode::Bypassed];

    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            FilterMode::Active => FilterMode::Bypassed,
            FilterMode::Bypassed => FilterMode::Active,
        }
    }

    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterMode::Active => "Ghibli style on",
            FilterMode::Bypassed => "Original view",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, FilterMode::Active)
    }
}

/// Tuned defaults for the stylization stages
pub mod filter_defaults {
    /// Per-channel affine gain in percent (red, green, blue)
    pub const CHANNEL_GAIN_PCT: [u16; 3] = [90, 90, 85];

    /// Per-channel warm bias added after the gain (red, green, blue)
    pub const CHANNEL_BIAS: [i16; 3] = [25, 20, 30];

    /// Red boost when red dominates (sunset tones)
    pub const WARM_BOOST_PCT: u16 = 110;

    /// Blue boost when blue dominates (sky)
    pub const SKY_BOOST_PCT: u16 = 105;

    /// Green boost when green dominates (foliage)
    pub const FOLIAGE_BOOST_PCT: u16 = 105;

    /// Posterize bucket size for flat cartoon regions (opt-in)
    pub const POSTERIZE_STEP: u8 = 16;

    /// Sobel gradient magnitude above which a pixel is an edge
    pub const EDGE_THRESHOLD: f32 = 50.0;

    /// Edge ink opacity (1.0 = opaque black)
    pub const EDGE_OPACITY: f32 = 1.0;

    /// Warm wash color laid over the frame
    pub const TINT_COLOR: [u8; 3] = [255, 250, 230];

    /// Warm wash opacity
    pub const TINT_ALPHA: f32 = 0.15;

    /// Grain luminance delta range (+/-)
    pub const GRAIN_AMPLITUDE: u8 = 12;

    /// Largest amplitude that keeps `128 + delta` inside a channel
    pub const GRAIN_MAX_AMPLITUDE: u8 = 127;

    /// Grain layer opacity
    pub const GRAIN_ALPHA: f32 = 8.0 / 255.0;

    /// Maximum vignette darkening at and beyond the outer radius
    pub const VIGNETTE_MAX_ALPHA: f32 = 0.15;

    /// Vignette outer radius in multiples of the half-width
    pub const VIGNETTE_RADIUS_FACTOR: f32 = 1.5;
}

/// Frame source defaults
pub mod source {
    /// Width used when a source does not report its size yet
    pub const FALLBACK_WIDTH: u32 = 640;

    /// Height used when a source does not report its size yet
    pub const FALLBACK_HEIGHT: u32 = 480;
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Target presentation rate
    pub const TARGET_FPS: u32 = 30;

    /// Display refreshes to wait before re-polling a source that was not ready
    pub const RESUME_BACKOFF_REFRESHES: u32 = 3;

    /// Input poll interval for the terminal host (~60Hz)
    pub const TERMINAL_POLL_INTERVAL: Duration = Duration::from_millis(16);

    /// Duration of one refresh at the given rate
    pub fn frame_period(fps: u32) -> Duration {
        Duration::from_secs_f64(1.0 / fps.max(1) as f64)
    }
}

/// Snapshot export naming
pub mod export {
    /// Prefix of every suggested snapshot filename
    pub const FILENAME_PREFIX: &str = "ghibli-moment";

    /// Directory name created under the user's pictures directory
    pub const PICTURES_SUBDIR: &str = "ghibli-camera";
}

/// Supported file formats for still image sources
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
