// SPDX-License-Identifier: MPL-2.0

//! Ghibli Camera - painterly live camera stylization
//!
//! This library provides the frame filter pipeline behind the camera: an
//! owned raster buffer, the stylization stages, a tick-driven driver that
//! runs them against a frame source, and snapshot export.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`media`]: Owned RGBA raster buffer
//! - [`filters`]: Stylization stages and the fixed-order chain
//! - [`backends`]: Frame sources (still images, animated test pattern)
//! - [`pipelines`]: Pipeline driver and snapshot export
//! - [`config`]: Runtime configuration
//! - [`storage`]: Saving snapshots to disk
//! - [`terminal`]: Live half-block preview in the terminal
//!
//! # Example
//!
//! ```no_run
//! use ghibli_camera::{
//!     CaptureExporter, PipelineConfig, PipelineDriver, TestPatternSource, TickOutcome,
//! };
//!
//! let mut driver = PipelineDriver::new(PipelineConfig::default());
//! driver.attach_source(Box::new(TestPatternSource::new(320, 240)?))?;
//! while !matches!(driver.tick(), TickOutcome::Presented(_)) {}
//! let snapshot = driver.capture_current_frame(&CaptureExporter::new())?;
//! println!("{}", snapshot.file_name());
//! # Ok::<(), ghibli_camera::AppError>(())
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod media;
pub mod pipelines;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use backends::{FrameSource, StillImageSource, TestPatternSource};
pub use config::PipelineConfig;
pub use constants::FilterMode;
pub use errors::{AppError, AppResult};
pub use filters::{FilterChain, FilterStage};
pub use media::{RasterBuffer, RasterSurface};
pub use pipelines::driver::{DriverState, DriverStats, PipelineDriver, TickOutcome};
pub use pipelines::photo::{CaptureExporter, CapturedImage};
