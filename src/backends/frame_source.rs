// SPDX-License-Identifier: MPL-2.0

//! Frame source abstraction consumed by the pipeline driver

use crate::errors::AppResult;
use crate::media::RasterBuffer;

/// Supplier of a continuously updating raster frame
///
/// A source is polled once per tick by the driver and never holds on to the
/// buffer it is handed. Implementations cover:
/// - Still images decoded from disk
/// - Animated synthetic test scenes
pub trait FrameSource: Send {
    /// Short human-readable name for logs
    fn name(&self) -> &str;

    // ===== Readiness =====

    /// Whether a frame can be read right now
    ///
    /// A source that is not ready is not an error; the driver skips the tick
    /// and asks the source to resume.
    fn is_ready(&self) -> bool;

    /// Current frame width, or 0 if not known yet
    fn current_width(&self) -> u32;

    /// Current frame height, or 0 if not known yet
    fn current_height(&self) -> u32;

    /// Whether the source has signalled end-of-stream
    fn has_ended(&self) -> bool;

    // ===== Frames =====

    /// Copy the latest frame into `buffer`
    ///
    /// Frames whose size differs from the buffer are resampled to fit.
    ///
    /// # Returns
    /// * `Ok(())` - The buffer now holds the latest frame
    /// * `Err(AppError)` - The read failed; the buffer contents are unspecified
    fn read_into(&mut self, buffer: &mut RasterBuffer) -> AppResult<()>;

    // ===== Lifecycle =====

    /// Best-effort request to advance or restart acquisition
    ///
    /// May complete later; readiness is re-checked on a following tick.
    /// Callers log failures and carry on.
    fn resume(&mut self) -> AppResult<()>;

    /// Stop acquisition and release underlying resources
    ///
    /// Called synchronously during driver teardown. After this the source
    /// reports `has_ended() == true`.
    fn stop(&mut self);
}
