// SPDX-License-Identifier: GPL-3.0-only
//! Pipeline driver
//!
//! Owns the frame buffers, the filter chain and the frame source, and runs
//! one frame of work per due tick:
//!
//! ```text
//! AwaitingSource ──attach──▶ Streaming ──end / teardown──▶ Stopped
//! ```
//!
//! While streaming, a tick whose source is not ready skips filter work,
//! nudges the source to resume and re-arms the clock after a short backoff.
//! A ready tick copies the latest frame, stylizes it (or copies it through
//! when bypassed) and publishes the result as the presented surface.
//!
//! Ticks run to completion on the caller's thread. The clock holds a single
//! pending handle, so two ticks never overlap and the buffers need no locks.

pub mod clock;
pub mod host;

pub use clock::{FrameClock, TickHandle};

use crate::backends::FrameSource;
use crate::config::PipelineConfig;
use crate::constants::{FilterMode, timing};
use crate::errors::{AppError, AppResult, SourceError};
use crate::filters::FilterChain;
use crate::media::{RasterBuffer, RasterSurface};
use crate::pipelines::photo::{CaptureExporter, CapturedImage};
use tracing::{debug, info, trace, warn};

/// Lifecycle of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No frame source attached yet
    AwaitingSource,
    /// Source attached, ticks are being scheduled
    Streaming,
    /// Source ended or the driver was torn down
    Stopped,
}

/// What a call to [`PipelineDriver::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No tick was due on this refresh
    Idle,
    /// A tick ran but the source had no frame; the clock is re-armed
    Skipped,
    /// A frame was presented in the given mode
    ///
    /// `Bypassed` is reported when a stage failed and the raw frame was shown.
    Presented(FilterMode),
    /// The source ended and the driver stopped
    Ended,
}

/// Tick counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Due ticks that ran
    pub ticks: u64,
    /// Frames published to the presented surface
    pub presented: u64,
    /// Ticks skipped because the source had no frame
    pub skipped: u64,
    /// Ticks where a stage failed and the raw frame was shown instead
    pub stage_failures: u64,
    /// Buffer reallocations after the source changed size
    pub dimension_changes: u64,
}

pub struct PipelineDriver {
    config: PipelineConfig,
    state: DriverState,
    mode: FilterMode,
    chain: FilterChain,
    source: Option<Box<dyn FrameSource>>,
    /// Latest raw frame from the source
    frame: Option<RasterBuffer>,
    /// Last surface handed to the presentation collaborator
    presented: Option<RasterBuffer>,
    clock: FrameClock,
    pending: Option<TickHandle>,
    /// Readiness seen on the previous due tick, for change-only logging
    last_ready: Option<bool>,
    stats: DriverStats,
}

impl PipelineDriver {
    /// Driver with the full stylization chain and OS-seeded grain
    pub fn new(config: PipelineConfig) -> Self {
        let chain = FilterChain::new(&config.filters);
        Self::with_chain(config, chain)
    }

    /// Driver running a caller-built chain
    pub fn with_chain(config: PipelineConfig, chain: FilterChain) -> Self {
        let mode = config.initial_mode;
        debug!(?chain, mode = ?mode, "Pipeline driver created");
        Self {
            config,
            state: DriverState::AwaitingSource,
            mode,
            chain,
            source: None,
            frame: None,
            presented: None,
            clock: FrameClock::new(),
            pending: None,
            last_ready: None,
            stats: DriverStats::default(),
        }
    }

    // ===== State =====

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Request a mode; it applies from the next tick
    pub fn set_mode(&mut self, mode: FilterMode) {
        if mode != self.mode {
            info!(from = ?self.mode, to = ?mode, "Filter mode change requested");
            self.mode = mode;
        }
    }

    /// Flip between Active and Bypassed, returning the new mode
    pub fn toggle_mode(&mut self) -> FilterMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the attached source, if any
    pub fn source_name(&self) -> Option<&str> {
        self.source.as_deref().map(|s| s.name())
    }

    /// Surface shown on the last presented tick
    pub fn presented_surface(&self) -> Option<&RasterSurface> {
        self.presented.as_ref().map(RasterBuffer::as_surface)
    }

    // ===== Lifecycle =====

    /// Attach a source and start streaming
    ///
    /// Buffers are sized to the source, or to the configured fallback when
    /// the source does not report dimensions yet.
    pub fn attach_source(&mut self, source: Box<dyn FrameSource>) -> AppResult<()> {
        match self.state {
            DriverState::AwaitingSource => {}
            DriverState::Streaming => {
                return Err(AppError::Other("a frame source is already attached".into()));
            }
            DriverState::Stopped => {
                return Err(AppError::Other("driver has been stopped".into()));
            }
        }

        let (width, height) =
            self.frame_dimensions(source.current_width(), source.current_height());
        self.frame = Some(RasterBuffer::allocate(width, height)?);

        info!(source = source.name(), width, height, "Frame source attached, streaming");
        self.source = Some(source);
        self.state = DriverState::Streaming;
        self.last_ready = None;
        self.pending = Some(self.clock.schedule());
        Ok(())
    }

    /// Open a source with `open` and attach it
    ///
    /// On failure the driver stays in `AwaitingSource` and the error is
    /// reported as `SourceError::Unavailable`.
    pub fn connect<F>(&mut self, open: F) -> AppResult<()>
    where
        F: FnOnce() -> AppResult<Box<dyn FrameSource>>,
    {
        let source = match open() {
            Ok(source) => source,
            Err(e) => {
                warn!(error = %e, "Frame source unavailable");
                return Err(match e {
                    AppError::Source(SourceError::Unavailable(_)) => e,
                    other => SourceError::Unavailable(other.to_string()).into(),
                });
            }
        };
        self.attach_source(source)
    }

    /// Cancel the pending tick and stop the source
    ///
    /// Synchronous and idempotent. The presented surface survives so a final
    /// capture is still possible.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.clock.cancel(handle);
        }
        if let Some(source) = self.source.as_mut() {
            source.stop();
            debug!(source = source.name(), "Frame source stopped");
        }
        self.source = None;
        if self.state != DriverState::Stopped {
            info!(presented = self.stats.presented, "Pipeline driver stopped");
            self.state = DriverState::Stopped;
        }
    }

    // ===== Ticks =====

    /// Advance one display refresh
    ///
    /// Runs the pending tick if it is due, otherwise returns `Idle`.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != DriverState::Streaming {
            return if self.state == DriverState::Stopped {
                TickOutcome::Ended
            } else {
                TickOutcome::Idle
            };
        }
        let Some(handle) = self.clock.take_due() else {
            return TickOutcome::Idle;
        };
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.stats.ticks += 1;

        // Read once; a toggle during this tick applies to the next one
        let mode = self.mode;

        let Some(source) = self.source.as_mut() else {
            self.teardown();
            return TickOutcome::Ended;
        };

        if source.has_ended() {
            info!(source = source.name(), "Frame source ended");
            self.teardown();
            return TickOutcome::Ended;
        }

        let ready = source.is_ready();
        if self.last_ready != Some(ready) {
            debug!(source = source.name(), ready, "Frame source readiness changed");
            self.last_ready = Some(ready);
        }

        if !ready {
            trace!("Source not ready, skipping tick");
            if let Err(e) = source.resume() {
                warn!(error = %e, "Failed to resume frame source");
            }
            return self.skip();
        }

        let (width, height) = (source.current_width(), source.current_height());
        if let Err(e) = self.ensure_dimensions(width, height) {
            warn!(error = %e, width, height, "Failed to resize frame buffer");
            return self.skip();
        }

        let (Some(source), Some(frame)) = (self.source.as_mut(), self.frame.as_mut()) else {
            return self.skip();
        };
        if let Err(e) = source.read_into(frame) {
            if source.has_ended() {
                info!(source = source.name(), "Frame source ended");
                self.teardown();
                return TickOutcome::Ended;
            }
            warn!(error = %e, "Failed to read frame");
            return self.skip();
        }

        let shown = match self.present(mode) {
            Ok(shown) => shown,
            Err(e) => {
                warn!(error = %e, "Failed to present frame");
                return self.skip();
            }
        };

        self.stats.presented += 1;
        if self.stats.presented % timing::FRAME_LOG_INTERVAL == 0 {
            debug!(
                presented = self.stats.presented,
                skipped = self.stats.skipped,
                stage_failures = self.stats.stage_failures,
                "Frame pipeline progress"
            );
        }

        self.pending = Some(self.clock.schedule());
        TickOutcome::Presented(shown)
    }

    /// Encode the presented surface
    pub fn capture_current_frame(&self, exporter: &CaptureExporter) -> AppResult<CapturedImage> {
        exporter.capture_current_frame(self.presented_surface())
    }

    fn skip(&mut self) -> TickOutcome {
        self.stats.skipped += 1;
        self.pending = Some(self.clock.schedule_after(self.config.resume_backoff_refreshes));
        TickOutcome::Skipped
    }

    /// Dimensions to allocate for a source reporting `width` x `height`
    fn frame_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width > 0 && height > 0 {
            (width, height)
        } else if let Some(frame) = &self.frame {
            frame.dimensions()
        } else {
            (self.config.fallback_width, self.config.fallback_height)
        }
    }

    /// Reallocate the frame buffer if the source changed size
    fn ensure_dimensions(&mut self, width: u32, height: u32) -> AppResult<()> {
        let (width, height) = self.frame_dimensions(width, height);
        let current = self.frame.as_ref().map(RasterBuffer::dimensions);
        if current == Some((width, height)) {
            return Ok(());
        }

        self.frame = Some(RasterBuffer::allocate(width, height)?);
        if let Some((old_width, old_height)) = current {
            self.stats.dimension_changes += 1;
            info!(old_width, old_height, width, height, "Frame dimensions changed");
        }
        Ok(())
    }

    /// Build the presented surface from the latest frame
    fn present(&mut self, mode: FilterMode) -> AppResult<FilterMode> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| AppError::Other("no frame buffer allocated".into()))?;

        let mut out = match self.presented.take() {
            Some(buffer) if buffer.dimensions() == frame.dimensions() => buffer,
            _ => {
                let (width, height) = frame.dimensions();
                RasterBuffer::allocate(width, height)?
            }
        };
        out.copy_from(frame.as_surface());

        let shown = match mode {
            FilterMode::Bypassed => FilterMode::Bypassed,
            FilterMode::Active => match self.chain.apply(out.as_surface_mut()) {
                Ok(()) => FilterMode::Active,
                Err(e) => {
                    // Show the raw frame rather than a half-filtered one
                    warn!(error = %e, "Filter stage failed, presenting unfiltered frame");
                    self.stats.stage_failures += 1;
                    out.copy_from(frame.as_surface());
                    FilterMode::Bypassed
                }
            },
        };

        self.presented = Some(out);
        Ok(shown)
    }
}

impl Drop for PipelineDriver {
    fn drop(&mut self) {
        if self.state == DriverState::Streaming {
            debug!("PipelineDriver dropped, tearing down");
            self.teardown();
        }
    }
}

impl std::fmt::Debug for PipelineDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineDriver")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("source", &self.source_name())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{StillImageSource, TestPatternSource};
    use crate::errors::CaptureError;
    use crate::filters::tests::FailingStage;
    use image::{Rgba, RgbaImage};

    fn still(width: u32, height: u32) -> Box<dyn FrameSource> {
        Box::new(StillImageSource::from_image(
            "still",
            RgbaImage::from_fn(width, height, |x, y| {
                Rgba([(x * 30) as u8, (y * 30) as u8, 128, 255])
            }),
        ))
    }

    #[test]
    fn test_starts_awaiting_source() {
        let mut driver = PipelineDriver::new(PipelineConfig::default());
        assert_eq!(driver.state(), DriverState::AwaitingSource);
        assert_eq!(driver.tick(), TickOutcome::Idle);
        assert!(driver.presented_surface().is_none());
    }

    #[test]
    fn test_attach_presents_on_first_tick() {
        let mut driver = PipelineDriver::new(PipelineConfig::default());
        driver.attach_source(still(6, 4)).unwrap();
        assert_eq!(driver.state(), DriverState::Streaming);
        assert!(driver.clock().is_armed());
        assert_eq!(driver.tick(), TickOutcome::Presented(FilterMode::Active));
        assert_eq!(driver.presented_surface().unwrap().dimensions(), (6, 4));
        assert!(driver.clock().is_armed());
    }

    #[test]
    fn test_double_attach_rejected() {
        let mut driver = PipelineDriver::new(PipelineConfig::default());
        driver.attach_source(still(2, 2)).unwrap();
        assert!(driver.attach_source(still(2, 2)).is_err());
    }

    #[test]
    fn test_failed_connect_stays_awaiting() {
        let mut driver = PipelineDriver::new(PipelineConfig::default());
        let err = driver
            .connect(|| Err(AppError::Other("permission denied".into())))
            .unwrap_err();
        assert!(matches!(err, AppError::Source(SourceError::Unavailable(_))));
        assert_eq!(driver.state(), DriverState::AwaitingSource);
        assert!(!driver.clock().is_armed());
    }

    #[test]
    fn test_stage_failure_presents_raw_frame() {
        let chain = FilterChain::from_stages(vec![Box::new(FailingStage)]);
        let mut driver = PipelineDriver::with_chain(PipelineConfig::default(), chain);
        let source = still(5, 5);
        let mut expected = RasterBuffer::allocate(5, 5).unwrap();
        let mut probe = still(5, 5);
        probe.read_into(&mut expected).unwrap();
        driver.attach_source(source).unwrap();

        assert_eq!(driver.tick(), TickOutcome::Presented(FilterMode::Bypassed));
        assert_eq!(driver.presented_surface(), Some(expected.as_surface()));
        assert_eq!(driver.stats().stage_failures, 1);
        assert_eq!(driver.state(), DriverState::Streaming);
        assert!(driver.clock().is_armed());
    }

    #[test]
    fn test_unready_source_backs_off() {
        let config = PipelineConfig {
            resume_backoff_refreshes: 2,
            ..Default::default()
        };
        let mut driver = PipelineDriver::new(config);
        driver
            .attach_source(Box::new(TestPatternSource::new(8, 8).unwrap().with_warmup(1)))
            .unwrap();

        assert_eq!(driver.tick(), TickOutcome::Skipped);
        assert_eq!(driver.tick(), TickOutcome::Idle);
        assert_eq!(driver.tick(), TickOutcome::Idle);
        assert_eq!(driver.tick(), TickOutcome::Presented(FilterMode::Active));
        assert_eq!(driver.stats().skipped, 1);
    }

    #[test]
    fn test_dimension_change_reallocates() {
        // Sized to the fallback first, then to the real size once reported
        let mut driver = PipelineDriver::new(PipelineConfig {
            fallback_width: 3,
            fallback_height: 3,
            ..Default::default()
        });
        driver
            .attach_source(Box::new(ZeroSizedUntilRead::default()))
            .unwrap();
        assert_eq!(driver.tick(), TickOutcome::Presented(FilterMode::Active));
        assert_eq!(driver.presented_surface().unwrap().dimensions(), (3, 3));
        assert_eq!(driver.tick(), TickOutcome::Presented(FilterMode::Active));
        assert_eq!(driver.presented_surface().unwrap().dimensions(), (7, 5));
        assert_eq!(driver.stats().dimension_changes, 1);
    }

    #[test]
    fn test_teardown_cancels_and_stops() {
        let mut driver = PipelineDriver::new(PipelineConfig::default());
        driver.attach_source(still(3, 3)).unwrap();
        driver.tick();
        driver.teardown();
        assert_eq!(driver.state(), DriverState::Stopped);
        assert!(!driver.clock().is_armed());
        assert!(driver.source_name().is_none());
        assert_eq!(driver.tick(), TickOutcome::Ended);
        // Last frame is still capturable
        assert!(
            driver
                .capture_current_frame(&CaptureExporter::new())
                .is_ok()
        );
    }

    #[test]
    fn test_capture_before_present_is_unavailable() {
        let mut driver = PipelineDriver::new(PipelineConfig::default());
        driver.attach_source(still(3, 3)).unwrap();
        let err = driver
            .capture_current_frame(&CaptureExporter::new())
            .unwrap_err();
        assert_eq!(err, AppError::Capture(CaptureError::Unavailable));
    }

    /// Reports no size until the first read, then grows to 7x5
    #[derive(Default)]
    struct ZeroSizedUntilRead {
        reads: u32,
    }

    impl FrameSource for ZeroSizedUntilRead {
        fn name(&self) -> &str {
            "zero-sized"
        }
        fn is_ready(&self) -> bool {
            true
        }
        fn current_width(&self) -> u32 {
            if self.reads == 0 { 0 } else { 7 }
        }
        fn current_height(&self) -> u32 {
            if self.reads == 0 { 0 } else { 5 }
        }
        fn has_ended(&self) -> bool {
            false
        }
        fn read_into(&mut self, buffer: &mut RasterBuffer) -> AppResult<()> {
            self.reads += 1;
            buffer.copy_from(&RgbaImage::from_pixel(7, 5, Rgba([50, 60, 70, 255])));
            Ok(())
        }
        fn resume(&mut self) -> AppResult<()> {
            Ok(())
        }
        fn stop(&mut self) {}
    }
}
