// SPDX-License-Identifier: GPL-3.0-only
//! Headless paced host
//!
//! Stands in for a display: a tokio interval fires once per refresh and the
//! driver ticks on it. Missed refreshes are skipped rather than bunched up.

use super::{DriverState, DriverStats, PipelineDriver, TickOutcome};
use crate::constants::timing;
use crate::errors::{AppResult, SourceError};
use std::time::{Duration, Instant};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

/// Pacing options for [`run_paced`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacedOptions {
    /// Refresh rate
    pub fps: u32,
    /// Stop after this many presented frames
    pub max_frames: Option<u64>,
    /// Stop after this many refreshes, presented or not
    pub max_refreshes: Option<u64>,
}

impl Default for PacedOptions {
    fn default() -> Self {
        Self {
            fps: timing::TARGET_FPS,
            max_frames: None,
            max_refreshes: None,
        }
    }
}

/// Summary of a paced run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacedReport {
    pub refreshes: u64,
    pub frames: u64,
    pub elapsed: Duration,
    pub stats: DriverStats,
}

impl PacedReport {
    /// Presented frames per second of wall time
    pub fn achieved_fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Tick `driver` once per refresh until it stops or a budget runs out
///
/// The driver is left as it is on return; callers tear it down (or capture
/// first) themselves.
pub async fn run_paced(driver: &mut PipelineDriver, options: PacedOptions) -> AppResult<PacedReport> {
    if driver.state() == DriverState::AwaitingSource {
        return Err(SourceError::Unavailable("no frame source attached".into()).into());
    }

    let period = timing::frame_period(options.fps);
    info!(fps = options.fps, max_frames = ?options.max_frames, "Starting paced run");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started = Instant::now();
    let mut refreshes = 0u64;
    let mut frames = 0u64;

    loop {
        if options.max_frames.is_some_and(|max| frames >= max)
            || options.max_refreshes.is_some_and(|max| refreshes >= max)
        {
            break;
        }

        ticker.tick().await;
        refreshes += 1;

        match driver.tick() {
            TickOutcome::Presented(_) => frames += 1,
            TickOutcome::Ended => {
                debug!("Driver stopped, ending paced run");
                break;
            }
            TickOutcome::Idle | TickOutcome::Skipped => {}
        }
    }

    let report = PacedReport {
        refreshes,
        frames,
        elapsed: started.elapsed(),
        stats: driver.stats(),
    };
    info!(
        refreshes,
        frames,
        fps = report.achieved_fps(),
        "Paced run finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::TestPatternSource;
    use crate::config::PipelineConfig;

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_frame_budget() {
        let mut driver = PipelineDriver::new(PipelineConfig::default());
        driver
            .attach_source(Box::new(TestPatternSource::new(16, 12).unwrap()))
            .unwrap();
        let report = run_paced(
            &mut driver,
            PacedOptions {
                max_frames: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(report.frames, 5);
        assert_eq!(report.stats.presented, 5);
        assert_eq!(driver.state(), DriverState::Streaming);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_source_ends() {
        let mut driver = PipelineDriver::new(PipelineConfig::default());
        driver
            .attach_source(Box::new(
                TestPatternSource::new(8, 8).unwrap().with_frame_limit(3),
            ))
            .unwrap();
        let report = run_paced(&mut driver, PacedOptions::default()).await.unwrap();
        assert_eq!(report.frames, 3);
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    #[tokio::test]
    async fn test_requires_source() {
        let mut driver = PipelineDriver::new(PipelineConfig::default());
        assert!(run_paced(&mut driver, PacedOptions::default()).await.is_err());
    }
}
