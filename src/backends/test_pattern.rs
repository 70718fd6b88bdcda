// SPDX-License-Identifier: MPL-2.0

//! Animated synthetic scene
//!
//! Stands in for a live camera when none is given: a sky gradient, a sun
//! disc drifting across it and rolling foliage bands along the bottom. Every
//! read advances the animation by one frame.
//!
//! The warm-up and frame-limit knobs model a camera that takes a few resume
//! attempts to start and a stream that ends.

use super::FrameSource;
use crate::errors::{AppResult, RasterError, SourceError};
use crate::media::RasterBuffer;
use image::{Rgba, RgbaImage};
use tracing::debug;

#[derive(Debug)]
pub struct TestPatternSource {
    frame: RgbaImage,
    frame_index: u64,
    /// Resume calls still needed before the source becomes ready
    warmup_remaining: u32,
    frame_limit: Option<u64>,
    stopped: bool,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> AppResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimension { width, height }.into());
        }
        Ok(Self {
            frame: RgbaImage::new(width, height),
            frame_index: 0,
            warmup_remaining: 0,
            frame_limit: None,
            stopped: false,
        })
    }

    /// Stay not-ready until `resume()` has been called `attempts` times
    pub fn with_warmup(mut self, attempts: u32) -> Self {
        self.warmup_remaining = attempts;
        self
    }

    /// End the stream after `frames` reads
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    fn render(&mut self) {
        let (width, height) = self.frame.dimensions();
        let t = self.frame_index as f32;

        let horizon = height as f32 * 0.65;
        let sun_x = (t * 2.0) % (width as f32 + 40.0) - 20.0;
        let sun_y = height as f32 * 0.3;
        let sun_r = (height.min(width) as f32 * 0.12).max(2.0);

        for (x, y, pixel) in self.frame.enumerate_pixels_mut() {
            let fx = x as f32;
            let fy = y as f32;

            *pixel = if fy < horizon {
                let dx = fx - sun_x;
                let dy = fy - sun_y;
                if dx * dx + dy * dy <= sun_r * sun_r {
                    Rgba([250, 210, 120, 255])
                } else {
                    // Deep blue at the top fading to pale near the horizon
                    let k = fy / horizon;
                    Rgba([
                        (70.0 + 120.0 * k) as u8,
                        (130.0 + 80.0 * k) as u8,
                        (220.0 + 20.0 * k) as u8,
                        255,
                    ])
                }
            } else {
                // Foliage bands roll sideways over time
                let wave = ((fx + t * 3.0) / 12.0).sin() * 6.0;
                let band = ((fy - horizon + wave) / 8.0) as i32;
                if band % 2 == 0 {
                    Rgba([60, 140, 70, 255])
                } else {
                    Rgba([40, 100, 50, 255])
                }
            };
        }
    }
}

impl FrameSource for TestPatternSource {
    fn name(&self) -> &str {
        "test-pattern"
    }

    fn is_ready(&self) -> bool {
        !self.stopped && self.warmup_remaining == 0 && !self.has_ended()
    }

    fn current_width(&self) -> u32 {
        self.frame.width()
    }

    fn current_height(&self) -> u32 {
        self.frame.height()
    }

    fn has_ended(&self) -> bool {
        self.stopped || self.frame_limit.is_some_and(|limit| self.frame_index >= limit)
    }

    fn read_into(&mut self, buffer: &mut RasterBuffer) -> AppResult<()> {
        if self.has_ended() {
            return Err(SourceError::Ended.into());
        }
        if self.warmup_remaining > 0 {
            return Err(SourceError::ReadFailed("source is still warming up".into()).into());
        }
        self.render();
        buffer.copy_from(&self.frame);
        self.frame_index += 1;
        Ok(())
    }

    fn resume(&mut self) -> AppResult<()> {
        if self.stopped {
            return Err(SourceError::Unavailable("source was stopped".into()).into());
        }
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            debug!(remaining = self.warmup_remaining, "Test pattern warming up");
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(TestPatternSource::new(0, 10).is_err());
    }

    #[test]
    fn test_warmup_counts_resumes() {
        let mut source = TestPatternSource::new(8, 8).unwrap().with_warmup(2);
        assert!(!source.is_ready());
        source.resume().unwrap();
        assert!(!source.is_ready());
        source.resume().unwrap();
        assert!(source.is_ready());
    }

    #[test]
    fn test_frames_animate_and_end() {
        let mut source = TestPatternSource::new(32, 24).unwrap().with_frame_limit(30);
        let mut first = RasterBuffer::allocate(32, 24).unwrap();
        let mut later = RasterBuffer::allocate(32, 24).unwrap();
        source.read_into(&mut first).unwrap();
        for _ in 0..28 {
            source.read_into(&mut later).unwrap();
        }
        assert_ne!(first, later);
        assert!(!source.has_ended());
        source.read_into(&mut later).unwrap();
        assert!(source.has_ended());
        assert!(source.read_into(&mut later).is_err());
    }

    #[test]
    fn test_stopped_source_refuses_resume() {
        let mut source = TestPatternSource::new(4, 4).unwrap();
        source.stop();
        assert!(source.has_ended());
        assert!(source.resume().is_err());
    }
}
