// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the filter pipeline
//!
//! This module provides command-line functionality for:
//! - Live terminal preview
//! - Stylizing a single image into a snapshot
//! - Headless paced streaming

use ghibli_camera::backends::{FrameSource, StillImageSource, TestPatternSource};
use ghibli_camera::config::{PhotoOutputFormat, PipelineConfig};
use ghibli_camera::constants::{FilterMode, filter_defaults, source};
use ghibli_camera::errors::AppResult;
use ghibli_camera::pipelines::driver::host::{PacedOptions, run_paced};
use ghibli_camera::pipelines::driver::{PipelineDriver, TickOutcome};
use ghibli_camera::pipelines::photo::CaptureExporter;
use ghibli_camera::{storage, terminal};
use std::path::{Path, PathBuf};

/// Refreshes a snapshot waits for its first frame
const SNAPSHOT_MAX_REFRESHES: u32 = 300;

/// Arguments of the `stream` command
pub struct StreamArgs {
    pub input: Option<PathBuf>,
    pub frames: u64,
    pub fps: u32,
    pub bypass: bool,
    pub capture_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub posterize: bool,
}

/// Run the live terminal preview
pub fn run_terminal(
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    posterize: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config.as_deref(), posterize)?;
    let exporter = CaptureExporter::from_settings(&config.export);

    let mut driver = PipelineDriver::new(config);
    driver.connect(|| open_source(input.as_deref()))?;

    terminal::run(&mut driver, &exporter, &storage::default_capture_dir())
}

/// Stylize one image and save the snapshot
pub fn take_snapshot(
    input: PathBuf,
    output: Option<PathBuf>,
    bypass: bool,
    format: Option<PhotoOutputFormat>,
    config: Option<PathBuf>,
    posterize: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config.as_deref(), posterize)?;
    if let Some(format) = format {
        config.export.format = format;
    }
    let exporter = CaptureExporter::from_settings(&config.export);

    let mut driver = PipelineDriver::new(config);
    if bypass {
        driver.set_mode(FilterMode::Bypassed);
    }
    driver.connect(|| open_source(Some(&input)))?;

    println!("Stylizing: {}", input.display());

    let mut presented = false;
    for _ in 0..SNAPSHOT_MAX_REFRESHES {
        match driver.tick() {
            TickOutcome::Presented(mode) => {
                println!("Mode: {}", mode.display_name());
                presented = true;
                break;
            }
            TickOutcome::Ended => break,
            TickOutcome::Idle | TickOutcome::Skipped => {}
        }
    }
    if !presented {
        return Err("No frame was presented".into());
    }

    let image = driver.capture_current_frame(&exporter)?;
    driver.teardown();

    let output_dir = output.unwrap_or_else(storage::default_capture_dir);
    let path = storage::save_capture(&image, &output_dir)?;
    println!("Snapshot saved: {}", path.display());
    Ok(())
}

/// Run the pipeline headless at a fixed refresh rate
pub fn run_stream(args: StreamArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref(), args.posterize)?;
    let exporter = CaptureExporter::from_settings(&config.export);

    let mut driver = PipelineDriver::new(config);
    if args.bypass {
        driver.set_mode(FilterMode::Bypassed);
    }
    driver.connect(|| open_source(args.input.as_deref()))?;

    println!(
        "Streaming {} frames at {} fps from {}",
        args.frames,
        args.fps,
        driver.source_name().unwrap_or("unknown")
    );

    // Ticks run on this thread only
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = rt.block_on(run_paced(
        &mut driver,
        PacedOptions {
            fps: args.fps,
            max_frames: Some(args.frames),
            max_refreshes: None,
        },
    ))?;

    println!(
        "Presented {} frames in {:.2}s ({:.1} fps)",
        report.frames,
        report.elapsed.as_secs_f64(),
        report.achieved_fps()
    );
    println!(
        "Ticks: {} | skipped: {} | stage failures: {} | dimension changes: {}",
        report.stats.ticks,
        report.stats.skipped,
        report.stats.stage_failures,
        report.stats.dimension_changes
    );

    if let Some(dir) = args.capture_dir {
        let image = driver.capture_current_frame(&exporter)?;
        let path = storage::save_capture(&image, &dir)?;
        println!("Last frame saved: {}", path.display());
    }

    driver.teardown();
    Ok(())
}

/// Configuration from `path` or defaults, with posterize forced on if asked
fn load_config(path: Option<&Path>, posterize: bool) -> AppResult<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if posterize && config.filters.color.posterize_step.is_none() {
        config.filters.color.posterize_step = Some(filter_defaults::POSTERIZE_STEP);
    }
    Ok(config)
}

/// Still image if a path is given, animated test pattern otherwise
fn open_source(input: Option<&Path>) -> AppResult<Box<dyn FrameSource>> {
    match input {
        Some(path) => Ok(Box::new(StillImageSource::open(path)?)),
        None => Ok(Box::new(TestPatternSource::new(
            source::FALLBACK_WIDTH,
            source::FALLBACK_HEIGHT,
        )?)),
    }
}
