// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand, ValueEnum};
use ghibli_camera::config::PhotoOutputFormat;
use ghibli_camera::constants::{app_info, timing};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "ghibli-camera")]
#[command(about = "Live camera stylization with a painterly filter pipeline")]
#[command(version = app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Snapshot encoding selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SnapshotFormat {
    Png,
    Jpeg,
}

impl From<SnapshotFormat> for PhotoOutputFormat {
    fn from(format: SnapshotFormat) -> Self {
        match format {
            SnapshotFormat::Png => PhotoOutputFormat::Png,
            SnapshotFormat::Jpeg => PhotoOutputFormat::Jpeg,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Live preview in the terminal (default)
    Terminal {
        /// Image to stylize instead of the animated test pattern
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON pipeline configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Flatten colors into cartoon bands
        #[arg(long)]
        posterize: bool,
    },

    /// Stylize one image and save the snapshot
    Snapshot {
        /// Image to stylize
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (default: ~/Pictures/ghibli-camera)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the frame without stylization
        #[arg(long)]
        bypass: bool,

        /// Snapshot format (overrides the configuration)
        #[arg(short, long, value_enum)]
        format: Option<SnapshotFormat>,

        /// JSON pipeline configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Flatten colors into cartoon bands
        #[arg(long)]
        posterize: bool,
    },

    /// Run the pipeline headless at a fixed refresh rate
    Stream {
        /// Image to stylize instead of the animated test pattern
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of frames to present
        #[arg(short = 'n', long, default_value = "90")]
        frames: u64,

        /// Refresh rate
        #[arg(long, default_value_t = timing::TARGET_FPS)]
        fps: u32,

        /// Present frames without stylization
        #[arg(long)]
        bypass: bool,

        /// Save the last presented frame into this directory
        #[arg(long)]
        capture_dir: Option<PathBuf>,

        /// JSON pipeline configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Flatten colors into cartoon bands
        #[arg(long)]
        posterize: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=ghibli_camera=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Terminal {
            input,
            config,
            posterize,
        }) => cli::run_terminal(input, config, posterize),
        Some(Commands::Snapshot {
            input,
            output,
            bypass,
            format,
            config,
            posterize,
        }) => cli::take_snapshot(
            input,
            output,
            bypass,
            format.map(Into::into),
            config,
            posterize,
        ),
        Some(Commands::Stream {
            input,
            frames,
            fps,
            bypass,
            capture_dir,
            config,
            posterize,
        }) => cli::run_stream(cli::StreamArgs {
            input,
            frames,
            fps,
            bypass,
            capture_dir,
            config,
            posterize,
        }),
        None => cli::run_terminal(None, None, false),
    }
}
