// SPDX-License-Identifier: MPL-2.0

//! Error types for the filter pipeline

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Raster buffer errors
    Raster(RasterError),
    /// Frame source errors
    Source(SourceError),
    /// Filter stage errors
    Filter(FilterError),
    /// Snapshot export errors
    Capture(CaptureError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Raster buffer errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// Allocation requested with a zero width or height
    InvalidDimension { width: u32, height: u32 },
    /// Raw pixel data does not match the declared dimensions
    SizeMismatch { expected: usize, actual: usize },
}

/// Frame source errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Source could not be opened or access was denied
    Unavailable(String),
    /// Source failed while supplying a frame
    ReadFailed(String),
    /// Source has signalled end-of-stream
    Ended,
}

/// Filter stage errors
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A stage failed while processing a frame
    StageFailed { stage: &'static str, reason: String },
}

/// Snapshot export errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Nothing has been presented yet
    Unavailable,
    /// Encoding failed
    EncodingFailed(String),
    /// Save failed
    SaveFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Raster(e) => write!(f, "Raster error: {}", e),
            AppError::Source(e) => write!(f, "Frame source error: {}", e),
            AppError::Filter(e) => write!(f, "Filter error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::InvalidDimension { width, height } => {
                write!(f, "Invalid dimension {}x{}", width, height)
            }
            RasterError::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Pixel data size mismatch: expected {} bytes, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable(msg) => write!(f, "Source unavailable: {}", msg),
            SourceError::ReadFailed(msg) => write!(f, "Read failed: {}", msg),
            SourceError::Ended => write!(f, "Source has ended"),
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::StageFailed { stage, reason } => {
                write!(f, "Stage '{}' failed: {}", stage, reason)
            }
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Unavailable => write!(f, "No frame has been presented yet"),
            CaptureError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            CaptureError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for RasterError {}
impl std::error::Error for SourceError {}
impl std::error::Error for FilterError {}
impl std::error::Error for CaptureError {}

// Conversions from sub-errors to AppError
impl From<RasterError> for AppError {
    fn from(err: RasterError) -> Self {
        AppError::Raster(err)
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::Source(err)
    }
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::Filter(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::SaveFailed(err.to_string())
    }
}
