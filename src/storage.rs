// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for saving snapshots

use crate::constants::export::PICTURES_SUBDIR;
use crate::errors::{AppResult, CaptureError};
use crate::pipelines::photo::CapturedImage;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Get the snapshot directory (~/Pictures/ghibli-camera)
pub fn default_capture_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(PICTURES_SUBDIR)
}

/// Write a snapshot into `dir`, creating the directory if needed
///
/// The file is named after the snapshot. When that name is taken (an
/// earlier snapshot from the same day), `-1`, `-2`, ... is appended to the
/// stem instead of overwriting.
pub fn save_capture(image: &CapturedImage, dir: &Path) -> AppResult<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CaptureError::SaveFailed(format!("{}: {}", dir.display(), e)))?;

    let extension = image.format().extension();
    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            image.file_name()
        } else {
            format!("{}-{}.{}", image.suggested_filename(), suffix, extension)
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(image.bytes())
                    .map_err(|e| CaptureError::SaveFailed(format!("{}: {}", path.display(), e)))?;
                info!(path = %path.display(), size = image.bytes().len(), "Snapshot saved");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Snapshot name taken, trying next suffix");
                suffix += 1;
            }
            Err(e) => {
                return Err(CaptureError::SaveFailed(format!("{}: {}", path.display(), e)).into());
            }
        }
    }
}
