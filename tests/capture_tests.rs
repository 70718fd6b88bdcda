// SPDX-License-Identifier: MPL-2.0

//! Integration tests for snapshot export and saving

use chrono::{NaiveDate, Utc};
use ghibli_camera::config::{ExportSettings, PhotoOutputFormat, PhotoQuality};
use ghibli_camera::errors::CaptureError;
use ghibli_camera::pipelines::photo::{EncodingFormat, suggested_filename};
use ghibli_camera::{
    AppError, CaptureExporter, FilterMode, PipelineConfig, PipelineDriver, StillImageSource,
    TickOutcome, storage,
};
use image::{ImageFormat, Rgba, RgbaImage};
use std::path::PathBuf;

/// Fresh scratch directory under the system temp dir
fn scratch_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("ghibli-camera-{}-{}-{}", name, std::process::id(), nanos))
}

fn presented_driver(mode: FilterMode) -> PipelineDriver {
    let mut driver = PipelineDriver::new(PipelineConfig {
        initial_mode: mode,
        ..Default::default()
    });
    driver
        .attach_source(Box::new(StillImageSource::from_image(
            "frame",
            RgbaImage::from_fn(12, 8, |x, y| Rgba([(x * 20) as u8, (y * 30) as u8, 77, 255])),
        )))
        .unwrap();
    assert!(matches!(driver.tick(), TickOutcome::Presented(_)));
    driver
}

#[test]
fn test_capture_unavailable_before_presenting() {
    let err = CaptureExporter::new().capture_current_frame(None).unwrap_err();
    assert_eq!(err, AppError::Capture(CaptureError::Unavailable));
}

#[test]
fn test_filename_uses_today_utc() {
    let driver = presented_driver(FilterMode::Active);
    let image = driver.capture_current_frame(&CaptureExporter::new()).unwrap();

    let today = Utc::now().date_naive();
    // Tolerate a midnight rollover between the capture and this check
    let yesterday = today.pred_opt().unwrap();
    assert!(
        image.suggested_filename() == suggested_filename(today)
            || image.suggested_filename() == suggested_filename(yesterday)
    );
    assert!(image.suggested_filename().starts_with("ghibli-moment-"));
    assert_eq!(image.suggested_filename().len(), "ghibli-moment-YYYY-MM-DD".len());
}

#[test]
fn test_png_capture_matches_presented_surface() {
    let driver = presented_driver(FilterMode::Active);
    let presented = driver.presented_surface().cloned().unwrap();
    let image = driver.capture_current_frame(&CaptureExporter::new()).unwrap();

    assert_eq!(image.format(), EncodingFormat::Png);
    let decoded = image::load_from_memory_with_format(image.bytes(), ImageFormat::Png)
        .unwrap()
        .to_rgba8();
    assert_eq!(decoded, presented);

    // Capture is read-only with respect to the pipeline
    assert_eq!(driver.presented_surface(), Some(&presented));
}

#[test]
fn test_jpeg_capture() {
    let driver = presented_driver(FilterMode::Bypassed);
    let exporter = CaptureExporter::from_settings(&ExportSettings {
        format: PhotoOutputFormat::Jpeg,
        quality: PhotoQuality::Medium,
    });
    let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
    let image = exporter
        .capture_at(driver.presented_surface().unwrap(), date)
        .unwrap();
    assert_eq!(image.file_name(), "ghibli-moment-2025-12-31.jpg");
    let decoded = image::load_from_memory(image.bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (12, 8));
}

#[test]
fn test_save_never_overwrites() {
    let dir = scratch_dir("save");
    let surface = RgbaImage::from_pixel(2, 2, Rgba([5, 6, 7, 255]));
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let image = CaptureExporter::new().capture_at(&surface, date).unwrap();

    let first = storage::save_capture(&image, &dir).unwrap();
    let second = storage::save_capture(&image, &dir).unwrap();
    let third = storage::save_capture(&image, &dir).unwrap();

    assert_eq!(first, dir.join("ghibli-moment-2024-06-01.png"));
    assert_eq!(second, dir.join("ghibli-moment-2024-06-01-1.png"));
    assert_eq!(third, dir.join("ghibli-moment-2024-06-01-2.png"));
    assert_eq!(std::fs::read(&first).unwrap(), image.bytes());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_save_into_unwritable_path_fails() {
    let dir = scratch_dir("blocked");
    std::fs::create_dir_all(dir.parent().unwrap()).unwrap();
    // A regular file where the directory should be
    std::fs::write(&dir, b"not a directory").unwrap();

    let surface = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
    let image = CaptureExporter::new()
        .capture_at(&surface, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .unwrap();
    let err = storage::save_capture(&image, &dir).unwrap_err();
    assert!(matches!(err, AppError::Capture(CaptureError::SaveFailed(_))));

    std::fs::remove_file(&dir).unwrap();
}
