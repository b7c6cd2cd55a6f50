use beer_snap::instance_manager::OcrEngineManager;
use beer_snap::observability::check_ocr_health;
use beer_snap::ocr::{
    calculate_retry_delay, clean_ocr_text, estimate_memory_usage, extract_text_from_image,
    stages, validate_image_with_format_limits, ProgressReporter,
};
use beer_snap::ocr_config::{FormatSizeLimits, OcrConfig, PageSegMode, RecoveryConfig};
use beer_snap::ocr_errors::OcrError;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::{Cursor, Write};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod tests {
    use super::*;

    fn png_file(width: u32, height: u32) -> NamedTempFile {
        let image = RgbImage::from_pixel(width, height, Rgb([240, 200, 40]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        file
    }

    fn engines() -> Arc<OcrEngineManager> {
        Arc::new(OcrEngineManager::new())
    }

    #[test]
    fn test_ocr_config_defaults() {
        let config = OcrConfig::default();

        assert_eq!(config.languages, "eng");
        assert!(config.tessdata_path.is_none());
        assert!(config.min_format_bytes <= config.buffer_size);
        assert_eq!(config.recovery.max_retries, 1);
        assert!(config.recovery.operation_timeout_secs > 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_page_seg_mode_parse() {
        assert_eq!(PageSegMode::parse("sparse"), Some(PageSegMode::SparseText));
        assert_eq!(PageSegMode::parse("auto"), Some(PageSegMode::Auto));
        assert_eq!(PageSegMode::parse("diagonal"), None);
    }

    #[test]
    fn test_format_limits_lookup() {
        let limits = FormatSizeLimits::default();
        assert!(limits.limit_for(ImageFormat::Png).is_some());
        assert!(limits.limit_for(ImageFormat::Jpeg).is_some());
        assert!(limits.limit_for(ImageFormat::Gif).is_none());
    }

    #[test]
    fn test_valid_png_passes_validation() {
        let file = png_file(32, 16);
        let format = validate_image_with_format_limits(file.path(), &OcrConfig::default()).unwrap();
        assert_eq!(format, ImageFormat::Png);
    }

    #[test]
    fn test_validation_rejects_bad_inputs() {
        let config = OcrConfig::default();

        let missing = std::path::Path::new("/definitely/not/here.png");
        assert!(validate_image_with_format_limits(missing, &config).is_err());

        let empty = NamedTempFile::new().unwrap();
        let err = validate_image_with_format_limits(empty.path(), &config).unwrap_err();
        assert!(err.to_string().contains("empty"));

        let mut text = NamedTempFile::new().unwrap();
        text.write_all(b"Hazy IPA 6.5% from a text file").unwrap();
        assert!(validate_image_with_format_limits(text.path(), &config).is_err());
    }

    #[test]
    fn test_validation_enforces_size_limits() {
        let file = png_file(64, 64);
        let config = OcrConfig {
            max_file_size: 10,
            ..OcrConfig::default()
        };
        let err = validate_image_with_format_limits(file.path(), &config).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_memory_estimate_scales_with_format() {
        let mb = 1024 * 1024;
        assert_eq!(estimate_memory_usage(mb, ImageFormat::Png), 3.0);
        assert_eq!(estimate_memory_usage(mb, ImageFormat::Tiff), 4.0);
        assert!(estimate_memory_usage(mb, ImageFormat::Bmp) < estimate_memory_usage(mb, ImageFormat::Jpeg));
    }

    #[test]
    fn test_retry_delay_grows_and_is_capped() {
        let recovery = RecoveryConfig::default();

        for _ in 0..20 {
            let first = calculate_retry_delay(1, &recovery);
            assert!(first >= recovery.base_retry_delay_ms);
            assert!(first < recovery.base_retry_delay_ms + recovery.base_retry_delay_ms / 4);

            let second = calculate_retry_delay(2, &recovery);
            assert!(second >= recovery.base_retry_delay_ms * 2);

            let late = calculate_retry_delay(30, &recovery);
            assert!(late >= recovery.max_retry_delay_ms);
            assert!(late < recovery.max_retry_delay_ms + recovery.max_retry_delay_ms / 4);
        }
    }

    #[test]
    fn test_clean_ocr_text_drops_blank_lines() {
        assert_eq!(
            clean_ocr_text("\n  Night Owl Porter \n\t\n  5.8% \n"),
            "Night Owl Porter\n5.8%"
        );
    }

    #[test]
    fn test_progress_reporter_never_goes_backwards() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = ProgressReporter::new(move |p| sink.lock().push(p));

        progress.report(stages::VALIDATED);
        progress.report(stages::IMAGE_LOADED);
        progress.report(stages::ENGINE_READY);
        progress.report(stages::DONE);

        assert_eq!(
            *seen.lock(),
            vec![stages::VALIDATED, stages::IMAGE_LOADED, stages::DONE]
        );
    }

    #[test]
    fn test_silent_reporter_tracks_last_value() {
        let progress = ProgressReporter::silent();
        assert_eq!(progress.last(), 0.0);
        progress.report(0.4);
        assert_eq!(progress.last(), 0.4);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_returns_cancelled() {
        let file = png_file(8, 8);
        let progress = ProgressReporter::silent();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = extract_text_from_image(
            file.path(),
            &OcrConfig::default(),
            &engines(),
            &progress,
            &cancel,
        )
        .await;

        assert_eq!(result, Err(OcrError::Cancelled));
        assert_eq!(progress.last(), 0.0);
    }

    #[tokio::test]
    async fn test_missing_file_is_a_validation_error() {
        let progress = ProgressReporter::silent();
        let result = extract_text_from_image(
            std::path::Path::new("/no/such/label.jpg"),
            &OcrConfig::default(),
            &engines(),
            &progress,
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(OcrError::Validation(_))));
        assert_eq!(progress.last(), 0.0);
    }

    #[test]
    fn test_error_retryability() {
        assert!(OcrError::Extraction("x".into()).is_retryable());
        assert!(OcrError::Timeout("x".into()).is_retryable());
        assert!(!OcrError::Validation("x".into()).is_retryable());
        assert!(!OcrError::Initialization("x".into()).is_retryable());
        assert!(!OcrError::Cancelled.is_retryable());
    }

    #[test]
    fn test_engine_manager_starts_empty() {
        let manager = OcrEngineManager::new();
        assert_eq!(manager.engine_count(), 0);
    }

    #[test]
    fn test_failed_engine_is_not_cached() {
        let manager = OcrEngineManager::new();
        let config = OcrConfig {
            tessdata_path: Some("/nonexistent/beersnap/tessdata".to_string()),
            ..OcrConfig::default()
        };
        assert!(manager.get_engine(&config).is_err());
        assert_eq!(manager.engine_count(), 0);
    }

    #[test]
    fn test_health_check_uses_configured_tessdata_path() {
        let config = OcrConfig {
            tessdata_path: Some("/nonexistent/beersnap/tessdata".to_string()),
            ..OcrConfig::default()
        };
        let err = check_ocr_health(&config).unwrap_err();
        assert!(err.to_string().contains("OCR health check failed"));
    }
}
