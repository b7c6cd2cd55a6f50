//! # OCR Processing Module
//!
//! Reads the text off a photographed beer label or menu with Tesseract. The
//! result feeds [`crate::inference::TextProfileInferencer`].
//!
//! ## Features
//!
//! - Format detection by magic bytes and per-format size limits
//! - Fractional progress reporting through a callback
//! - Cancellation through a [`CancellationToken`]
//! - Per-attempt timeout with exponential backoff between attempts
//!
//! ## Dependencies
//!
//! - `leptess`: Rust bindings for Tesseract OCR and Leptonica
//! - `image`: Image format detection
//! - `tokio-util`: Cancellation tokens

use anyhow::Result;
use parking_lot::Mutex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use crate::errors::error_logging;
use crate::instance_manager::OcrEngineManager;
use crate::observability;
pub use crate::ocr_config::{OcrConfig, RecoveryConfig};
pub use crate::ocr_errors::OcrError;

/// Progress marks reported while a capture is processed
pub mod stages {
    pub const VALIDATED: f32 = 0.05;
    pub const ENGINE_READY: f32 = 0.2;
    pub const IMAGE_LOADED: f32 = 0.4;
    pub const RECOGNIZED: f32 = 0.9;
    pub const DONE: f32 = 1.0;
}

/// Text recognized on a capture
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OcrResult {
    pub text: String,
    /// Tesseract mean word confidence, 0 to 100
    pub confidence: f32,
}

/// Forwards progress fractions to an optional callback.
///
/// Values are clamped to `0.0..=1.0` and never go backwards, so a retry does
/// not make a progress bar jump back.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    callback: Option<Arc<dyn Fn(f32) + Send + Sync>>,
    last: Arc<Mutex<f32>>,
}

impl ProgressReporter {
    pub fn new(callback: impl Fn(f32) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
            last: Arc::new(Mutex::new(0.0)),
        }
    }

    /// Reporter that only tracks the last value
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn report(&self, fraction: f32) {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        {
            let mut last = self.last.lock();
            if fraction < *last {
                return;
            }
            *last = fraction;
        }
        if let Some(callback) = &self.callback {
            callback(fraction);
        }
    }

    pub fn last(&self) -> f32 {
        *self.last.lock()
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("has_callback", &self.callback.is_some())
            .field("last", &self.last())
            .finish()
    }
}

/// Validate image file path and basic properties
pub fn validate_image_path(image_path: &Path, config: &OcrConfig) -> Result<()> {
    if !image_path.exists() {
        return Err(anyhow::anyhow!(
            "Image path validation failed: file does not exist ({})",
            image_path.display()
        ));
    }
    if !image_path.is_file() {
        return Err(anyhow::anyhow!(
            "Image path validation failed: not a file ({})",
            image_path.display()
        ));
    }

    let size = std::fs::metadata(image_path)?.len();
    if size == 0 {
        return Err(anyhow::anyhow!("Image file is empty: {}", image_path.display()));
    }
    if size > config.max_file_size {
        return Err(anyhow::anyhow!(
            "Image file too large: {} bytes (maximum allowed: {} bytes)",
            size,
            config.max_file_size
        ));
    }
    Ok(())
}

/// Detect the image format from the file header
pub fn detect_image_format(image_path: &Path, config: &OcrConfig) -> Result<image::ImageFormat> {
    let mut file = File::open(image_path).map_err(|e| {
        anyhow::anyhow!("Cannot open image file: {} - {}", image_path.display(), e)
    })?;

    let mut buffer = vec![0u8; config.buffer_size];
    let read = file.read(&mut buffer)?;
    if read < config.min_format_bytes {
        return Err(anyhow::anyhow!(
            "Not enough bytes to detect image format ({} < {})",
            read,
            config.min_format_bytes
        ));
    }

    image::guess_format(&buffer[..read])
        .map_err(|e| anyhow::anyhow!("Unrecognized image format: {}", e))
}

/// Full pre-flight check: path, format, per-format size, memory estimate
pub fn validate_image_with_format_limits(
    image_path: &Path,
    config: &OcrConfig,
) -> Result<image::ImageFormat> {
    validate_image_path(image_path, config)?;

    let format = detect_image_format(image_path, config)?;
    let limit = config
        .format_limits
        .limit_for(format)
        .ok_or_else(|| anyhow::anyhow!("Unsupported image format for OCR: {:?}", format))?;

    let size = std::fs::metadata(image_path)?.len();
    if size > limit {
        return Err(anyhow::anyhow!(
            "{:?} image too large: {} bytes (maximum allowed: {} bytes)",
            format,
            size,
            limit
        ));
    }

    let estimated_memory_mb = estimate_memory_usage(size, format);
    if estimated_memory_mb > config.memory_limit_mb {
        return Err(anyhow::anyhow!(
            "Estimated memory usage too high: {:.1}MB (maximum allowed: {}MB)",
            estimated_memory_mb,
            config.memory_limit_mb
        ));
    }

    debug!(?format, size, estimated_memory_mb, "Image passed validation");
    Ok(format)
}

/// Estimate decode memory in megabytes from file size and format
pub fn estimate_memory_usage(file_size: u64, format: image::ImageFormat) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let file_size_mb = file_size as f64 / (1024.0 * 1024.0);

    let memory_factor = match format {
        image::ImageFormat::Png => 3.0,
        image::ImageFormat::Jpeg => 2.5,
        image::ImageFormat::WebP => 2.5,
        image::ImageFormat::Bmp => 1.2,
        image::ImageFormat::Tiff => 4.0,
        _ => 3.0,
    };

    file_size_mb * memory_factor
}

/// Exponential backoff with up to 25% random jitter
///
/// `attempt` is 1-based: the delay before the first retry uses attempt 1.
pub fn calculate_retry_delay(attempt: u32, recovery: &RecoveryConfig) -> u64 {
    let exponent = attempt.saturating_sub(1).min(31);
    let delay = recovery
        .base_retry_delay_ms
        .saturating_mul(1u64 << exponent)
        .min(recovery.max_retry_delay_ms);

    let jitter_range = delay / 4;
    if jitter_range == 0 {
        return delay;
    }
    delay + rand::random::<u64>() % jitter_range
}

/// Trim every line and drop blank ones
pub fn clean_ocr_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Extract text from a label photo
///
/// Validates the file, then runs Tesseract on the blocking pool. Each attempt
/// is bounded by `recovery.operation_timeout_secs`; retryable failures are
/// retried up to `recovery.max_retries` times with backoff.
///
/// Cancelling `cancel` returns [`OcrError::Cancelled`] promptly. A Tesseract
/// call already in flight finishes on its worker thread and its result is
/// discarded; no progress is reported after cancellation.
pub async fn extract_text_from_image(
    image_path: &Path,
    config: &OcrConfig,
    engines: &Arc<OcrEngineManager>,
    progress: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<OcrResult, OcrError> {
    run_extraction(image_path, config, engines, progress, cancel)
        .instrument(observability::ocr_span("extract_text_from_image"))
        .await
}

async fn run_extraction(
    image_path: &Path,
    config: &OcrConfig,
    engines: &Arc<OcrEngineManager>,
    progress: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<OcrResult, OcrError> {
    let start_time = Instant::now();

    if cancel.is_cancelled() {
        return Err(OcrError::Cancelled);
    }

    validate_image_with_format_limits(image_path, config)
        .map_err(|e| OcrError::Validation(e.to_string()))?;
    progress.report(stages::VALIDATED);

    let image_size = std::fs::metadata(image_path).map(|m| m.len()).unwrap_or(0);
    info!("Starting OCR text extraction from image: {}", image_path.display());

    let max_attempts = config.recovery.max_retries + 1;
    let mut attempt = 0;

    loop {
        attempt += 1;

        match perform_ocr_extraction(image_path, config, engines, progress, cancel).await {
            Ok((result, ocr_duration)) => {
                observability::record_ocr_metrics(true, start_time.elapsed(), image_size);
                progress.report(stages::DONE);
                info!(
                    attempt,
                    ocr_ms = ocr_duration.as_millis() as u64,
                    chars = result.text.len(),
                    confidence = result.confidence,
                    "OCR extraction completed"
                );
                return Ok(result);
            }
            Err(OcrError::Cancelled) => {
                info!("OCR extraction cancelled for image: {}", image_path.display());
                return Err(OcrError::Cancelled);
            }
            Err(err) => {
                if attempt >= max_attempts || !err.is_retryable() {
                    let total_duration = start_time.elapsed();
                    observability::record_ocr_metrics(false, total_duration, image_size);
                    error_logging::log_ocr_error(
                        &err,
                        "ocr_extraction",
                        image_path.to_str(),
                        Some(image_size),
                        Some(total_duration),
                    );
                    return Err(err);
                }

                let delay_ms = calculate_retry_delay(attempt, &config.recovery);
                warn!("OCR extraction attempt {attempt} failed: {err}. Retrying in {delay_ms}ms");

                tokio::select! {
                    _ = cancel.cancelled() => return Err(OcrError::Cancelled),
                    _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                }
            }
        }
    }
}

/// One OCR attempt on the blocking pool, bounded by the configured timeout
async fn perform_ocr_extraction(
    image_path: &Path,
    config: &OcrConfig,
    engines: &Arc<OcrEngineManager>,
    progress: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<(OcrResult, Duration), OcrError> {
    let ocr_start_time = Instant::now();
    let timeout_duration = Duration::from_secs(config.recovery.operation_timeout_secs);

    // Cancelled on timeout too, which silences the worker's progress reports
    let attempt_token = cancel.child_token();

    let worker = {
        let engines = Arc::clone(engines);
        let config = config.clone();
        let path = image_path.to_path_buf();
        let progress = progress.clone();
        let token = attempt_token.clone();
        let report = move |fraction: f32| {
            if !token.is_cancelled() {
                progress.report(fraction);
            }
        };

        tokio::task::spawn_blocking(move || -> Result<(String, i32), OcrError> {
            let engine = engines
                .get_engine(&config)
                .map_err(|e| OcrError::Initialization(e.to_string()))?;
            report(stages::ENGINE_READY);

            let mut tess = engine.lock();
            tess.set_image(&path).map_err(|e| {
                OcrError::ImageLoad(format!("Failed to load image for OCR: {e}"))
            })?;
            report(stages::IMAGE_LOADED);

            let text = tess.get_utf8_text().map_err(|e| {
                OcrError::Extraction(format!("Failed to extract text from image: {e}"))
            })?;
            let confidence = tess.mean_text_conf();
            report(stages::RECOGNIZED);

            Ok((text, confidence))
        })
    };

    let outcome = tokio::select! {
        _ = cancel.cancelled() => {
            attempt_token.cancel();
            return Err(OcrError::Cancelled);
        }
        outcome = tokio::time::timeout(timeout_duration, worker) => outcome,
    };

    let ocr_duration = ocr_start_time.elapsed();
    match outcome {
        Ok(Ok(Ok((raw_text, confidence)))) => {
            let text = clean_ocr_text(&raw_text);
            #[allow(clippy::cast_precision_loss)]
            let confidence = confidence.clamp(0, 100) as f32;
            Ok((OcrResult { text, confidence }, ocr_duration))
        }
        Ok(Ok(Err(e))) => {
            warn!("OCR processing failed after {}ms: {e}", ocr_duration.as_millis());
            Err(e)
        }
        Ok(Err(join_error)) => Err(OcrError::Extraction(format!(
            "OCR worker terminated unexpectedly: {join_error}"
        ))),
        Err(_) => {
            attempt_token.cancel();
            warn!(
                "OCR processing timed out after {}ms (limit: {}s)",
                ocr_duration.as_millis(),
                config.recovery.operation_timeout_secs
            );
            Err(OcrError::Timeout(format!(
                "OCR operation timed out after {} seconds",
                config.recovery.operation_timeout_secs
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_ocr_text() {
        let raw = "  Hazy Days  \n\n   \nNorth Brewing\n";
        assert_eq!(clean_ocr_text(raw), "Hazy Days\nNorth Brewing");
        assert_eq!(clean_ocr_text(""), "");
    }

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new(move |p| sink.lock().push(p));

        reporter.report(0.2);
        reporter.report(0.1);
        reporter.report(1.5);
        reporter.report(f32::NAN);

        assert_eq!(*seen.lock(), vec![0.2, 1.0]);
        assert_eq!(reporter.last(), 1.0);
    }

    #[test]
    fn test_retry_delay_without_jitter_room() {
        let recovery = RecoveryConfig {
            base_retry_delay_ms: 2,
            max_retry_delay_ms: 3,
            ..RecoveryConfig::default()
        };
        assert_eq!(calculate_retry_delay(1, &recovery), 2);
        assert_eq!(calculate_retry_delay(5, &recovery), 3);
    }
}
