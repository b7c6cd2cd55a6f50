//! Observability module for logging setup and metric recording.
//!
//! This module provides:
//! - Structured logging with configurable levels (pretty or JSON)
//! - Metric helpers for inference, OCR and store operations
//! - Spans used around OCR work
//! - An OCR engine availability check
//!
//! Metrics go through the `metrics` facade; without an installed recorder
//! they are no-ops.

use anyhow::Result;
use tracing_subscriber::prelude::*;

use crate::instance_manager::OcrEngineManager;
use crate::observability_config::{LogFormat, ObservabilityConfig};
use crate::ocr_config::OcrConfig;

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("beer_snap={}", config.log_level).parse()?)
        .add_directive(format!("beersnap={}", config.log_level).parse()?);

    // Logs go to stderr so stdout stays clean for JSON output
    match config.effective_format() {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Create a span for OCR operations
pub fn ocr_span(operation: &str) -> tracing::Span {
    tracing::info_span!("ocr_operation", operation = operation, component = "ocr")
}

/// Create a span for profile store operations
pub fn store_span(operation: &str) -> tracing::Span {
    tracing::info_span!("store_operation", operation = operation, component = "store")
}

/// Record one text inference
pub fn record_inference(style: &str) {
    let style = style.to_string();
    metrics::counter!("beersnap_inferences_total", "style" => style).increment(1);
}

/// Record OCR operation metrics
pub fn record_ocr_metrics(success: bool, duration: std::time::Duration, image_size: u64) {
    metrics::counter!("beersnap_ocr_requests_total", "status" => if success { "success" } else { "failure" }).increment(1);
    metrics::histogram!("beersnap_ocr_duration_seconds").record(duration.as_secs_f64());
    #[allow(clippy::cast_precision_loss)]
    metrics::histogram!("beersnap_ocr_image_size_bytes").record(image_size as f64);
}

/// Record a history save and the list length after it
pub fn record_history_save(history_len: usize) {
    metrics::counter!("beersnap_history_saves_total").increment(1);
    #[allow(clippy::cast_precision_loss)]
    metrics::gauge!("beersnap_history_entries").set(history_len as f64);
}

/// Check OCR engine availability by building an engine the way analysis does
///
/// Honours the configured tessdata path and page segmentation mode.
pub fn check_ocr_health(config: &OcrConfig) -> Result<()> {
    match OcrEngineManager::new().get_engine(config) {
        Ok(_) => {
            tracing::debug!(languages = %config.languages, "OCR health check passed");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("OCR health check failed: {}", e)),
    }
}
