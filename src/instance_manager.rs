//! # OCR Engine Manager Module
//!
//! Reuses Tesseract instances between captures. Creating an engine loads the
//! language data, which costs far more than recognizing a single label.

use leptess::LepTess;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::ocr_config::OcrConfig;

/// Shared, lockable Tesseract engine
pub type SharedEngine = Arc<Mutex<LepTess>>;

/// Thread-safe pool of Tesseract engines keyed by configuration.
///
/// Engines are created on first request and kept until the manager is
/// dropped. Each engine is behind its own mutex, so two captures using the
/// same configuration run one after the other while different configurations
/// run in parallel.
#[derive(Default)]
pub struct OcrEngineManager {
    engines: Mutex<HashMap<String, SharedEngine>>,
}

impl OcrEngineManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool key for a configuration
    pub fn engine_key(config: &OcrConfig) -> String {
        format!(
            "{}:{}:{}",
            config.languages,
            config.psm_mode.as_str(),
            config.tessdata_path.as_deref().unwrap_or("default")
        )
    }

    /// Get or create an engine for the given configuration
    ///
    /// # Errors
    ///
    /// Returns error if Tesseract cannot load the requested languages or
    /// rejects the page segmentation mode.
    pub fn get_engine(&self, config: &OcrConfig) -> anyhow::Result<SharedEngine> {
        let key = Self::engine_key(config);

        if let Some(engine) = self.engines.lock().get(&key) {
            return Ok(Arc::clone(engine));
        }

        info!(
            languages = %config.languages,
            psm = config.psm_mode.as_str(),
            "Creating new OCR engine"
        );

        let mut tess = LepTess::new(config.tessdata_path.as_deref(), &config.languages)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Tesseract OCR instance: {}", e))?;

        tess.set_variable(leptess::Variable::TesseditPagesegMode, config.psm_mode.as_str())
            .map_err(|e| anyhow::anyhow!("Failed to set PSM mode: {}", e))?;

        let engine = Arc::new(Mutex::new(tess));

        // Another caller may have raced us here; keep whichever landed first
        let mut engines = self.engines.lock();
        let stored = engines.entry(key).or_insert_with(|| Arc::clone(&engine));
        Ok(Arc::clone(stored))
    }

    /// Number of cached engines
    pub fn engine_count(&self) -> usize {
        self.engines.lock().len()
    }
}
