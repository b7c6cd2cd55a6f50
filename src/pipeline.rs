//! # Local Analysis Pipeline
//!
//! The offline analysis path: read the label with OCR, infer a profile from
//! the text, then attach the capture and its thumbnail. Persisting the result
//! is left to the caller.

use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::inference::TextProfileInferencer;
use crate::instance_manager::OcrEngineManager;
use crate::ocr::{extract_text_from_image, OcrResult, ProgressReporter};
use crate::ocr_config::OcrConfig;
use crate::profile::BeerProfile;
use crate::thumbnail::{create_thumbnail, to_data_url};

/// Output of one local analysis
#[derive(Debug, Clone)]
pub struct Analysis {
    pub profile: BeerProfile,
    pub ocr: OcrResult,
}

pub struct LocalAnalyzer {
    ocr_config: OcrConfig,
    engines: Arc<OcrEngineManager>,
    inferencer: TextProfileInferencer,
    thumbnail_width: u32,
}

impl LocalAnalyzer {
    pub fn new(ocr_config: OcrConfig, thumbnail_width: u32) -> Self {
        Self {
            ocr_config,
            engines: Arc::new(OcrEngineManager::new()),
            inferencer: TextProfileInferencer::new(),
            thumbnail_width,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.ocr.clone(), config.thumbnail_width)
    }

    /// Replace the inferencer, e.g. to pin identifiers and timestamps
    pub fn with_inferencer(mut self, inferencer: TextProfileInferencer) -> Self {
        self.inferencer = inferencer;
        self
    }

    /// Profile from already-recognized text
    pub fn profile_from_text(&self, text: &str) -> BeerProfile {
        self.inferencer.infer(text)
    }

    /// Attach the capture as a data URL plus a thumbnail.
    ///
    /// A thumbnail that cannot be produced is skipped with a warning; an
    /// unreadable capture is an error.
    pub fn attach_images(&self, profile: BeerProfile, image_bytes: &[u8]) -> AppResult<BeerProfile> {
        let image_data = to_data_url(image_bytes)?;
        let thumbnail = match create_thumbnail(image_bytes, self.thumbnail_width) {
            Ok(thumbnail) => Some(thumbnail),
            Err(e) => {
                warn!(error = %e, id = %profile.id, "Could not create thumbnail");
                None
            }
        };
        Ok(profile.with_images(Some(image_data), thumbnail))
    }

    /// OCR, inference and image attachment for one capture
    pub async fn analyze(
        &self,
        image_path: &Path,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> AppResult<Analysis> {
        let ocr = extract_text_from_image(
            image_path,
            &self.ocr_config,
            &self.engines,
            progress,
            cancel,
        )
        .await?;

        let profile = self.profile_from_text(&ocr.text);
        info!(
            id = %profile.id,
            style = %profile.style,
            ocr_confidence = ocr.confidence,
            "Inferred profile from label text"
        );

        let image_bytes = tokio::fs::read(image_path).await?;
        let profile = self
            .attach_images(profile, &image_bytes)
            .map_err(|e| match e {
                AppError::Image(msg) => AppError::Image(format!("{}: {}", image_path.display(), msg)),
                other => other,
            })?;

        Ok(Analysis { profile, ocr })
    }
}
