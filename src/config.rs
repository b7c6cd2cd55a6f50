//! # Unified Application Configuration
//!
//! Collects store, OCR, thumbnail and logging settings into one structure
//! loaded from environment variables (a `.env` file is read by the binary
//! through `dotenvy`).

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use crate::ocr_config::{OcrConfig, PageSegMode};
use crate::store::StoreConfig;
use crate::thumbnail::DEFAULT_THUMBNAIL_WIDTH;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Complete runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub ocr: OcrConfig,
    pub observability: ObservabilityConfig,
    /// Width of stored thumbnails in pixels
    pub thumbnail_width: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            ocr: OcrConfig::default(),
            observability: ObservabilityConfig::default(),
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> AppResult<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> AppResult<bool> {
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(AppError::Config(format!("{} must be a boolean, got {}", key, v))),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        config.observability = ObservabilityConfig::from_env();
        Ok(config)
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup("BEERSNAP_DATA_DIR") {
            config.store.data_dir = PathBuf::from(dir);
        }
        config.store.history_limit =
            parse_var(&lookup, "BEERSNAP_HISTORY_LIMIT", config.store.history_limit)?;
        config.store.strip_images =
            parse_bool(&lookup, "BEERSNAP_STRIP_IMAGES", config.store.strip_images)?;
        config.thumbnail_width =
            parse_var(&lookup, "BEERSNAP_THUMBNAIL_WIDTH", config.thumbnail_width)?;

        if let Some(languages) = lookup("OCR_LANGUAGES") {
            config.ocr.languages = languages;
        }
        config.ocr.tessdata_path = lookup("OCR_TESSDATA_PATH");
        if let Some(psm) = lookup("OCR_PAGE_SEG_MODE") {
            config.ocr.psm_mode = PageSegMode::parse(&psm).ok_or_else(|| {
                AppError::Config(format!("OCR_PAGE_SEG_MODE has an invalid value: {}", psm))
            })?;
        }
        config.ocr.recovery.operation_timeout_secs = parse_var(
            &lookup,
            "OCR_TIMEOUT_SECS",
            config.ocr.recovery.operation_timeout_secs,
        )?;
        config.ocr.recovery.max_retries =
            parse_var(&lookup, "OCR_MAX_RETRIES", config.ocr.recovery.max_retries)?;
        config.ocr.memory_limit_mb =
            parse_var(&lookup, "OCR_MEMORY_LIMIT_MB", config.ocr.memory_limit_mb)?;

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.store.validate()?;
        self.ocr.validate()?;
        self.observability.validate().map_err(AppError::Config)?;
        if self.thumbnail_width == 0 {
            return Err(AppError::Config(
                "thumbnail_width must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: data_dir={}, history_limit={}, strip_images={}, ocr_languages={}, ocr_timeout_secs={}, thumbnail_width={}",
            self.store.data_dir.display(),
            self.store.history_limit,
            self.store.strip_images,
            self.ocr.languages,
            self.ocr.recovery.operation_timeout_secs,
            self.thumbnail_width
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.store.history_limit, 20);
        assert!(config.store.strip_images);
        assert_eq!(config.thumbnail_width, 300);
        assert_eq!(config.ocr.languages, "eng");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("BEERSNAP_DATA_DIR", "/tmp/beers"),
            ("BEERSNAP_HISTORY_LIMIT", "5"),
            ("BEERSNAP_STRIP_IMAGES", "no"),
            ("OCR_LANGUAGES", "eng+deu"),
            ("OCR_PAGE_SEG_MODE", "sparse"),
            ("OCR_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();

        assert_eq!(config.store.data_dir, PathBuf::from("/tmp/beers"));
        assert_eq!(config.store.history_limit, 5);
        assert!(!config.store.strip_images);
        assert_eq!(config.ocr.languages, "eng+deu");
        assert_eq!(config.ocr.psm_mode, PageSegMode::SparseText);
        assert_eq!(config.ocr.recovery.operation_timeout_secs, 15);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = AppConfig::from_lookup(lookup_from(&[("BEERSNAP_HISTORY_LIMIT", "lots")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = AppConfig::from_lookup(lookup_from(&[("BEERSNAP_STRIP_IMAGES", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_zero_history_limit_fails_validation() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("BEERSNAP_HISTORY_LIMIT", "0")])).unwrap();
        assert!(config.validate().is_err());
    }
}
