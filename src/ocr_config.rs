//! # OCR Configuration Module
//!
//! Configuration for reading text off beer labels and menus: languages,
//! page segmentation, format limits, timeout and retry settings.

use crate::errors::{AppError, AppResult};

// Constants for OCR configuration
pub const DEFAULT_LANGUAGES: &str = "eng";
pub const FORMAT_DETECTION_BUFFER_SIZE: usize = 32;
pub const MIN_FORMAT_BYTES: usize = 8;
pub const MAX_FILE_SIZE: u64 = 15 * 1024 * 1024; // phone photos run large
pub const DEFAULT_MEMORY_LIMIT_MB: f64 = 256.0;

/// Recovery configuration for error handling
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single OCR attempt in seconds
    pub operation_timeout_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_retry_delay_ms: 500,
            max_retry_delay_ms: 5000,
            operation_timeout_secs: 60,
        }
    }
}

impl RecoveryConfig {
    /// Validate recovery configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.base_retry_delay_ms == 0 {
            return Err(AppError::Config(
                "base_retry_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_retry_delay_ms < self.base_retry_delay_ms {
            return Err(AppError::Config(format!(
                "max_retry_delay_ms ({}) must be >= base_retry_delay_ms ({})",
                self.max_retry_delay_ms, self.base_retry_delay_ms
            )));
        }
        if self.operation_timeout_secs == 0 {
            return Err(AppError::Config(
                "operation_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Format-specific file size limits for different image formats
#[derive(Debug, Clone)]
pub struct FormatSizeLimits {
    pub png_max: u64,
    pub jpeg_max: u64,
    pub webp_max: u64,
    pub bmp_max: u64,
    pub tiff_max: u64,
}

impl Default for FormatSizeLimits {
    fn default() -> Self {
        Self {
            png_max: 20 * 1024 * 1024,
            jpeg_max: 15 * 1024 * 1024,
            webp_max: 15 * 1024 * 1024,
            bmp_max: 10 * 1024 * 1024,
            tiff_max: 25 * 1024 * 1024,
        }
    }
}

impl FormatSizeLimits {
    /// Limit for a detected format, `None` when OCR does not accept it
    pub fn limit_for(&self, format: image::ImageFormat) -> Option<u64> {
        match format {
            image::ImageFormat::Png => Some(self.png_max),
            image::ImageFormat::Jpeg => Some(self.jpeg_max),
            image::ImageFormat::WebP => Some(self.webp_max),
            image::ImageFormat::Bmp => Some(self.bmp_max),
            image::ImageFormat::Tiff => Some(self.tiff_max),
            _ => None,
        }
    }

    /// Validate format size limits
    pub fn validate(&self) -> AppResult<()> {
        let limits = [
            ("png_max", self.png_max),
            ("jpeg_max", self.jpeg_max),
            ("webp_max", self.webp_max),
            ("bmp_max", self.bmp_max),
            ("tiff_max", self.tiff_max),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(AppError::Config(format!("{} must be greater than 0", name)));
            }
        }
        Ok(())
    }
}

/// Page Segmentation Mode for Tesseract OCR.
///
/// Only the modes that make sense for labels and menus are exposed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageSegMode {
    /// Fully automatic page segmentation
    #[default]
    Auto,
    /// Assume a single column of text (menus)
    SingleColumn,
    /// Assume a single uniform block of text
    SingleBlock,
    /// Find as much text as possible in no particular order (labels)
    SparseText,
}

impl PageSegMode {
    /// Convert PSM mode to string value for Tesseract
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSegMode::Auto => "3",
            PageSegMode::SingleColumn => "4",
            PageSegMode::SingleBlock => "6",
            PageSegMode::SparseText => "11",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "auto" | "3" => Some(PageSegMode::Auto),
            "column" | "4" => Some(PageSegMode::SingleColumn),
            "block" | "6" => Some(PageSegMode::SingleBlock),
            "sparse" | "11" => Some(PageSegMode::SparseText),
            _ => None,
        }
    }
}

/// Configuration structure for OCR processing
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// OCR language codes (e.g., "eng", "eng+deu")
    pub languages: String,
    /// Optional tessdata directory; Tesseract's default when `None`
    pub tessdata_path: Option<String>,
    /// Buffer size for format detection in bytes
    pub buffer_size: usize,
    /// Minimum bytes required for format detection
    pub min_format_bytes: usize,
    /// Maximum allowed file size in bytes (general limit)
    pub max_file_size: u64,
    /// Format-specific size limits
    pub format_limits: FormatSizeLimits,
    /// Estimated decode memory ceiling in megabytes
    pub memory_limit_mb: f64,
    /// Recovery and error handling configuration
    pub recovery: RecoveryConfig,
    /// Default page segmentation mode for OCR
    pub psm_mode: PageSegMode,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.to_string(),
            tessdata_path: None,
            buffer_size: FORMAT_DETECTION_BUFFER_SIZE,
            min_format_bytes: MIN_FORMAT_BYTES,
            max_file_size: MAX_FILE_SIZE,
            format_limits: FormatSizeLimits::default(),
            memory_limit_mb: DEFAULT_MEMORY_LIMIT_MB,
            recovery: RecoveryConfig::default(),
            psm_mode: PageSegMode::default(),
        }
    }
}

impl OcrConfig {
    /// Validate OCR configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.languages.trim().is_empty() {
            return Err(AppError::Config("languages cannot be empty".to_string()));
        }
        if self.buffer_size == 0 {
            return Err(AppError::Config(
                "buffer_size must be greater than 0".to_string(),
            ));
        }
        if self.min_format_bytes == 0 {
            return Err(AppError::Config(
                "min_format_bytes must be greater than 0".to_string(),
            ));
        }
        if self.min_format_bytes > self.buffer_size {
            return Err(AppError::Config(format!(
                "min_format_bytes ({}) cannot exceed buffer_size ({})",
                self.min_format_bytes, self.buffer_size
            )));
        }
        if self.max_file_size == 0 {
            return Err(AppError::Config(
                "max_file_size must be greater than 0".to_string(),
            ));
        }
        if self.memory_limit_mb <= 0.0 {
            return Err(AppError::Config(
                "memory_limit_mb must be greater than 0".to_string(),
            ));
        }

        self.format_limits.validate()?;
        self.recovery.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OcrConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.languages, "eng");
        assert_eq!(config.psm_mode, PageSegMode::Auto);
    }

    #[test]
    fn test_min_format_bytes_cannot_exceed_buffer() {
        let config = OcrConfig {
            min_format_bytes: 64,
            ..OcrConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_retries_allowed() {
        let recovery = RecoveryConfig {
            max_retries: 0,
            ..RecoveryConfig::default()
        };
        assert!(recovery.validate().is_ok());
    }

    #[test]
    fn test_retry_delay_bounds() {
        let recovery = RecoveryConfig {
            base_retry_delay_ms: 2000,
            max_retry_delay_ms: 1000,
            ..RecoveryConfig::default()
        };
        assert!(recovery.validate().is_err());
    }

    #[test]
    fn test_page_seg_mode_parse() {
        assert_eq!(PageSegMode::parse("sparse"), Some(PageSegMode::SparseText));
        assert_eq!(PageSegMode::parse("6"), Some(PageSegMode::SingleBlock));
        assert_eq!(PageSegMode::parse("vertical"), None);
        assert_eq!(PageSegMode::SparseText.as_str(), "11");
    }

    #[test]
    fn test_format_limits() {
        let limits = FormatSizeLimits::default();
        assert_eq!(limits.limit_for(image::ImageFormat::Jpeg), Some(15 * 1024 * 1024));
        assert_eq!(limits.limit_for(image::ImageFormat::Gif), None);
    }
}
