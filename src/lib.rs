//! # BeerSnap
//!
//! Turns a photographed beer label or menu into a taste profile. Text is read
//! with Tesseract OCR and fed to a deterministic keyword inferencer; results
//! are kept in a bounded history with favorites and user preferences.

pub mod config;
pub mod errors;
pub mod inference;
pub mod instance_manager;
pub mod observability;
pub mod observability_config;
pub mod ocr;
pub mod ocr_config;
pub mod ocr_errors;
pub mod pipeline;
pub mod preferences;
pub mod profile;
pub mod store;
pub mod thumbnail;

// Re-export types for easier access
pub use inference::{infer_profile, TextProfileInferencer};
pub use profile::BeerProfile;
