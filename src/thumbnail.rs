//! # Thumbnail Module
//!
//! Image payloads attached to a profile after inference: the full capture as
//! a data URL (memory only) and a small JPEG thumbnail that is cheap enough to
//! keep in the persisted history.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 300;
pub const THUMBNAIL_JPEG_QUALITY: u8 = 70;
/// Largest thumbnail produced, in pixels (300 wide by 4000 tall)
pub const MAX_THUMBNAIL_PIXELS: u64 = 1_200_000;

/// Scale an image to `max_width` keeping its aspect ratio and encode it as a
/// JPEG data URL.
///
/// Narrower images are scaled up as well, so every thumbnail has the same width.
pub fn create_thumbnail(image_bytes: &[u8], max_width: u32) -> AppResult<String> {
    if max_width == 0 {
        return Err(AppError::Validation(
            "thumbnail width must be greater than 0".to_string(),
        ));
    }

    let image = image::load_from_memory(image_bytes)?;
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(AppError::Image("image has no pixels".to_string()));
    }

    let ratio = f64::from(height) / f64::from(width);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let target_height = ((f64::from(max_width) * ratio).round() as u32).max(1);

    // Tiny files can still describe extreme aspect ratios
    let pixels = u64::from(max_width) * u64::from(target_height);
    if pixels > MAX_THUMBNAIL_PIXELS {
        return Err(AppError::Image(format!(
            "thumbnail of {}x{} exceeds {} pixels (source {}x{})",
            max_width, target_height, MAX_THUMBNAIL_PIXELS, width, height
        )));
    }

    let resized = image.resize_exact(max_width, target_height, FilterType::Triangle);
    let jpeg = encode_jpeg(&resized, THUMBNAIL_JPEG_QUALITY)?;

    debug!(
        source_width = width,
        source_height = height,
        width = max_width,
        height = target_height,
        bytes = jpeg.len(),
        "Created thumbnail"
    );
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)))
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> AppResult<Vec<u8>> {
    let mut buffer = Vec::new();
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
    Ok(buffer)
}

/// Full-size data URL with the MIME type detected from the bytes
pub fn to_data_url(image_bytes: &[u8]) -> AppResult<String> {
    let format = image::guess_format(image_bytes)?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(image_bytes)
    ))
}

/// Decode the payload of a base64 data URL
pub fn decode_data_url(data_url: &str) -> AppResult<Vec<u8>> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or_else(|| AppError::Validation("data URL has no payload".to_string()))?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        return Err(AppError::Validation(format!(
            "unsupported data URL header: {}",
            header
        )));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| AppError::Validation(format!("invalid base64 payload: {}", e)))
}
