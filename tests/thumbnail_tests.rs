use base64::{engine::general_purpose::STANDARD, Engine as _};
use beer_snap::errors::AppError;
use beer_snap::inference::{Clock, IdSource, TextProfileInferencer};
use beer_snap::ocr_config::OcrConfig;
use beer_snap::pipeline::LocalAnalyzer;
use beer_snap::thumbnail::{create_thumbnail, decode_data_url, to_data_url, DEFAULT_THUMBNAIL_WIDTH};
use chrono::{DateTime, TimeZone, Utc};
use image::{GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 90, 200])
        });
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn decode_thumbnail(data_url: &str) -> image::DynamicImage {
        let bytes = decode_data_url(data_url).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn test_thumbnail_is_fixed_width_jpeg_with_aspect_ratio() {
        let thumbnail = create_thumbnail(&png_bytes(1200, 800), DEFAULT_THUMBNAIL_WIDTH).unwrap();
        assert!(thumbnail.starts_with("data:image/jpeg;base64,"));

        let decoded = decode_thumbnail(&thumbnail);
        assert_eq!(decoded.dimensions(), (300, 200));
    }

    #[test]
    fn test_small_images_are_scaled_up() {
        let thumbnail = create_thumbnail(&png_bytes(100, 150), 300).unwrap();
        assert_eq!(decode_thumbnail(&thumbnail).dimensions(), (300, 450));
    }

    #[test]
    fn test_very_wide_image_keeps_at_least_one_row() {
        let thumbnail = create_thumbnail(&png_bytes(3000, 2), 300).unwrap();
        assert_eq!(decode_thumbnail(&thumbnail).dimensions(), (300, 1));
    }

    #[test]
    fn test_tall_narrow_image_is_rejected_before_resizing() {
        let err = create_thumbnail(&png_bytes(1, 20_000), DEFAULT_THUMBNAIL_WIDTH).unwrap_err();
        assert!(matches!(err, AppError::Image(ref msg) if msg.contains("300x6000000")));

        // The largest allowed output still works
        let thumbnail = create_thumbnail(&png_bytes(30, 400), 300).unwrap();
        assert_eq!(decode_thumbnail(&thumbnail).dimensions(), (300, 4_000));
    }

    #[test]
    fn test_attach_images_skips_oversized_thumbnail() {
        let analyzer = analyzer();
        let profile = analyzer.profile_from_text("sour");
        let profile = analyzer.attach_images(profile, &png_bytes(1, 20_000)).unwrap();

        assert!(profile.image_data.is_some());
        assert!(profile.thumbnail_data.is_none());
    }

    #[test]
    fn test_thumbnail_rejects_garbage_and_zero_width() {
        assert!(matches!(
            create_thumbnail(b"not an image at all", 300),
            Err(AppError::Image(_))
        ));
        assert!(matches!(
            create_thumbnail(&png_bytes(10, 10), 0),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_full_size_data_url_keeps_original_bytes() {
        let bytes = png_bytes(20, 10);
        let url = to_data_url(&bytes).unwrap();

        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), bytes);
    }

    #[test]
    fn test_decode_data_url_errors() {
        assert!(decode_data_url("no comma here").is_err());
        assert!(decode_data_url("http://example.com/a,b").is_err());
        assert!(decode_data_url("data:image/png,plain").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());

        let ok = format!("data:text/plain;base64,{}", STANDARD.encode("hi"));
        assert_eq!(decode_data_url(&ok).unwrap(), b"hi");
    }

    struct StaticId;

    impl IdSource for StaticId {
        fn next_id(&self) -> String {
            "capture-1".to_string()
        }
    }

    struct EpochClock;

    impl Clock for EpochClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
        }
    }

    fn analyzer() -> LocalAnalyzer {
        LocalAnalyzer::new(OcrConfig::default(), 300).with_inferencer(
            TextProfileInferencer::with_sources(Box::new(StaticId), Box::new(EpochClock)),
        )
    }

    #[test]
    fn test_analyzer_profile_from_text_uses_its_inferencer() {
        let profile = analyzer().profile_from_text("Velvet Night\nOwl Brewing\nOatmeal Stout 6.2%");

        assert_eq!(profile.id, "capture-1");
        assert_eq!(profile.captured_at, 1_700_000_000_000);
        assert_eq!(profile.name, "Velvet Night");
        assert_eq!(profile.style, "Stout");
        assert_eq!(profile.abv, 6.2);
    }

    #[test]
    fn test_attach_images_adds_capture_and_thumbnail() {
        let analyzer = analyzer();
        let profile = analyzer.profile_from_text("pilsner");
        let bytes = png_bytes(600, 300);

        let profile = analyzer.attach_images(profile, &bytes).unwrap();

        assert_eq!(profile.image_data, Some(to_data_url(&bytes).unwrap()));
        let thumbnail = profile.thumbnail_data.expect("thumbnail attached");
        assert_eq!(decode_thumbnail(&thumbnail).dimensions(), (300, 150));
    }

    #[test]
    fn test_attach_images_rejects_unknown_bytes() {
        let analyzer = analyzer();
        let profile = analyzer.profile_from_text("pilsner");
        assert!(analyzer.attach_images(profile, b"plain text").is_err());
    }
}
