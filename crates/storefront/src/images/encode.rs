//! Pure image transforms: blurhash previews and WebP derivatives.
//!
//! Everything here is CPU-bound and side-effect free; the pipeline in the
//! parent module owns the storage and database traffic.

use image::DynamicImage;
use image::imageops::FilterType;
use thiserror::Error;

use forgeline_core::ProductId;

/// Horizontal blurhash detail components.
pub const BLURHASH_COMPONENTS_X: u32 = 4;
/// Vertical blurhash detail components.
pub const BLURHASH_COMPONENTS_Y: u32 = 3;
/// Longest edge of the downsample fed to the blurhash encoder. Encoding
/// cost grows with pixel count and the hash never needs more detail.
const BLURHASH_SAMPLE_EDGE: u32 = 32;

/// Square edge of the thumbnail derivative.
pub const THUMBNAIL_EDGE: u32 = 150;
/// Square edge of the medium derivative.
pub const MEDIUM_EDGE: u32 = 600;
/// Square edge of the large derivative.
pub const LARGE_EDGE: u32 = 1200;

/// Lossy WebP quality for all derivatives.
const WEBP_QUALITY: f32 = 85.0;

/// Content type uploaded alongside every derivative.
pub const WEBP_CONTENT_TYPE: &str = "image/webp";

/// Errors from decoding or hashing a source image.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The downloaded bytes are not a decodable image.
    #[error("could not decode source image: {0}")]
    Decode(#[from] image::ImageError),

    /// The blurhash encoder rejected its input.
    #[error("blurhash encoding failed: {0}")]
    Blurhash(#[from] blurhash::Error),
}

/// Decode the original upload (JPEG, PNG, or WebP).
///
/// # Errors
///
/// Returns `EncodeError::Decode` when the bytes are not an image.
pub fn decode_source(bytes: &[u8]) -> Result<DynamicImage, EncodeError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Encode a 4x3 blurhash from a small aspect-preserving downsample.
///
/// # Errors
///
/// Returns `EncodeError::Blurhash` if the encoder rejects the sample.
pub fn blurhash_preview(source: &DynamicImage) -> Result<String, EncodeError> {
    let sample = source.resize(BLURHASH_SAMPLE_EDGE, BLURHASH_SAMPLE_EDGE, FilterType::Lanczos3);
    let rgba = sample.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(blurhash::encode(
        BLURHASH_COMPONENTS_X,
        BLURHASH_COMPONENTS_Y,
        width,
        height,
        rgba.as_raw(),
    )?)
}

/// Resize to exactly `width` x `height` (cover crop, centered) and encode
/// as lossy WebP.
#[must_use]
pub fn webp_cover(source: &DynamicImage, width: u32, height: u32) -> Vec<u8> {
    let resized = source.resize_to_fill(width, height, FilterType::Lanczos3);
    let rgba = resized.to_rgba8();
    webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode(WEBP_QUALITY)
        .to_vec()
}

/// Storage path for a derivative: `{folder}/{product_id}/{stem}.webp`,
/// where the stem is the original filename without its extension.
#[must_use]
pub fn variant_object_path(folder: &str, product_id: ProductId, storage_path: &str) -> String {
    let filename = storage_path
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("image.jpg");
    let stem = filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _ext)| stem);
    format!("{folder}/{product_id}/{stem}.webp")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn solid_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 30, 40, 255]),
        ))
    }

    #[test]
    fn test_decode_source_rejects_garbage() {
        let err = decode_source(b"not an image").unwrap_err();
        assert!(matches!(err, EncodeError::Decode(_)));
    }

    #[test]
    fn test_decode_source_accepts_png() {
        let mut bytes = Vec::new();
        solid_image(8, 8)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_source(&bytes).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn test_blurhash_has_expected_component_length() {
        // 4x3 components encode to 6 + 2 * 11 = 28 characters.
        let hash = blurhash_preview(&solid_image(64, 48)).unwrap();
        assert_eq!(hash.len(), 28);
    }

    #[test]
    fn test_blurhash_is_deterministic() {
        let a = blurhash_preview(&solid_image(64, 48)).unwrap();
        let b = blurhash_preview(&solid_image(64, 48)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_webp_cover_emits_riff_container() {
        let bytes = webp_cover(&solid_image(300, 200), THUMBNAIL_EDGE, THUMBNAIL_EDGE);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_webp_cover_crops_to_exact_dimensions() {
        // Landscape source must come out square, not letterboxed.
        let bytes = webp_cover(&solid_image(300, 200), THUMBNAIL_EDGE, THUMBNAIL_EDGE);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), THUMBNAIL_EDGE);
        assert_eq!(decoded.height(), THUMBNAIL_EDGE);
    }

    #[test]
    fn test_variant_path_strips_extension() {
        let product_id: ProductId = "6a3cbe3e-6f64-4bf9-9c5e-2f9b63bc2405".parse().unwrap();
        assert_eq!(
            variant_object_path("thumbnail", product_id, "originals/geometric-wolf.jpg"),
            format!("thumbnail/{product_id}/geometric-wolf.webp")
        );
    }

    #[test]
    fn test_variant_path_keeps_inner_dots() {
        let product_id = ProductId::new();
        assert_eq!(
            variant_object_path("medium", product_id, "uploads/photo.final.jpeg"),
            format!("medium/{product_id}/photo.final.webp")
        );
    }

    #[test]
    fn test_variant_path_handles_extensionless_name() {
        let product_id = ProductId::new();
        assert_eq!(
            variant_object_path("large", product_id, "uploads/scan"),
            format!("large/{product_id}/scan.webp")
        );
    }

    #[test]
    fn test_variant_path_falls_back_on_trailing_slash() {
        let product_id = ProductId::new();
        assert_eq!(
            variant_object_path("thumbnail", product_id, "uploads/"),
            format!("thumbnail/{product_id}/image.webp")
        );
    }
}
