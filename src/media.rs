//! Avatar image normalization.
//!
//! Uploaded images arrive as jpg/jpeg/png of arbitrary dimensions; they are
//! stored as a fixed-size square PNG so the public avatar endpoint can always
//! answer with `image/png`.

use image::{imageops::FilterType, ImageOutputFormat};
use std::io::Cursor;

use crate::error::AppError;

/// Side length of the stored square avatar.
pub const AVATAR_DIM: u32 = 250;

/// Decodes an uploaded image, scales and crops it to [`AVATAR_DIM`] square,
/// and re-encodes it as PNG.
///
/// Decoding is CPU-bound; callers on an async worker should run this under
/// `web::block`.
pub fn normalize_avatar(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|_| AppError::BadRequest("Unsupported or corrupt image".into()))?;

    let resized = img.resize_to_fill(AVATAR_DIM, AVATAR_DIM, FilterType::Triangle);

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, ImageOutputFormat::Png)
        .map_err(|e| AppError::InternalServerError(format!("Failed to encode avatar: {}", e)))?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn encoded_sample(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_normalizes_to_square_png() {
        // A non-square input must come out cropped to the square dimension.
        let normalized = normalize_avatar(&encoded_sample(100, 40)).unwrap();

        let img = image::load_from_memory_with_format(&normalized, image::ImageFormat::Png)
            .expect("output should be valid PNG");
        assert_eq!(img.width(), AVATAR_DIM);
        assert_eq!(img.height(), AVATAR_DIM);
    }

    #[test]
    fn test_large_input_is_downscaled() {
        let normalized = normalize_avatar(&encoded_sample(640, 640)).unwrap();
        let img = image::load_from_memory(&normalized).unwrap();
        assert_eq!((img.width(), img.height()), (AVATAR_DIM, AVATAR_DIM));
    }

    #[test]
    fn test_garbage_input_is_a_client_error() {
        match normalize_avatar(b"definitely not an image") {
            Err(AppError::BadRequest(_)) => {}
            other => panic!("expected BadRequest, got {:?}", other.err()),
        }
    }
}
