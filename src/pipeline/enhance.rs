//! Image enhancement: make small board type legible to the OCR engine.
//!
//! Board screenshots are low-resolution crops with anti-aliased text on a
//! tinted background — close to the worst case for tesseract. Three cheap
//! transforms fix most of it:
//!
//! 1. **Upscale** by an integer factor (bilinear). Tesseract wants glyphs
//!    at roughly 20 px x-height; screenshots ship them at 5–8 px.
//! 2. **Grayscale**. Colour carries no signal here and the tint confuses
//!    binarisation.
//! 3. **Contrast boost** around the image mean, which pushes anti-aliased
//!    edge pixels toward either text or background.

use crate::config::CheckConfig;
use crate::error::GreenshotError;
use image::{DynamicImage, GrayImage, Luma};
use image::imageops::FilterType;
use std::io::Cursor;
use tracing::debug;

/// Apply the full enhancement chain: upscale, grayscale, contrast boost.
pub fn enhance(img: &DynamicImage, config: &CheckConfig) -> GrayImage {
    let (w, h) = (img.width(), img.height());
    let scaled = img.resize_exact(
        w.saturating_mul(config.resize_factor),
        h.saturating_mul(config.resize_factor),
        FilterType::Triangle,
    );
    let grey = scaled.to_luma8();
    let boosted = boost_contrast(&grey, config.contrast_factor);
    debug!(
        "Enhanced image {}x{} → {}x{}",
        w,
        h,
        boosted.width(),
        boosted.height()
    );
    boosted
}

/// Scale every pixel's distance from the image mean by `factor`.
///
/// `factor = 1.0` is the identity; `2.0` doubles contrast. Interpolating
/// against the mean (rather than a fixed midpoint) keeps dark-theme and
/// light-theme screenshots symmetric.
pub fn boost_contrast(img: &GrayImage, factor: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return img.clone();
    }

    let sum: u64 = img.pixels().map(|p| p[0] as u64).sum();
    let mean = sum as f32 / (w as u64 * h as u64) as f32;

    let mut out = GrayImage::new(w, h);
    for (x, y, pixel) in img.enumerate_pixels() {
        let v = mean + factor * (pixel[0] as f32 - mean);
        out.put_pixel(x, y, Luma([v.clamp(0.0, 255.0) as u8]));
    }
    out
}

/// PNG-encode the enhanced image for the OCR engine.
///
/// PNG is lossless — compression artefacts on upscaled text would undo the
/// enhancement work.
pub fn to_png_bytes(img: &GrayImage) -> Result<Vec<u8>, GreenshotError> {
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| GreenshotError::EncodeFailed {
            detail: e.to_string(),
        })?;
    debug!("Encoded enhanced image → {} bytes PNG", buf.len());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn enhance_upscales_by_resize_factor() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            10,
            20,
            Rgba([128, 128, 128, 255]),
        ));
        let out = enhance(&img, &CheckConfig::default());
        assert_eq!(out.dimensions(), (40, 80));
    }

    #[test]
    fn contrast_identity_at_factor_one() {
        let img = GrayImage::from_fn(4, 4, |x, y| Luma([(x * 16 + y) as u8 * 4]));
        let out = boost_contrast(&img, 1.0);
        assert_eq!(img, out);
    }

    #[test]
    fn contrast_spreads_values_around_mean() {
        // Mean is 100; 80 and 120 should move away from it symmetrically.
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([80]));
        img.put_pixel(1, 0, Luma([120]));
        let out = boost_contrast(&img, 2.0);
        assert_eq!(out.get_pixel(0, 0)[0], 60);
        assert_eq!(out.get_pixel(1, 0)[0], 140);
    }

    #[test]
    fn contrast_clamps_to_byte_range() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(1, 0, Luma([255]));
        let out = boost_contrast(&img, 10.0);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn png_bytes_carry_the_signature() {
        let img = GrayImage::from_pixel(8, 8, Luma([200]));
        let bytes = to_png_bytes(&img).expect("encode should succeed");
        assert!(bytes.starts_with(b"\x89PNG"));
    }
}
