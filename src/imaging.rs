//! Panel normalization: upscale narrow panels, sharpen, re-encode as PNG

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, ImageError};

/// Mild sharpen; weights sum to 16 and are normalized by `filter3x3`
pub const SHARPEN_KERNEL: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];

/// Height after scaling `width` up to `min_width`, rounded down
pub fn scaled_height(width: u32, height: u32, min_width: u32) -> u32 {
    ((height as u64 * min_width as u64) / width.max(1) as u64).max(1) as u32
}

/// Decode, convert to 8-bit RGB(A), upscale below `min_width` and sharpen
pub fn normalize(bytes: &[u8], min_width: u32) -> Result<DynamicImage, ImageError> {
    let decoded = image::load_from_memory(bytes)?;

    let img = match decoded {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => decoded,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let img = if img.width() < min_width {
        let height = scaled_height(img.width(), img.height(), min_width);
        log::debug!("Upscaling {}x{} -> {}x{}", img.width(), img.height(), min_width, height);
        img.resize_exact(min_width, height, FilterType::Lanczos3)
    } else {
        img
    };

    Ok(img.filter3x3(&SHARPEN_KERNEL))
}

/// PNG at maximum compression with adaptive row filtering
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilter::Adaptive).write_image(
        img.as_bytes(),
        img.width(),
        img.height(),
        img.color().into(),
    )?;
    Ok(out)
}
