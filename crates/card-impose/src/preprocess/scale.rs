//! Downscaling of a single card image

use super::RenderedAsset;
use crate::types::{CardImposeError, Result};
use image::DynamicImage;
use image::imageops::FilterType;
use std::path::Path;

/// Maximum pixel size of a prepared asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelBox {
    pub width: u32,
    pub height: u32,
}

impl PixelBox {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Scale factor fitting `(src_w, src_h)` into `target`, never above 1.0
pub fn fit_scale(src_w: u32, src_h: u32, target: PixelBox) -> f32 {
    let sx = target.width as f32 / src_w.max(1) as f32;
    let sy = target.height as f32 / src_h.max(1) as f32;
    sx.min(sy).min(1.0)
}

/// Output dimensions and scale for a source of the given size.
///
/// Sources that already fit come back unchanged with scale 1.0.
pub fn fit_dimensions(src_w: u32, src_h: u32, target: PixelBox) -> (u32, u32, f32) {
    let scale = fit_scale(src_w, src_h, target);
    if scale >= 1.0 {
        return (src_w, src_h, 1.0);
    }

    let width = ((src_w as f32 * scale).round() as u32).clamp(1, target.width.max(1));
    let height = ((src_h as f32 * scale).round() as u32).clamp(1, target.height.max(1));
    (width, height, scale)
}

/// Decode, downscale and store one card image
pub fn preprocess_image(path: &Path, target: PixelBox) -> Result<RenderedAsset> {
    let decoded = image::open(path).map_err(|source| CardImposeError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = normalize_color(decoded);

    let (width, height, scale) = fit_dimensions(image.width(), image.height(), target);
    let image = if scale < 1.0 {
        image.resize_exact(width, height, FilterType::Lanczos3)
    } else {
        image
    };

    log::debug!(
        "Prepared {} at {}x{} (scale {:.3})",
        path.display(),
        width,
        height,
        scale
    );
    RenderedAsset::from_image(&image, path, scale)
}

/// Keep alpha when present, otherwise store plain 8-bit RGB
fn normalize_color(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.into_rgba8()),
        other => DynamicImage::ImageRgb8(other.into_rgb8()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downscale_preserves_aspect() {
        let (w, h, s) = fit_dimensions(2000, 1000, PixelBox::new(500, 500));
        assert_eq!((w, h), (500, 250));
        assert!((s - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_never_upscales() {
        let (w, h, s) = fit_dimensions(100, 80, PixelBox::new(500, 500));
        assert_eq!((w, h), (100, 80));
        assert_eq!(s, 1.0);
    }

    #[test]
    fn test_exact_fit_is_pass_through() {
        let (w, h, s) = fit_dimensions(300, 400, PixelBox::new(300, 400));
        assert_eq!((w, h, s), (300, 400, 1.0));
    }

    #[test]
    fn test_minimum_one_pixel() {
        let (w, h, _) = fit_dimensions(10_000, 1, PixelBox::new(10, 10));
        assert_eq!(w, 10);
        assert_eq!(h, 1);
    }

    #[test]
    fn test_limited_by_height() {
        let (w, h, _) = fit_dimensions(697, 1016, PixelBox::new(348, 406));
        assert!(w <= 348);
        assert_eq!(h, 406);
    }
}
