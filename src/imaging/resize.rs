use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Compute the size of `(width, height)` scaled down to fit a `max` square
///
/// The longer side becomes `max`; the shorter side is scaled by the same
/// factor, rounded, and never drops below 1. Returns `None` when both sides
/// already fit.
///
/// # Examples
/// ```
/// use assetprep::imaging::fitted_size;
///
/// assert_eq!(fitted_size(2000, 1000, 1000), Some((1000, 500)));
/// assert_eq!(fitted_size(800, 600, 1000), None);
/// ```
pub fn fitted_size(width: u32, height: u32, max: u32) -> Option<(u32, u32)> {
    if width <= max && height <= max {
        return None;
    }

    let scale = f64::from(max) / f64::from(width.max(height));
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max);
    Some((scaled(width), scaled(height)))
}

/// Downscale an image so neither side exceeds `max`, preserving aspect ratio
///
/// Uses Lanczos3 resampling. The operation is lossy but idempotent once
/// applied: an image that already fits is not touched.
///
/// # Arguments
/// * `img` - Source image
/// * `max` - Maximum allowed width and height
///
/// # Returns
/// * `Some(RgbaImage)` - The resized image
/// * `None` - If no resize was needed
pub fn fit_within(img: &RgbaImage, max: u32) -> Option<RgbaImage> {
    let (width, height) = img.dimensions();
    let (new_width, new_height) = fitted_size(width, height, max)?;
    Some(imageops::resize(img, new_width, new_height, FilterType::Lanczos3))
}
