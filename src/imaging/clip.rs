use crate::types::Rect;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Force faint pixels to full transparency
///
/// Every pixel with `0 < alpha < threshold` becomes `(0, 0, 0, 0)`. Pixels
/// that are already fully transparent or at least `threshold` opaque are left
/// alone, so applying the same threshold twice changes nothing.
///
/// # Arguments
/// * `img` - Image to modify in place
/// * `threshold` - Minimum alpha a pixel must have to survive
///
/// # Returns
/// Number of pixels that were cleared
///
/// # Examples
/// ```
/// use assetprep::imaging::alpha_clip;
/// use image::{Rgba, RgbaImage};
///
/// let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 30]));
/// img.put_pixel(1, 0, Rgba([255, 0, 0, 200]));
/// assert_eq!(alpha_clip(&mut img, 50), 1);
/// assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
/// ```
pub fn alpha_clip(img: &mut RgbaImage, threshold: u8) -> usize {
    let mut cleared = 0;
    for pixel in img.pixels_mut() {
        let alpha = pixel[3];
        if alpha > 0 && alpha < threshold {
            *pixel = TRANSPARENT;
            cleared += 1;
        }
    }
    cleared
}

/// Image corner a [`CornerZone`] is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Fixed-size region in one corner of every image, erased unconditionally
///
/// Used to strip a known watermark that the generator stamps in the same
/// place on each sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerZone {
    pub corner: Corner,
    pub width: u32,
    pub height: u32,
}

impl CornerZone {
    /// Resolve the zone against an image size, truncating at the edges
    pub fn resolve(&self, img_width: u32, img_height: u32) -> Rect {
        let width = self.width.min(img_width);
        let height = self.height.min(img_height);
        let x = match self.corner {
            Corner::TopLeft | Corner::BottomLeft => 0,
            Corner::TopRight | Corner::BottomRight => img_width - width,
        };
        let y = match self.corner {
            Corner::TopLeft | Corner::TopRight => 0,
            Corner::BottomLeft | Corner::BottomRight => img_height - height,
        };
        Rect::new(x, y, width, height)
    }
}

/// Clear every visible pixel inside the given corner zones
///
/// Unlike [`alpha_clip`], the pixel's alpha value does not matter: anything
/// with non-zero alpha inside a zone becomes fully transparent.
///
/// # Returns
/// Number of pixels that were cleared
pub fn erase_zones(img: &mut RgbaImage, zones: &[CornerZone]) -> usize {
    let (width, height) = img.dimensions();
    let mut cleared = 0;

    for zone in zones {
        let rect = zone.resolve(width, height);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let pixel = img.get_pixel_mut(x, y);
                if pixel[3] > 0 {
                    *pixel = TRANSPARENT;
                    cleared += 1;
                }
            }
        }
    }

    cleared
}
