use crate::types::Rect;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Tuning for [`density_scan`]
///
/// `min_samples` is an absolute count of sampled pixels, not a fraction of the
/// cell area, so the same value means a different coverage for edge cells or
/// a different stride. The defaults reproduce the tables the app ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityParams {
    /// Side length of a grid cell in pixels
    pub cell_size: u32,
    /// Sample every Nth pixel in both directions
    pub sample_stride: u32,
    /// A sample counts as solid when its alpha is strictly above this
    pub alpha_threshold: u8,
    /// A cell is occupied when strictly more samples than this are solid
    pub min_samples: u32,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self {
            cell_size: 25,
            sample_stride: 2,
            alpha_threshold: 20,
            min_samples: 2,
        }
    }
}

/// Approximate the solid regions of a sprite as a list of grid cells
///
/// The image is tiled row by row with `cell_size` squares; cells on the right
/// and bottom edges are truncated to the image. Each cell is sampled with
/// `sample_stride` and reported if enough samples are solid.
///
/// # Arguments
/// * `img` - Sprite to scan
/// * `params` - Grid and threshold settings (zero sizes are treated as 1)
///
/// # Returns
/// Occupied cells in row-major order; empty for fully transparent sprites
///
/// # Examples
/// ```
/// use assetprep::imaging::{density_scan, DensityParams};
/// use image::{Rgba, RgbaImage};
///
/// let img = RgbaImage::from_pixel(50, 25, Rgba([0, 0, 0, 255]));
/// let cells = density_scan(&img, &DensityParams::default());
/// assert_eq!(cells.len(), 2);
/// ```
pub fn density_scan(img: &RgbaImage, params: &DensityParams) -> Vec<Rect> {
    let (width, height) = img.dimensions();
    let cell = params.cell_size.max(1);
    let stride = params.sample_stride.max(1) as usize;
    let mut occupied = Vec::new();

    for y in (0..height).step_by(cell as usize) {
        for x in (0..width).step_by(cell as usize) {
            let box_w = (x + cell).min(width) - x;
            let box_h = (y + cell).min(height) - y;

            let mut visible = 0u32;
            for by in (y..y + box_h).step_by(stride) {
                for bx in (x..x + box_w).step_by(stride) {
                    if img.get_pixel(bx, by)[3] > params.alpha_threshold {
                        visible += 1;
                    }
                }
            }

            if visible > params.min_samples {
                occupied.push(Rect::new(x, y, box_w, box_h));
            }
        }
    }

    occupied
}

/// Tight bounding box of all pixels with non-zero alpha
///
/// # Returns
/// * `Some(Rect)` - Smallest rectangle containing every visible pixel
/// * `None` - If the image is fully transparent
pub fn opaque_bounds(img: &RgbaImage) -> Option<Rect> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((left, top, right, bottom)) => {
                (left.min(x), top.min(y), right.max(x), bottom.max(y))
            }
        });
    }

    bounds.map(|(left, top, right, bottom)| Rect::new(left, top, right - left + 1, bottom - top + 1))
}
