/// Pixel transforms for sprite assets
///
/// - `clip`: alpha threshold clipping and fixed corner-zone erasure
/// - `resize`: aspect-preserving downscale to a maximum dimension
/// - `density`: grid density scan (hitbox cells) and opaque bounds
/// - `jobs`: pipeline jobs wiring the transforms to files and tables
pub mod clip;
pub mod density;
pub mod jobs;
pub mod resize;

// Re-export commonly used items
pub use clip::{alpha_clip, erase_zones, Corner, CornerZone};
pub use density::{density_scan, opaque_bounds, DensityParams};
pub use jobs::{BoundsEntry, BoundsJob, ClipJob, ClipStats, HitboxJob, SizeTableJob};
pub use resize::{fit_within, fitted_size};
