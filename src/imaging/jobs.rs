use crate::codegen::{GeneratedTable, TableFormat, TableKind, TableValue};
use crate::config::{ClipConfig, OutputFormat};
use crate::error::{AssetError, Result};
use crate::imaging::{alpha_clip, density_scan, erase_zones, fit_within, opaque_bounds, CornerZone, DensityParams};
use crate::pipeline::{write_atomic, AssetJob, Outcome};
use crate::types::{AssetKind, AssetRecord, Rect};
use image::{DynamicImage, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Resize, zone-erase and alpha-clip sprites in place
///
/// Sources in another format than the configured output are always
/// re-encoded (and, by default, deleted once the replacement is verified).
/// Sources already in the output format are only rewritten when a pixel or
/// the size changed.
pub struct ClipJob {
    alpha_threshold: u8,
    max_dimension: Option<u32>,
    erase_zones: Vec<CornerZone>,
    output_format: OutputFormat,
    delete_converted_sources: bool,
}

/// What the clip transform changed in one image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipStats {
    pub resized: bool,
    pub zone_pixels: usize,
    pub clipped_pixels: usize,
}

impl ClipStats {
    fn changed(&self) -> bool {
        self.resized || self.zone_pixels > 0 || self.clipped_pixels > 0
    }
}

pub struct ClipOutput {
    image: RgbaImage,
    convert: bool,
    stats: ClipStats,
}

impl ClipJob {
    pub fn new(config: &ClipConfig) -> Self {
        Self {
            alpha_threshold: config.alpha_threshold,
            max_dimension: config.max_dimension,
            erase_zones: config.erase_zones.clone(),
            output_format: config.output_format,
            delete_converted_sources: config.delete_converted_sources,
        }
    }

    /// Apply resize, zone erasure and alpha clip to a decoded image
    pub fn apply(&self, img: RgbaImage) -> (RgbaImage, ClipStats) {
        let mut stats = ClipStats::default();

        let mut img = match self.max_dimension.and_then(|max| fit_within(&img, max)) {
            Some(resized) => {
                stats.resized = true;
                resized
            }
            None => img,
        };

        // Zone erasure runs first so its pixels are not also counted as clipped
        stats.zone_pixels = erase_zones(&mut img, &self.erase_zones);
        stats.clipped_pixels = alpha_clip(&mut img, self.alpha_threshold);
        (img, stats)
    }

    fn needs_conversion(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        ext.as_deref() != Some(self.output_format.extension())
    }

    fn encode_bytes(&self, img: RgbaImage) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), self.output_format.image_format())?;
        Ok(bytes)
    }
}

impl AssetJob for ClipJob {
    type Decoded = RgbaImage;
    type Output = ClipOutput;

    fn name(&self) -> &'static str {
        "clip"
    }

    fn decode(&mut self, record: &AssetRecord) -> Result<RgbaImage> {
        decode_sprite(record)
    }

    fn transform(&mut self, record: &AssetRecord, decoded: RgbaImage) -> Result<Outcome<ClipOutput>> {
        let convert = self.needs_conversion(&record.path);
        let (image, stats) = self.apply(decoded);

        if !convert && !stats.changed() {
            return Ok(Outcome::Unchanged);
        }
        Ok(Outcome::Write(ClipOutput {
            image,
            convert,
            stats,
        }))
    }

    fn encode(&mut self, record: &AssetRecord, output: ClipOutput) -> Result<()> {
        let (width, height) = output.image.dimensions();
        let bytes = self.encode_bytes(output.image)?;

        let target = if output.convert {
            record.path.with_extension(self.output_format.extension())
        } else {
            record.path.clone()
        };
        if output.convert && target.exists() {
            tracing::warn!("overwriting existing {}", target.display());
        }
        write_atomic(&target, &bytes)?;

        let stats = output.stats;
        if output.convert {
            tracing::info!(
                resized = stats.resized,
                clipped = stats.clipped_pixels,
                zone = stats.zone_pixels,
                "converted {} -> {}",
                record.path.display(),
                target.display()
            );
            if self.delete_converted_sources {
                verify_written(&target, (width, height))?;
                fs::remove_file(&record.path)?;
                tracing::debug!("removed source {}", record.path.display());
            }
        } else {
            tracing::info!(
                resized = stats.resized,
                clipped = stats.clipped_pixels,
                zone = stats.zone_pixels,
                "processed {}",
                record.path.display()
            );
        }
        Ok(())
    }
}

/// Decode a raster sprite, refusing files the walker matched by a custom extension
fn decode_sprite(record: &AssetRecord) -> Result<RgbaImage> {
    ensure_sprite(record)?;
    Ok(image::open(&record.path)?.to_rgba8())
}

fn ensure_sprite(record: &AssetRecord) -> Result<()> {
    if record.kind == Some(AssetKind::Image) {
        Ok(())
    } else {
        Err(AssetError::UnsupportedFormat(format!(
            "{} is not a png or webp sprite",
            record.path.display()
        )))
    }
}

/// Re-probe a freshly written image before anything destructive happens
fn verify_written(path: &Path, expected: (u32, u32)) -> Result<()> {
    let actual = image::image_dimensions(path).map_err(|e| AssetError::UnverifiedWrite {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if actual != expected {
        return Err(AssetError::UnverifiedWrite {
            path: path.to_path_buf(),
            reason: format!("expected {expected:?}, found {actual:?}"),
        });
    }
    Ok(())
}

/// Collect `(width, height)` of every sprite into a generated table
pub struct SizeTableJob {
    table: GeneratedTable,
    output: PathBuf,
    format: TableFormat,
}

impl SizeTableJob {
    pub fn new(output: impl Into<PathBuf>, format: TableFormat) -> Self {
        Self {
            table: GeneratedTable::new(TableKind::Sizes),
            output: output.into(),
            format,
        }
    }

    pub fn table(&self) -> &GeneratedTable {
        &self.table
    }
}

impl AssetJob for SizeTableJob {
    type Decoded = (u32, u32);
    type Output = (u32, u32);

    fn name(&self) -> &'static str {
        "sizes"
    }

    fn decode(&mut self, record: &AssetRecord) -> Result<(u32, u32)> {
        ensure_sprite(record)?;
        Ok(image::image_dimensions(&record.path)?)
    }

    fn transform(&mut self, _record: &AssetRecord, decoded: (u32, u32)) -> Result<Outcome<(u32, u32)>> {
        Ok(Outcome::Write(decoded))
    }

    fn encode(&mut self, record: &AssetRecord, (width, height): (u32, u32)) -> Result<()> {
        self.table
            .insert(record.file_name(), TableValue::Size { width, height });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.table.write(&self.output, self.format)
    }
}

/// Collect density-scan cells of every sprite into a generated table
pub struct HitboxJob {
    params: DensityParams,
    table: GeneratedTable,
    output: PathBuf,
    format: TableFormat,
}

impl HitboxJob {
    pub fn new(params: DensityParams, output: impl Into<PathBuf>, format: TableFormat) -> Self {
        Self {
            params,
            table: GeneratedTable::new(TableKind::Hitboxes),
            output: output.into(),
            format,
        }
    }

    pub fn table(&self) -> &GeneratedTable {
        &self.table
    }
}

impl AssetJob for HitboxJob {
    type Decoded = RgbaImage;
    type Output = Vec<Rect>;

    fn name(&self) -> &'static str {
        "hitboxes"
    }

    fn decode(&mut self, record: &AssetRecord) -> Result<RgbaImage> {
        decode_sprite(record)
    }

    fn transform(&mut self, _record: &AssetRecord, decoded: RgbaImage) -> Result<Outcome<Vec<Rect>>> {
        let cells = density_scan(&decoded, &self.params);
        if cells.is_empty() {
            return Ok(Outcome::Skip("no occupied cells".to_string()));
        }
        Ok(Outcome::Write(cells))
    }

    fn encode(&mut self, record: &AssetRecord, cells: Vec<Rect>) -> Result<()> {
        self.table.insert(record.file_name(), TableValue::Rects(cells));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.table.write(&self.output, self.format)
    }
}

/// Tight visible bounds of one sprite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundsEntry {
    pub name: String,
    pub size: (u32, u32),
    pub bounds: Rect,
}

/// Report the opaque bounding box of every sprite
#[derive(Default)]
pub struct BoundsJob {
    entries: Vec<BoundsEntry>,
}

impl BoundsJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_entries(self) -> Vec<BoundsEntry> {
        self.entries
    }
}

impl AssetJob for BoundsJob {
    type Decoded = RgbaImage;
    type Output = BoundsEntry;

    fn name(&self) -> &'static str {
        "bounds"
    }

    fn decode(&mut self, record: &AssetRecord) -> Result<RgbaImage> {
        decode_sprite(record)
    }

    fn transform(&mut self, record: &AssetRecord, decoded: RgbaImage) -> Result<Outcome<BoundsEntry>> {
        match opaque_bounds(&decoded) {
            Some(bounds) => Ok(Outcome::Write(BoundsEntry {
                name: record.file_name(),
                size: decoded.dimensions(),
                bounds,
            })),
            None => {
                tracing::warn!("{} is completely transparent", record.path.display());
                Ok(Outcome::Skip("completely transparent".to_string()))
            }
        }
    }

    fn encode(&mut self, _record: &AssetRecord, output: BoundsEntry) -> Result<()> {
        self.entries.push(output);
        Ok(())
    }
}
