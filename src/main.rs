use anyhow::{bail, Context, Result};
use assetprep::codegen::TableFormat;
use assetprep::config::{AssetConfig, Provider};
use assetprep::imaging::{BoundsJob, ClipJob, Corner, CornerZone, HitboxJob, SizeTableJob};
use assetprep::pipeline::{run_job, AssetJob};
use assetprep::questions::{build_translator, merge_batches, translate_files, write_records, BatchSet};
use assetprep::vector::SvgJob;
use assetprep::walker::{sorted, walk_files, FileFilter};
use assetprep::{audio, AssetRecord, RunSummary};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "assetprep")]
#[command(version, about = "Prepare app assets: sprites, sounds, icons and question banks")]
#[command(long_about = "Prepare app assets: sprites, sounds, icons and question banks\n\n\
    Every command reads its directories and thresholds from an optional JSON\n\
    configuration file (--config); command-line flags override it.\n\n\
    Set ASSETPREP_LOG (e.g. ASSETPREP_LOG=assetprep=debug) for fine-grained logging.")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log every processed file
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize, erase watermark zones and clip faint alpha in sprites
    Clip {
        /// Image directory (scanned recursively)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Clear pixels whose alpha is below this value
        #[arg(long)]
        threshold: Option<u8>,

        /// Downscale images larger than this in either dimension
        #[arg(long, conflicts_with = "no_resize")]
        max_dim: Option<u32>,

        /// Never resize
        #[arg(long)]
        no_resize: bool,

        /// Erase a square zone anchored at this corner of every image
        #[arg(long)]
        erase_corner: Option<Corner>,

        /// Side length of the erased corner zone
        #[arg(long, default_value_t = 150)]
        zone_size: u32,

        /// Keep source files after converting them
        #[arg(long)]
        keep_sources: bool,
    },

    /// Generate the image size table
    Meta {
        #[arg(long)]
        root: Option<PathBuf>,

        /// Generated table path
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum)]
        format: Option<TableFormat>,
    },

    /// Generate per-sprite hitbox cells from a density scan
    Hitboxes {
        #[arg(long)]
        root: Option<PathBuf>,

        /// Generated table path
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum)]
        format: Option<TableFormat>,

        /// Grid cell size in pixels
        #[arg(long)]
        cell_size: Option<u32>,

        /// Report the opaque bounding box of each sprite instead of writing a table
        #[arg(long)]
        bounds: bool,
    },

    /// Synthesize placeholder sound effects and music
    Tones {
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Strip editor metadata from SVG files
    Svg {
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Translate question batches
    Translate {
        /// Directory holding the source batch files
        #[arg(long)]
        source: Option<PathBuf>,

        /// Directory receiving the translated batch files
        #[arg(long)]
        target: Option<PathBuf>,

        #[arg(long, value_enum)]
        provider: Option<Provider>,

        /// Target language code
        #[arg(long)]
        lang: Option<String>,

        /// Concurrent translations per batch
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Merge numbered question batches into one file
    Merge {
        /// Directory holding the batch files
        #[arg(long)]
        dir: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        first: Option<u32>,

        #[arg(long)]
        last: Option<u32>,

        /// Batch file name with {n} standing for the batch number
        #[arg(long)]
        template: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let mut config = AssetConfig::load(cli.config.as_deref()).with_context(|| {
        format!(
            "Failed to load configuration: {}",
            cli.config.as_deref().unwrap_or(Path::new("")).display()
        )
    })?;

    match cli.command {
        Command::Clip {
            root,
            threshold,
            max_dim,
            no_resize,
            erase_corner,
            zone_size,
            keep_sources,
        } => {
            let clip = &mut config.clip;
            override_with(&mut clip.root, root);
            override_with(&mut clip.alpha_threshold, threshold);
            if no_resize {
                clip.max_dimension = None;
            } else if max_dim.is_some() {
                clip.max_dimension = max_dim;
            }
            if let Some(corner) = erase_corner {
                clip.erase_zones.push(CornerZone {
                    corner,
                    width: zone_size,
                    height: zone_size,
                });
            }
            if keep_sources {
                clip.delete_converted_sources = false;
            }
            clip.validate().context("Invalid clip configuration")?;

            let records = collect(&clip.root, FileFilter::extensions(&clip.extensions));
            report("clip", run(records, &mut ClipJob::new(clip))?);
        }

        Command::Meta { root, output, format } => {
            override_with(&mut config.clip.root, root);
            override_with(&mut config.tables.sizes_output, output);
            override_with(&mut config.tables.format, format);
            config.clip.validate().context("Invalid image configuration")?;

            let records = collect(&config.clip.root, FileFilter::extensions(&config.clip.extensions));
            let mut job = SizeTableJob::new(&config.tables.sizes_output, config.tables.format);
            report("meta", run(records, &mut job)?);
            println!(
                "wrote {} sizes to {}",
                job.table().len(),
                config.tables.sizes_output.display()
            );
        }

        Command::Hitboxes {
            root,
            output,
            format,
            cell_size,
            bounds,
        } => {
            let scan = &mut config.scan;
            override_with(&mut scan.root, root);
            override_with(&mut scan.density.cell_size, cell_size);
            override_with(&mut config.tables.hitboxes_output, output);
            override_with(&mut config.tables.format, format);
            scan.validate().context("Invalid scan configuration")?;

            let records = collect(&scan.root, FileFilter::extensions(&scan.extensions));
            if bounds {
                let mut job = BoundsJob::new();
                report("bounds", run(records, &mut job)?);
                for entry in job.into_entries() {
                    let b = entry.bounds;
                    println!(
                        "{}: {}x{} visible {}x{} at ({}, {})",
                        entry.name, entry.size.0, entry.size.1, b.width, b.height, b.x, b.y
                    );
                }
            } else {
                let mut job = HitboxJob::new(
                    scan.density,
                    &config.tables.hitboxes_output,
                    config.tables.format,
                );
                report("hitboxes", run(records, &mut job)?);
                println!(
                    "wrote {} hitbox entries to {}",
                    job.table().len(),
                    config.tables.hitboxes_output.display()
                );
            }
        }

        Command::Tones { output_dir } => {
            override_with(&mut config.tones.output_dir, output_dir);
            config.tones.validate().context("Invalid tones configuration")?;

            let summary = audio::generate_bank(&config.tones.output_dir, &config.tones.tones)?;
            report("tones", summary);
        }

        Command::Svg { root } => {
            override_with(&mut config.svg.root, root);
            config.svg.validate().context("Invalid svg configuration")?;

            let mut job = SvgJob::new().context("Failed to compile SVG patterns")?;
            let records = walk_files(&config.svg.root, FileFilter::extensions(&["svg"]));
            report("svg", run(records, &mut job)?);
        }

        Command::Translate {
            source,
            target,
            provider,
            lang,
            workers,
        } => {
            let translate = &mut config.translate;
            override_with(&mut translate.source_dir, source);
            override_with(&mut translate.target_dir, target);
            override_with(&mut translate.provider, provider);
            override_with(&mut translate.target_lang, lang);
            override_with(&mut translate.workers, workers);
            translate.validate().context("Invalid translate configuration")?;

            let translator = build_translator(translate).context("Failed to set up translator")?;
            let summary = translate_files(translate, translator.as_ref())
                .with_context(|| format!("Failed to write {}", translate.merged_output.display()))?;
            report("translate", summary);
        }

        Command::Merge {
            dir,
            output,
            first,
            last,
            template,
        } => {
            let merge = &mut config.merge;
            override_with(&mut merge.dir, dir);
            override_with(&mut merge.output, output);
            override_with(&mut merge.first, first);
            override_with(&mut merge.last, last);
            override_with(&mut merge.template, template);
            merge.validate().context("Invalid merge configuration")?;

            let report = merge_batches(&BatchSet::from(&*merge));
            if report.records.is_empty() {
                bail!("No questions found in {}", merge.dir.display());
            }
            write_records(&merge.output, &report.records)
                .with_context(|| format!("Failed to write {}", merge.output.display()))?;

            println!(
                "merged {} questions into {}",
                report.records.len(),
                merge.output.display()
            );
            if !report.missing.is_empty() {
                println!("missing batches: {}", report.missing.join(", "));
            }
            for (name, reason) in &report.invalid {
                println!("invalid batch {name}: {reason}");
            }
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ASSETPREP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Replace a configured value when the flag was given
fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Walk a directory up front so jobs see files in sorted order
fn collect(root: &Path, filter: FileFilter) -> Vec<AssetRecord> {
    sorted(walk_files(root, filter))
}

fn run<J: AssetJob>(records: impl IntoIterator<Item = AssetRecord>, job: &mut J) -> Result<RunSummary> {
    run_job(records, job).with_context(|| format!("{} job failed", job.name()))
}

fn report(name: &str, summary: RunSummary) {
    println!("{name}: {summary}");
}
