//! # assetprep
//!
//! Offline batch tooling for a mobile app's assets: sprite cleanup and
//! hitbox tables, placeholder sounds, SVG metadata removal, and
//! translation and merging of quiz question banks.
//!
//! Each file-oriented task is an [`pipeline::AssetJob`] driven over the
//! records yielded by [`walker::walk_files`]. A failure on one file is
//! logged and counted in the [`RunSummary`]; the run continues.
//!
//! ## Example
//!
//! ```no_run
//! use assetprep::config::ClipConfig;
//! use assetprep::imaging::ClipJob;
//! use assetprep::pipeline::run_job;
//! use assetprep::walker::{walk_files, FileFilter};
//!
//! let config = ClipConfig::default();
//! config.validate().unwrap();
//!
//! let mut job = ClipJob::new(&config);
//! let records = walk_files(&config.root, FileFilter::extensions(&config.extensions));
//! let summary = run_job(records, &mut job).unwrap();
//! println!("{summary}");
//! ```

pub mod audio;
pub mod codegen;
pub mod config;
pub mod error;
pub mod imaging;
pub mod pipeline;
pub mod questions;
pub mod types;
pub mod vector;
pub mod walker;

// Re-export commonly used items
pub use error::{AssetError, Result};
pub use types::{AssetKind, AssetRecord, Rect, RunSummary};
