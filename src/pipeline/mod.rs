//! Generic per-file asset pipeline
//!
//! Every walk-based command is an [`AssetJob`]: the walker enumerates
//! candidate files, and [`run_job`] pushes each one through
//! decode → transform → encode. A failure in any stage is logged and counted
//! against that item only; the run continues with the next file. Jobs that
//! build a generated artifact accumulate results in `encode` and write them
//! once in [`AssetJob::finish`].

pub mod output;

pub use output::write_atomic;

use crate::error::Result;
use crate::types::{AssetRecord, RunSummary};

/// Result of the transform stage for one item
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Hand the value to the encoder
    Write(T),
    /// Item is already in its final state
    Unchanged,
    /// Item is intentionally not handled, with a reason for the log
    Skip(String),
}

/// One pluggable file-in/file-out transform
pub trait AssetJob {
    /// In-memory representation produced by the decoder
    type Decoded;
    /// Value handed from the transformer to the encoder
    type Output;

    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Open one file into memory
    fn decode(&mut self, record: &AssetRecord) -> Result<Self::Decoded>;

    /// Apply the per-item transform
    fn transform(
        &mut self,
        record: &AssetRecord,
        decoded: Self::Decoded,
    ) -> Result<Outcome<Self::Output>>;

    /// Persist the transformed value (or add it to an accumulated artifact)
    fn encode(&mut self, record: &AssetRecord, output: Self::Output) -> Result<()>;

    /// Called once after every item has been seen
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Drive `job` over every record, returning the per-item counters
///
/// # Arguments
/// * `records` - Candidate files, usually from [`crate::walker::walk_files`]
/// * `job` - The transform to apply
///
/// # Returns
/// * `Ok(RunSummary)` - Counters for the run (item failures are counted, not returned)
/// * `Err(AssetError)` - Only if [`AssetJob::finish`] fails
///
/// # Examples
/// ```no_run
/// use assetprep::pipeline::run_job;
/// use assetprep::vector::SvgJob;
/// use assetprep::walker::{walk_files, FileFilter};
///
/// let mut job = SvgJob::new().unwrap();
/// let summary = run_job(walk_files("mobile/assets", FileFilter::extensions(&["svg"])), &mut job).unwrap();
/// println!("{summary}");
/// ```
pub fn run_job<J: AssetJob>(
    records: impl IntoIterator<Item = AssetRecord>,
    job: &mut J,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    let name = job.name();

    for record in records {
        match process_one(job, &record) {
            Ok(ItemResult::Written) => {
                tracing::debug!(job = name, "wrote {}", record.path.display());
                summary.processed += 1;
            }
            Ok(ItemResult::Unchanged) => {
                tracing::debug!(job = name, "unchanged {}", record.path.display());
                summary.unchanged += 1;
            }
            Ok(ItemResult::Skipped(reason)) => {
                tracing::info!(job = name, "skipped {}: {reason}", record.path.display());
                summary.skipped += 1;
            }
            Err(e) => {
                tracing::error!(job = name, "failed {}: {e}", record.path.display());
                summary.errored += 1;
            }
        }
    }

    job.finish()?;
    tracing::info!(job = name, "{summary}");
    Ok(summary)
}

enum ItemResult {
    Written,
    Unchanged,
    Skipped(String),
}

fn process_one<J: AssetJob>(job: &mut J, record: &AssetRecord) -> Result<ItemResult> {
    let decoded = job.decode(record)?;
    match job.transform(record, decoded)? {
        Outcome::Write(output) => {
            job.encode(record, output)?;
            Ok(ItemResult::Written)
        }
        Outcome::Unchanged => Ok(ItemResult::Unchanged),
        Outcome::Skip(reason) => Ok(ItemResult::Skipped(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssetError;
    use std::path::PathBuf;

    /// Doubles numbers parsed from the file name; fails on "bad"
    #[derive(Default)]
    struct DoublingJob {
        written: Vec<u32>,
        finished: bool,
    }

    impl AssetJob for DoublingJob {
        type Decoded = String;
        type Output = u32;

        fn name(&self) -> &'static str {
            "doubling"
        }

        fn decode(&mut self, record: &AssetRecord) -> Result<String> {
            let stem = record.path.file_stem().unwrap().to_string_lossy().into_owned();
            if stem == "bad" {
                return Err(AssetError::UnsupportedFormat(stem));
            }
            Ok(stem)
        }

        fn transform(&mut self, _record: &AssetRecord, decoded: String) -> Result<Outcome<u32>> {
            match decoded.parse::<u32>() {
                Ok(0) => Ok(Outcome::Unchanged),
                Ok(n) => Ok(Outcome::Write(n * 2)),
                Err(_) => Ok(Outcome::Skip("not a number".to_string())),
            }
        }

        fn encode(&mut self, _record: &AssetRecord, output: u32) -> Result<()> {
            self.written.push(output);
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn records(names: &[&str]) -> Vec<AssetRecord> {
        names
            .iter()
            .map(|n| AssetRecord::new(PathBuf::from(format!("{n}.json"))))
            .collect()
    }

    #[test]
    fn test_run_job_counts_each_outcome() {
        let mut job = DoublingJob::default();
        let summary = run_job(records(&["1", "0", "bad", "x", "21"]), &mut job).unwrap();

        assert_eq!(
            summary,
            RunSummary {
                processed: 2,
                unchanged: 1,
                skipped: 1,
                errored: 1,
            }
        );
        assert_eq!(job.written, vec![2, 42]);
        assert!(job.finished);
    }

    #[test]
    fn test_run_job_empty_input_still_finishes() {
        let mut job = DoublingJob::default();
        let summary = run_job(Vec::new(), &mut job).unwrap();
        assert_eq!(summary.total(), 0);
        assert!(job.finished);
    }
}
