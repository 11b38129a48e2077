use crate::config::MergeConfig;
use crate::questions::{load_records, sort_by_sequence, QuestionRecord};
use std::path::PathBuf;

/// A numbered run of batch files, e.g. `tk10_batch_1_bilingual.json` ..= `_32_`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSet {
    pub dir: PathBuf,
    /// File name with `{n}` standing for the batch number
    pub template: String,
    pub first: u32,
    pub last: u32,
}

impl BatchSet {
    pub fn file_name(&self, n: u32) -> String {
        self.template.replace("{n}", &n.to_string())
    }

    /// File names in batch order
    pub fn file_names(&self) -> impl Iterator<Item = String> + '_ {
        (self.first..=self.last).map(|n| self.file_name(n))
    }
}

impl From<&MergeConfig> for BatchSet {
    fn from(config: &MergeConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            template: config.template.clone(),
            first: config.first,
            last: config.last,
        }
    }
}

/// Result of merging a batch set
#[derive(Debug, Default)]
pub struct MergeReport {
    /// All records, sorted by id sequence
    pub records: Vec<QuestionRecord>,
    /// Batch file names that did not exist
    pub missing: Vec<String>,
    /// Batch file names that could not be parsed, with the reason
    pub invalid: Vec<(String, String)>,
}

impl MergeReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }
}

/// Concatenate every batch in the set and sort by id sequence
///
/// Missing and unparsable batches are reported, not fatal.
pub fn merge_batches(set: &BatchSet) -> MergeReport {
    let mut report = MergeReport::default();

    for name in set.file_names() {
        let path = set.dir.join(&name);
        if !path.exists() {
            tracing::warn!("batch missing: {name}");
            report.missing.push(name);
            continue;
        }
        match load_records(&path) {
            Ok(records) => {
                tracing::debug!("{name}: {} questions", records.len());
                report.records.extend(records);
            }
            Err(e) => {
                tracing::warn!("skipping {name}: {e}");
                report.invalid.push((name, e.to_string()));
            }
        }
    }

    sort_by_sequence(&mut report.records);
    report
}
