use crate::config::TranslateConfig;
use crate::error::{AssetError, Result};
use crate::questions::{
    load_records, sort_by_sequence, translate_record, write_records, LanguagePair,
    QuestionRecord, Translator,
};
use crate::types::RunSummary;
use crate::walker::{sorted, walk_files, FileFilter};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Log translation progress every this many records
const PROGRESS_INTERVAL: usize = 10;

fn build_pool(workers: usize) -> Result<rayon::ThreadPool> {
    if workers == 0 {
        return Err(AssetError::config("translation needs at least one worker"));
    }
    Ok(rayon::ThreadPoolBuilder::new().num_threads(workers).build()?)
}

/// Translate a batch of records on a bounded worker pool
///
/// Records complete in any order; the result is re-sorted by id sequence so
/// output order never depends on worker scheduling. A record whose fields
/// fail to translate keeps the original text for those fields.
///
/// # Arguments
/// * `records` - Source records
/// * `translator` - Shared translation backend
/// * `langs` - Source and target languages
/// * `workers` - Number of concurrent translations
pub fn translate_batch(
    records: &[QuestionRecord],
    translator: &dyn Translator,
    langs: &LanguagePair,
    workers: usize,
) -> Result<Vec<QuestionRecord>> {
    let pool = build_pool(workers)?;
    let done = AtomicUsize::new(0);
    let total = records.len();

    let mut translated: Vec<QuestionRecord> = pool.install(|| {
        records
            .par_iter()
            .map(|record| {
                let result = translate_record(record, translator, langs);
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                if finished % PROGRESS_INTERVAL == 0 {
                    tracing::info!("translated {finished}/{total} records");
                }
                result
            })
            .collect()
    });

    sort_by_sequence(&mut translated);
    Ok(translated)
}

/// Output path for a source batch: same name with the configured prefix
pub fn translated_path(config: &TranslateConfig, source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    config
        .target_dir
        .join(format!("{}{}", config.output_prefix, name))
}

/// Translate every batch file in `source_dir`, then write the merged set
///
/// The merged set holds every batch's records in batch file order; each
/// batch is already sorted on its own. Batches that already have an output
/// file are loaded instead of translated, so an interrupted run resumes where
/// it stopped. A batch that cannot be read or written is logged and counted
/// as errored.
pub fn translate_files(config: &TranslateConfig, translator: &dyn Translator) -> Result<RunSummary> {
    let filter = FileFilter::pattern(&config.pattern)?;
    let sources: Vec<PathBuf> = sorted(walk_files(&config.source_dir, filter))
        .into_iter()
        .map(|record| record.path)
        .filter(|p| p.parent() == Some(config.source_dir.as_path()))
        .collect();
    let langs = LanguagePair::new(&config.source_lang, &config.target_lang);

    tracing::info!(
        "translating {} batches {} -> {}",
        sources.len(),
        langs.source,
        langs.target
    );

    let mut summary = RunSummary::default();
    let mut merged = Vec::new();

    for (index, source) in sources.iter().enumerate() {
        let output = translated_path(config, source);

        if output.exists() {
            match load_records(&output) {
                Ok(records) => {
                    tracing::info!("already translated: {}", output.display());
                    merged.extend(records);
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("retranslating unreadable {}: {e}", output.display());
                }
            }
        }

        let result = load_records(source)
            .and_then(|records| translate_batch(&records, translator, &langs, config.workers))
            .and_then(|translated| {
                write_records(&output, &translated)?;
                Ok(translated)
            });

        match result {
            Ok(translated) => {
                tracing::info!("{} -> {}", source.display(), output.display());
                merged.extend(translated);
                summary.processed += 1;
            }
            Err(e) => {
                tracing::error!("failed to translate {}: {e}", source.display());
                summary.errored += 1;
            }
        }

        if index + 1 < sources.len() && config.pause_ms > 0 {
            thread::sleep(Duration::from_millis(config.pause_ms));
        }
    }

    write_records(&config.merged_output, &merged)?;
    tracing::info!(
        "wrote {} records to {}",
        merged.len(),
        config.merged_output.display()
    );

    Ok(summary)
}
