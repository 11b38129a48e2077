//! Quiz question batches: translation and merging
//!
//! Batch files are JSON arrays of [`QuestionRecord`]s. Translation runs each
//! batch through a [`Translator`] on a small worker pool and writes a
//! prefixed copy; merging concatenates a numbered run of batches. Both keep
//! records ordered by the numeric suffix of their id.

pub mod batch;
pub mod merge;
pub mod record;
pub mod translate;

pub use batch::{translate_batch, translate_files, translated_path};
pub use merge::{merge_batches, BatchSet, MergeReport};
pub use record::{
    id_sequence, load_records, sort_by_sequence, write_records, QuestionRecord,
    MALFORMED_ID_SEQUENCE,
};
pub use translate::{
    translate_compound, translate_record, translate_text, GoogleWeb, LanguagePair,
    LibreTranslate, Tagging, Translator,
};

use crate::config::{Provider, TranslateConfig};
use crate::error::Result;

/// Build the translator selected in the configuration
pub fn build_translator(config: &TranslateConfig) -> Result<Box<dyn Translator>> {
    Ok(match config.provider {
        Provider::Google => Box::new(GoogleWeb::new()?),
        Provider::Libre => Box::new(LibreTranslate::new(&config.libre_url)?),
        Provider::Tagging => Box::new(Tagging),
    })
}
