//! Placeholder sound generation
//!
//! Renders short sine tones and chords to mono 16-bit WAV files so the app
//! has working sound effects and a music loop before real audio is produced.

pub mod synth;
pub mod wav;

pub use synth::{synthesize, ToneSpec, Vibrato, FADE_SAMPLES, SAMPLE_RATE};
pub use wav::{encode_wav, write_wav};

use crate::error::Result;
use crate::types::RunSummary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A tone and the file it is written to, relative to the output directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTone {
    pub file: PathBuf,
    #[serde(flatten)]
    pub spec: ToneSpec,
}

impl NamedTone {
    pub fn new(file: impl Into<PathBuf>, spec: ToneSpec) -> Self {
        Self {
            file: file.into(),
            spec,
        }
    }
}

/// The app's stock sound set
pub fn default_bank() -> Vec<NamedTone> {
    vec![
        NamedTone::new("sfx/click.wav", ToneSpec::new(&[1200.0], 0.05, 0.3)),
        NamedTone::new("sfx/pop.wav", ToneSpec::new(&[600.0], 0.08, 0.4)),
        // C major triad
        NamedTone::new(
            "sfx/success.wav",
            ToneSpec::new(&[523.25, 659.25, 783.99], 0.4, 0.5),
        ),
        // Cmaj7 drone, low volume for background
        NamedTone::new(
            "music/cozy_lofi.wav",
            ToneSpec::new(&[261.63, 329.63, 392.0, 493.88], 4.0, 0.2),
        ),
    ]
}

/// Render every tone into `output_dir`
///
/// A tone that fails to write is logged and counted; the rest are still
/// generated.
pub fn generate_bank(output_dir: &Path, tones: &[NamedTone]) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for tone in tones {
        let path = output_dir.join(&tone.file);
        let samples = synthesize(&tone.spec);
        match write_wav(&path, &samples, SAMPLE_RATE) {
            Ok(()) => {
                tracing::info!(samples = samples.len(), "generated {}", path.display());
                summary.processed += 1;
            }
            Err(e) => {
                tracing::error!("failed to write {}: {e}", path.display());
                summary.errored += 1;
            }
        }
    }

    Ok(summary)
}
