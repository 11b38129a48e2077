use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Output sample rate in Hz
pub const SAMPLE_RATE: u32 = 44_100;

/// Length of the linear fade-in and fade-out, in samples
pub const FADE_SAMPLES: usize = 2000;

/// Slow frequency wobble applied to every partial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vibrato {
    /// LFO rate in Hz
    pub rate_hz: f64,
    /// Relative frequency deviation (0.005 = ±0.5%)
    pub depth: f64,
}

impl Default for Vibrato {
    fn default() -> Self {
        Self {
            rate_hz: 3.0,
            depth: 0.005,
        }
    }
}

fn default_vibrato() -> Option<Vibrato> {
    Some(Vibrato::default())
}

/// Parameters of one synthesized tone or chord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    /// Partials in Hz, mixed with equal weight
    pub frequencies: Vec<f64>,
    pub duration_secs: f64,
    /// Peak gain in 0.0..=1.0
    pub volume: f64,
    #[serde(default = "default_vibrato")]
    pub vibrato: Option<Vibrato>,
}

impl ToneSpec {
    pub fn new(frequencies: &[f64], duration_secs: f64, volume: f64) -> Self {
        Self {
            frequencies: frequencies.to_vec(),
            duration_secs,
            volume,
            vibrato: default_vibrato(),
        }
    }

    /// Disable the vibrato LFO (pure sine partials)
    pub fn without_vibrato(mut self) -> Self {
        self.vibrato = None;
        self
    }

    /// Number of samples this tone renders to
    pub fn sample_count(&self) -> usize {
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return 0;
        }
        (self.duration_secs * f64::from(SAMPLE_RATE)) as usize
    }
}

/// Render a tone to mono 16-bit PCM at [`SAMPLE_RATE`]
///
/// Each sample is the mean of the partials, scaled by `volume`, shaped by the
/// fade envelope, truncated toward zero and clamped to the `i16` range. An
/// empty frequency list renders silence of the requested length.
///
/// # Examples
/// ```
/// use assetprep::audio::{synthesize, ToneSpec};
///
/// let samples = synthesize(&ToneSpec::new(&[1200.0], 0.05, 0.3));
/// assert_eq!(samples.len(), 2205);
/// ```
pub fn synthesize(spec: &ToneSpec) -> Vec<i16> {
    let n = spec.sample_count();
    let rate = f64::from(SAMPLE_RATE);
    let mut samples = Vec::with_capacity(n);

    for i in 0..n {
        let t = i as f64 / rate;
        let mix = if spec.frequencies.is_empty() {
            0.0
        } else {
            let lfo = spec
                .vibrato
                .map(|v| 1.0 + v.depth * (TAU * v.rate_hz * t).sin())
                .unwrap_or(1.0);
            let sum: f64 = spec
                .frequencies
                .iter()
                .map(|f| (TAU * f * lfo * t).sin())
                .sum();
            sum / spec.frequencies.len() as f64
        };

        let value = mix * spec.volume * 32767.0 * envelope(i, n);
        samples.push(to_i16(value));
    }

    samples
}

/// Linear fade gain for sample `i` of `n`
///
/// When the buffer is shorter than both fades the ramps overlap and the
/// smaller gain wins.
fn envelope(i: usize, n: usize) -> f64 {
    let fade = FADE_SAMPLES as f64;
    let fade_in = i as f64 / fade;
    let fade_out = (n - i) as f64 / fade;
    fade_in.min(fade_out).min(1.0)
}

fn to_i16(value: f64) -> i16 {
    if value.is_nan() {
        return 0;
    }
    value.trunc().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}
