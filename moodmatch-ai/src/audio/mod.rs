//! Audio input: decoding to mono PCM and resampling to the analysis rate

pub mod decoder;
pub mod resampler;

pub use decoder::{decode_audio_file, DecodedAudio, DEFAULT_MAX_DURATION_SECONDS};
pub use resampler::{resample_mono, ANALYSIS_SAMPLE_RATE};

use anyhow::Result;
use std::path::Path;

/// Decode at most `max_duration_seconds` of a file and resample it to [`ANALYSIS_SAMPLE_RATE`]
pub fn load_for_analysis(path: &Path, max_duration_seconds: f64) -> Result<DecodedAudio> {
    let decoded = decode_audio_file(path, max_duration_seconds)?;
    let samples = resample_mono(&decoded.samples, decoded.sample_rate, ANALYSIS_SAMPLE_RATE)?;
    let duration_seconds = samples.len() as f64 / ANALYSIS_SAMPLE_RATE as f64;

    Ok(DecodedAudio {
        samples,
        sample_rate: ANALYSIS_SAMPLE_RATE,
        channels: decoded.channels,
        duration_seconds,
    })
}
