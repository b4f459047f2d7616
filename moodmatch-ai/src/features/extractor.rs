//! Feature Extractor
//!
//! Turns an audio file into the 30-dimensional feature vector plus a tempo estimate. The same
//! code path serves the offline catalog builder and the online query, so both produce the same
//! layout at the same analysis rate.

use super::frames::{frame_rms, frame_zero_crossing_rate, mean, std_dev};
use super::spectral::{SpectralAnalyzer, HOP_LENGTH, N_FFT};
use super::tempo::{estimate_tempo, onset_strength};
use crate::audio::{load_for_analysis, DEFAULT_MAX_DURATION_SECONDS};
use anyhow::{anyhow, Result};
use moodmatch_common::features::{self, FeatureVector, N_MFCC};
use std::path::Path;
use tracing::{debug, warn};

/// Result of a successful extraction
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Feature vector, [`moodmatch_common::FEATURE_DIM`] values in layout order
    pub features: FeatureVector,
    /// Estimated tempo in BPM (also stored at the tempo index of `features`)
    pub tempo: f64,
}

/// Audio feature extractor
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    max_duration_seconds: f64,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DURATION_SECONDS)
    }
}

impl FeatureExtractor {
    pub fn new(max_duration_seconds: f64) -> Self {
        Self {
            max_duration_seconds,
        }
    }

    pub fn max_duration_seconds(&self) -> f64 {
        self.max_duration_seconds
    }

    /// Extract features from an audio file
    ///
    /// Any decode or signal-processing failure is logged and reported as `None`; callers must
    /// treat that as "extraction failed", never as a zero vector.
    pub fn extract(&self, path: &Path) -> Option<Extraction> {
        match self.try_extract(path) {
            Ok(extraction) => Some(extraction),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Feature extraction failed");
                None
            }
        }
    }

    /// Extract features from an audio file, keeping the failure reason
    pub fn try_extract(&self, path: &Path) -> Result<Extraction> {
        let audio = load_for_analysis(path, self.max_duration_seconds)?;
        debug!(
            path = %path.display(),
            duration_seconds = format!("{:.2}", audio.duration_seconds),
            "Decoded audio for analysis"
        );
        extract_samples(&audio.samples, audio.sample_rate)
    }
}

/// Extract features from mono samples at `sample_rate`
pub fn extract_samples(samples: &[f32], sample_rate: u32) -> Result<Extraction> {
    // Centered framing yields at least one frame for any non-empty input
    if samples.is_empty() {
        return Err(anyhow!("Audio contains no samples"));
    }
    if samples.iter().any(|s| !s.is_finite()) {
        return Err(anyhow!("Audio contains non-finite samples"));
    }

    let analyzer = SpectralAnalyzer::new(sample_rate);
    let mel_db = analyzer.log_mel_spectrogram(samples)?;

    // MFCC mean and std (26 values)
    let mfcc_frames = analyzer.mfcc(&mel_db);
    let mut mfcc_mean = [0.0; N_MFCC];
    let mut mfcc_std = [0.0; N_MFCC];
    for coefficient in 0..N_MFCC {
        let track: Vec<f64> = mfcc_frames.iter().map(|frame| frame[coefficient]).collect();
        mfcc_mean[coefficient] = mean(&track);
        mfcc_std[coefficient] = std_dev(&track);
    }

    let tempo = estimate_tempo(&onset_strength(&mel_db), analyzer.frame_rate());

    let rms = frame_rms(samples, N_FFT, HOP_LENGTH);
    let zcr = frame_zero_crossing_rate(samples, N_FFT, HOP_LENGTH);

    let vector = features::assemble(
        &mfcc_mean,
        &mfcc_std,
        tempo,
        mean(&rms),
        std_dev(&rms),
        mean(&zcr),
    );

    if let Some(index) = vector.iter().position(|v| !v.is_finite()) {
        return Err(anyhow!("Non-finite feature at index {}", index));
    }

    debug!(
        frames = mfcc_frames.len(),
        tempo = format!("{:.1}", tempo),
        "Feature extraction complete"
    );

    Ok(Extraction {
        features: vector,
        tempo,
    })
}
