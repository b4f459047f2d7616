//! Global tempo estimation
//!
//! Onset strength is the band-averaged positive first difference of the log-mel spectrogram.
//! The tempo is the autocorrelation lag of that envelope with the highest score after weighting
//! by a log-normal prior around 120 BPM.

use super::frames::mean;

/// Centre of the tempo prior
const PRIOR_BPM: f64 = 120.0;
/// Width of the tempo prior, in octaves
const PRIOR_STD_OCTAVES: f64 = 1.0;
const MIN_BPM: f64 = 30.0;
const MAX_BPM: f64 = 320.0;

/// Onset strength per frame; frame 0 is always 0.0
pub fn onset_strength(mel_db: &[Vec<f64>]) -> Vec<f64> {
    let mut envelope = Vec::with_capacity(mel_db.len());
    if mel_db.is_empty() {
        return envelope;
    }

    envelope.push(0.0);
    for pair in mel_db.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let bands = cur.len().max(1) as f64;
        let flux: f64 = cur
            .iter()
            .zip(prev)
            .map(|(c, p)| (c - p).max(0.0))
            .sum();
        envelope.push(flux / bands);
    }
    envelope
}

/// Estimate the tempo in BPM from an onset envelope sampled at `frame_rate` frames per second.
///
/// Returns 0.0 when the envelope has no periodic structure (silence, a constant tone, or a
/// clip too short to hold two beats at the slowest tempo considered).
pub fn estimate_tempo(envelope: &[f64], frame_rate: f64) -> f64 {
    if envelope.len() < 4 || !frame_rate.is_finite() || frame_rate <= 0.0 {
        return 0.0;
    }

    let m = mean(envelope);
    let centered: Vec<f64> = envelope.iter().map(|&v| v - m).collect();
    let energy: f64 = centered.iter().map(|v| v * v).sum();
    if energy <= f64::EPSILON {
        return 0.0;
    }

    let min_lag = ((60.0 * frame_rate / MAX_BPM).ceil() as usize).max(1);
    let max_lag = ((60.0 * frame_rate / MIN_BPM).floor() as usize).min(envelope.len() - 2);
    if min_lag > max_lag {
        return 0.0;
    }

    let mut best: Option<(usize, f64)> = None;
    for lag in min_lag..=max_lag {
        let overlap = centered.len() - lag;
        let correlation: f64 = centered[..overlap]
            .iter()
            .zip(&centered[lag..])
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / overlap as f64;

        let bpm = lag_to_bpm(lag, frame_rate);
        let score = correlation * tempo_prior(bpm);
        if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((lag, score));
        }
    }

    best.map(|(lag, _)| lag_to_bpm(lag, frame_rate)).unwrap_or(0.0)
}

fn lag_to_bpm(lag: usize, frame_rate: f64) -> f64 {
    60.0 * frame_rate / lag as f64
}

fn tempo_prior(bpm: f64) -> f64 {
    let z = (bpm.log2() - PRIOR_BPM.log2()) / PRIOR_STD_OCTAVES;
    (-0.5 * z * z).exp()
}
