//! Short-time spectral analysis: STFT, mel filterbank, log-mel and MFCC
//!
//! Frames are centered (zero padded by `n_fft / 2` on both sides) and Hann windowed. The mel
//! filterbank uses the Slaney mel scale with area normalisation, and MFCCs are the orthonormal
//! DCT-II of the log-mel frames.

use anyhow::{anyhow, Result};
use moodmatch_common::features::N_MFCC;
use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::f64::consts::PI;
use std::sync::Arc;

pub const N_FFT: usize = 2048;
pub const HOP_LENGTH: usize = 512;
pub const N_MELS: usize = 128;

/// Floor applied before taking the logarithm of a power value
const AMIN: f64 = 1e-10;
/// Dynamic range kept below the loudest bin of the log-mel spectrogram
const TOP_DB: f64 = 80.0;

/// Precomputed window, FFT plan, mel filterbank and DCT basis for one sample rate
pub struct SpectralAnalyzer {
    sample_rate: u32,
    window: Vec<f64>,
    fft: Arc<dyn RealToComplex<f64>>,
    mel_basis: Vec<Vec<f64>>,
    dct_basis: Vec<Vec<f64>>,
}

impl SpectralAnalyzer {
    pub fn new(sample_rate: u32) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        Self {
            sample_rate,
            window: hann_window(N_FFT),
            fft: planner.plan_fft_forward(N_FFT),
            mel_basis: mel_filterbank(sample_rate, N_FFT, N_MELS, 0.0, sample_rate as f64 / 2.0),
            dct_basis: dct_ortho_basis(N_MFCC, N_MELS),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames per second of the spectrogram
    pub fn frame_rate(&self) -> f64 {
        self.sample_rate as f64 / HOP_LENGTH as f64
    }

    /// Power spectrogram, `[frame][bin]` with `N_FFT / 2 + 1` bins per frame
    pub fn power_spectrogram(&self, samples: &[f32]) -> Result<Vec<Vec<f64>>> {
        let pad = N_FFT / 2;
        let mut padded = vec![0.0f64; samples.len() + 2 * pad];
        for (dst, &src) in padded[pad..pad + samples.len()].iter_mut().zip(samples) {
            *dst = src as f64;
        }

        let n_frames = 1 + (padded.len() - N_FFT) / HOP_LENGTH;
        let mut input = self.fft.make_input_vec();
        let mut spectrum: Vec<Complex<f64>> = self.fft.make_output_vec();
        let mut frames = Vec::with_capacity(n_frames);

        for frame_idx in 0..n_frames {
            let start = frame_idx * HOP_LENGTH;
            for (i, slot) in input.iter_mut().enumerate() {
                *slot = padded[start + i] * self.window[i];
            }
            self.fft
                .process(&mut input, &mut spectrum)
                .map_err(|e| anyhow!("FFT failed: {}", e))?;
            frames.push(spectrum.iter().map(|c| c.norm_sqr()).collect());
        }

        Ok(frames)
    }

    /// Log-mel spectrogram in dB, `[frame][mel band]`
    pub fn log_mel_spectrogram(&self, samples: &[f32]) -> Result<Vec<Vec<f64>>> {
        let power = self.power_spectrogram(samples)?;

        let mut mel_db: Vec<Vec<f64>> = power
            .iter()
            .map(|frame| {
                self.mel_basis
                    .iter()
                    .map(|filter| {
                        let energy: f64 = filter.iter().zip(frame).map(|(w, p)| w * p).sum();
                        10.0 * energy.max(AMIN).log10()
                    })
                    .collect()
            })
            .collect();

        let peak = mel_db
            .iter()
            .flat_map(|frame| frame.iter().copied())
            .fold(f64::NEG_INFINITY, f64::max);
        if peak.is_finite() {
            let floor = peak - TOP_DB;
            for value in mel_db.iter_mut().flat_map(|frame| frame.iter_mut()) {
                *value = value.max(floor);
            }
        }

        Ok(mel_db)
    }

    /// MFCCs of each log-mel frame, `[frame][coefficient]`
    pub fn mfcc(&self, mel_db: &[Vec<f64>]) -> Vec<[f64; N_MFCC]> {
        mel_db
            .iter()
            .map(|frame| {
                let mut coefficients = [0.0; N_MFCC];
                for (c, basis) in coefficients.iter_mut().zip(&self.dct_basis) {
                    *c = basis.iter().zip(frame).map(|(b, x)| b * x).sum();
                }
                coefficients
            })
            .collect()
    }
}

/// Periodic Hann window
pub fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / size as f64).cos())
        .collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    const F_SP: f64 = 200.0 / 3.0;
    const MIN_LOG_HZ: f64 = 1000.0;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let log_step = 6.4f64.ln() / 27.0;

    if hz >= MIN_LOG_HZ {
        min_log_mel + (hz / MIN_LOG_HZ).ln() / log_step
    } else {
        hz / F_SP
    }
}

fn mel_to_hz(mel: f64) -> f64 {
    const F_SP: f64 = 200.0 / 3.0;
    const MIN_LOG_HZ: f64 = 1000.0;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let log_step = 6.4f64.ln() / 27.0;

    if mel >= min_log_mel {
        MIN_LOG_HZ * (log_step * (mel - min_log_mel)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular mel filters over the `n_fft / 2 + 1` FFT bins, Slaney-normalised
pub fn mel_filterbank(
    sample_rate: u32,
    n_fft: usize,
    n_mels: usize,
    fmin: f64,
    fmax: f64,
) -> Vec<Vec<f64>> {
    let n_bins = n_fft / 2 + 1;
    let fft_freqs: Vec<f64> = (0..n_bins)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect();

    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);
    let hz_points: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64))
        .collect();

    (0..n_mels)
        .map(|m| {
            let (left, center, right) = (hz_points[m], hz_points[m + 1], hz_points[m + 2]);
            let norm = 2.0 / (right - left);
            fft_freqs
                .iter()
                .map(|&f| {
                    let lower = (f - left) / (center - left);
                    let upper = (right - f) / (right - center);
                    lower.min(upper).max(0.0) * norm
                })
                .collect()
        })
        .collect()
}

/// Orthonormal DCT-II basis, `n_out` rows of length `n_in`
fn dct_ortho_basis(n_out: usize, n_in: usize) -> Vec<Vec<f64>> {
    let n = n_in as f64;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (0..n_in)
                .map(|i| scale * (PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
        let n = (seconds * sample_rate as f32) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.5
            })
            .collect()
    }

    #[test]
    fn test_mel_scale_round_trip_points() {
        for hz in [0.0, 440.0, 1000.0, 4000.0, 11025.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_filterbank_shape_and_nonnegative() {
        let bank = mel_filterbank(22050, N_FFT, N_MELS, 0.0, 11025.0);
        assert_eq!(bank.len(), N_MELS);
        assert!(bank.iter().all(|f| f.len() == N_FFT / 2 + 1));
        assert!(bank.iter().flatten().all(|&w| w >= 0.0));
        // Every filter covers at least one bin
        assert!(bank.iter().all(|f| f.iter().any(|&w| w > 0.0)));
    }

    #[test]
    fn test_frame_count_is_centered() {
        let analyzer = SpectralAnalyzer::new(22050);
        let samples = vec![0.0f32; 22050];
        let power = analyzer.power_spectrogram(&samples).unwrap();
        assert_eq!(power.len(), 1 + 22050 / HOP_LENGTH);
    }

    #[test]
    fn test_sine_energy_lands_in_expected_bin() {
        let analyzer = SpectralAnalyzer::new(22050);
        let samples = sine(1000.0, 1.0, 22050);
        let power = analyzer.power_spectrogram(&samples).unwrap();
        let middle = &power[power.len() / 2];

        let peak_bin = middle
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        let expected = (1000.0 * N_FFT as f64 / 22050.0).round() as usize;
        assert!((peak_bin as i64 - expected as i64).abs() <= 1);
    }

    #[test]
    fn test_log_mel_respects_top_db() {
        let analyzer = SpectralAnalyzer::new(22050);
        let mel_db = analyzer.log_mel_spectrogram(&sine(440.0, 1.0, 22050)).unwrap();
        let values: Vec<f64> = mel_db.iter().flatten().copied().collect();
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(max - min <= TOP_DB + 1e-9);
    }

    #[test]
    fn test_mfcc_of_constant_frame_is_only_c0() {
        let analyzer = SpectralAnalyzer::new(22050);
        let frame = vec![vec![-20.0; N_MELS]];
        let mfcc = analyzer.mfcc(&frame);

        assert!((mfcc[0][0] - (-20.0 * (N_MELS as f64).sqrt())).abs() < 1e-9);
        assert!(mfcc[0][1..].iter().all(|c| c.abs() < 1e-9));
    }
}
