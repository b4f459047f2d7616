//! Frame-wise time-domain features (RMS energy, zero-crossing rate) and reductions

/// Amplitudes at or below this magnitude count as zero when looking for sign changes
const ZERO_THRESHOLD: f32 = 1e-10;

/// Split `samples` into centered frames and apply `f` to each.
///
/// Frames are padded by `frame_length / 2` on both sides using `pad`.
fn map_centered_frames<F>(
    samples: &[f32],
    frame_length: usize,
    hop_length: usize,
    pad: Padding,
    mut f: F,
) -> Vec<f64>
where
    F: FnMut(&[f32]) -> f64,
{
    if samples.is_empty() || frame_length == 0 || hop_length == 0 {
        return Vec::new();
    }

    let half = frame_length / 2;
    let (head, tail) = match pad {
        Padding::Zero => (0.0, 0.0),
        Padding::Edge => (samples[0], samples[samples.len() - 1]),
    };

    let mut padded = Vec::with_capacity(samples.len() + 2 * half);
    padded.extend(std::iter::repeat(head).take(half));
    padded.extend_from_slice(samples);
    padded.extend(std::iter::repeat(tail).take(half));

    if padded.len() < frame_length {
        return Vec::new();
    }

    let n_frames = 1 + (padded.len() - frame_length) / hop_length;
    (0..n_frames)
        .map(|i| f(&padded[i * hop_length..i * hop_length + frame_length]))
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Padding {
    Zero,
    Edge,
}

/// Root-mean-square energy per frame
pub fn frame_rms(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f64> {
    map_centered_frames(samples, frame_length, hop_length, Padding::Zero, |frame| {
        let sum_squares: f64 = frame.iter().map(|&s| (s as f64).powi(2)).sum();
        (sum_squares / frame.len() as f64).sqrt()
    })
}

/// Fraction of adjacent-sample sign changes per frame
///
/// Zero is treated as positive, and values within [`ZERO_THRESHOLD`] of zero are zero.
pub fn frame_zero_crossing_rate(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f64> {
    map_centered_frames(samples, frame_length, hop_length, Padding::Edge, |frame| {
        let negative = |s: f32| s < -ZERO_THRESHOLD;
        let crossings = frame
            .windows(2)
            .filter(|w| negative(w[0]) != negative(w[1]))
            .count();
        crossings as f64 / frame.len() as f64
    })
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0.0 for an empty slice
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
