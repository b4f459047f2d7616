//! Audio resampling using rubato
//!
//! Every file is analysed at the same rate so catalog vectors and query vectors are
//! comparable regardless of the source sample rate.

use anyhow::{anyhow, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::debug;

/// Sample rate all feature extraction runs at
pub const ANALYSIS_SAMPLE_RATE: u32 = 22050;

/// Resample mono audio from `input_rate` to `output_rate`
///
/// Returns a copy when the rates already match.
pub fn resample_mono(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate || input.is_empty() {
        return Ok(input.to_vec());
    }
    if input_rate == 0 {
        return Err(anyhow!("Invalid input sample rate: 0"));
    }

    debug!("Resampling from {}Hz to {}Hz", input_rate, output_rate);

    let input_frames = input.len();
    let mut resampler = FastFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        1.0, // max_relative_ratio (no runtime changes)
        PolynomialDegree::Septic,
        input_frames,
        1,
    )
    .map_err(|e| anyhow!("Failed to create resampler: {}", e))?;

    let planar_input = vec![input.to_vec()];
    let mut planar_output = resampler
        .process(&planar_input, None)
        .map_err(|e| anyhow!("Resampling failed: {}", e))?;

    let output = planar_output.pop().unwrap_or_default();

    debug!(
        "Resampled {} input frames to {} output frames",
        input_frames,
        output.len()
    );

    Ok(output)
}
