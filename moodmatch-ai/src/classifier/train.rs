//! Offline training of the mood model from a catalog
//!
//! Full-batch gradient descent on the L2-regularised multinomial cross-entropy. The optimiser
//! works on standardised features for a well-conditioned step size, then folds the scaling back
//! into the weights so the saved model consumes raw feature vectors.

use super::{LabelEncoder, ModelError, MoodModel};
use crate::catalog::Catalog;
use moodmatch_common::FEATURE_DIM;
use tracing::{debug, info};

/// Training parameters
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Inverse regularisation strength
    pub c: f64,
    pub max_iter: usize,
    /// Stop once every gradient component is below this magnitude
    pub tolerance: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tolerance: 1e-6,
        }
    }
}

/// Fit the label encoder and model over every catalog row
pub fn train(
    catalog: &Catalog,
    options: &TrainOptions,
) -> Result<(MoodModel, LabelEncoder), ModelError> {
    if catalog.feature_width() != FEATURE_DIM {
        return Err(ModelError::Training(format!(
            "catalog has {} feature columns, expected {}",
            catalog.feature_width(),
            FEATURE_DIM
        )));
    }

    let samples: Vec<Vec<f64>> = catalog.entries.iter().map(|e| e.features.clone()).collect();
    let labels: Vec<&str> = catalog.entries.iter().map(|e| e.mood.as_str()).collect();
    fit(&samples, &labels, options)
}

/// Fit the label encoder and model over `samples` labelled by `labels`
pub fn fit(
    samples: &[Vec<f64>],
    labels: &[&str],
    options: &TrainOptions,
) -> Result<(MoodModel, LabelEncoder), ModelError> {
    if samples.len() != labels.len() {
        return Err(ModelError::Training(format!(
            "{} samples but {} labels",
            samples.len(),
            labels.len()
        )));
    }
    if !options.c.is_finite() || options.c <= 0.0 || options.max_iter == 0 {
        return Err(ModelError::Training(
            "C must be positive and max_iter non-zero".to_string(),
        ));
    }

    let encoder = LabelEncoder::fit(labels.iter().copied());
    if encoder.len() < 2 {
        return Err(ModelError::Training(format!(
            "need at least 2 distinct mood labels, found {}",
            encoder.len()
        )));
    }

    let n = samples.len();
    let d = samples[0].len();
    if samples.iter().any(|s| s.len() != d) {
        return Err(ModelError::Training(
            "samples have different lengths".to_string(),
        ));
    }
    let k = encoder.len();

    let targets: Vec<usize> = labels
        .iter()
        .map(|label| {
            encoder
                .transform(label)
                .ok_or_else(|| ModelError::Training(format!("unencodable label '{}'", label)))
        })
        .collect::<Result<_, _>>()?;

    let (means, scales) = column_stats(samples, d);
    let z: Vec<Vec<f64>> = samples
        .iter()
        .map(|s| {
            s.iter()
                .zip(means.iter().zip(&scales))
                .map(|(v, (m, sd))| (v - m) / sd)
                .collect()
        })
        .collect();

    // Cross-entropy Hessian is bounded by half the trace of the (bias-augmented) Gram matrix
    let regularisation = 1.0 / (options.c * n as f64);
    let step = 1.0 / (0.5 * (d as f64 + 1.0) + regularisation);

    let mut model = MoodModel::zeros(k, d);
    let mut iterations = 0;
    for iteration in 0..options.max_iter {
        iterations = iteration + 1;

        let mut grad_w = vec![vec![0.0; d]; k];
        let mut grad_b = vec![0.0; k];
        for (x, &y) in z.iter().zip(&targets) {
            let probs = model.predict_proba(x);
            for class in 0..k {
                let residual = probs[class] - if class == y { 1.0 } else { 0.0 };
                grad_b[class] += residual;
                for (g, v) in grad_w[class].iter_mut().zip(x) {
                    *g += residual * v;
                }
            }
        }

        let mut max_grad: f64 = 0.0;
        for class in 0..k {
            for j in 0..d {
                let g = grad_w[class][j] / n as f64 + regularisation * model.weights[class][j];
                model.weights[class][j] -= step * g;
                max_grad = max_grad.max(g.abs());
            }
            let g = grad_b[class] / n as f64;
            model.intercepts[class] -= step * g;
            max_grad = max_grad.max(g.abs());
        }

        if max_grad < options.tolerance {
            break;
        }
    }
    debug!(iterations = iterations, "Gradient descent finished");

    // Fold standardisation into raw-space weights
    for class in 0..k {
        let mut shift = 0.0;
        for j in 0..d {
            model.weights[class][j] /= scales[j];
            shift += model.weights[class][j] * means[j];
        }
        model.intercepts[class] -= shift;
    }
    model.validate()?;

    info!(
        samples = n,
        classes = k,
        iterations = iterations,
        "Mood model trained"
    );
    Ok((model, encoder))
}

/// Per-column mean and standard deviation (1.0 for constant columns)
fn column_stats(samples: &[Vec<f64>], d: usize) -> (Vec<f64>, Vec<f64>) {
    let n = samples.len().max(1) as f64;
    let mut means = vec![0.0; d];
    for s in samples {
        for (m, v) in means.iter_mut().zip(s) {
            *m += v / n;
        }
    }
    let mut scales = vec![0.0; d];
    for s in samples {
        for ((sd, v), m) in scales.iter_mut().zip(s).zip(&means) {
            *sd += (v - m).powi(2) / n;
        }
    }
    for sd in scales.iter_mut() {
        *sd = if *sd > 1e-24 { sd.sqrt() } else { 1.0 };
    }
    (means, scales)
}
