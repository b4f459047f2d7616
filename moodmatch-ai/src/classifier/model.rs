//! Multinomial logistic regression model

use super::ModelError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Linear model over the feature space; one weight row and intercept per class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodModel {
    pub weights: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl MoodModel {
    /// All-zero model (uniform probabilities)
    pub fn zeros(n_classes: usize, n_features: usize) -> Self {
        Self {
            weights: vec![vec![0.0; n_features]; n_classes],
            intercepts: vec![0.0; n_classes],
        }
    }

    pub fn n_classes(&self) -> usize {
        self.intercepts.len()
    }

    pub fn n_features(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    /// Check shape and finiteness
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.weights.len() != self.intercepts.len() {
            return Err(ModelError::Inconsistent(format!(
                "model has {} weight rows but {} intercepts",
                self.weights.len(),
                self.intercepts.len()
            )));
        }
        let width = self.n_features();
        if self.weights.iter().any(|row| row.len() != width) {
            return Err(ModelError::Inconsistent(
                "model weight rows have different lengths".to_string(),
            ));
        }
        let finite = self
            .weights
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|v| v.is_finite());
        if !finite {
            return Err(ModelError::Inconsistent(
                "model contains non-finite parameters".to_string(),
            ));
        }
        Ok(())
    }

    /// Raw class scores
    pub fn decision_function(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
            .collect()
    }

    /// Class probabilities (softmax of the class scores); sums to 1
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        softmax(&self.decision_function(x))
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_str(&content)?;
        model.validate()?;
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        write_json(path, self)
    }
}

/// Numerically stable softmax
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Pretty-print `value` as JSON to `path`, creating parent directories
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ModelError> {
    let io_err = |source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(io_err)
}
