//! Mood Classifier
//!
//! Wraps the pretrained model and label encoder artifacts. Both are loaded once at startup and
//! checked against each other and against the feature layout; a service with inconsistent
//! artifacts refuses to start rather than failing at the first query.

pub mod encoder;
pub mod model;
pub mod policy;
pub mod train;

pub use encoder::LabelEncoder;
pub use model::MoodModel;
pub use policy::{
    apply_threshold, mood_display, MoodDisplay, DEFAULT_CONFIDENCE_THRESHOLD, UNCERTAIN_LABEL,
};
pub use train::{train, TrainOptions};

use moodmatch_common::FEATURE_DIM;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Model artifact file name inside the model directory
pub const MODEL_FILE: &str = "mood_model.json";

/// Label encoder artifact file name inside the model directory
pub const ENCODER_FILE: &str = "label_encoder.json";

/// Classifier artifact errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Artifact could not be read or written
    #[error("Model artifact I/O error {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact is not valid JSON for its type
    #[error("Model artifact JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Artifacts disagree with each other or with the feature layout
    #[error("Inconsistent model artifacts: {0}")]
    Inconsistent(String),

    /// Input vector has the wrong width
    #[error("Classifier expects {expected} features, got {actual}")]
    InputWidth { expected: usize, actual: usize },

    /// Training could not run
    #[error("Training failed: {0}")]
    Training(String),
}

/// Outcome of classifying one feature vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodPrediction {
    /// Reported label: the top class, or [`UNCERTAIN_LABEL`] below the threshold
    pub label: String,
    /// Top-scoring class, before the threshold policy
    pub class_label: String,
    /// Probability of the top class, in [0, 1]
    pub confidence: f64,
}

impl MoodPrediction {
    pub fn is_uncertain(&self) -> bool {
        self.label == UNCERTAIN_LABEL
    }
}

/// Pretrained mood classifier
#[derive(Debug, Clone)]
pub struct MoodClassifier {
    model: MoodModel,
    encoder: LabelEncoder,
}

impl MoodClassifier {
    /// Pair a model with its encoder, enforcing consistency
    pub fn from_parts(model: MoodModel, encoder: LabelEncoder) -> Result<Self, ModelError> {
        model.validate()?;

        if encoder.is_empty() {
            return Err(ModelError::Inconsistent(
                "label encoder has no classes".to_string(),
            ));
        }
        if encoder.len() != model.n_classes() {
            return Err(ModelError::Inconsistent(format!(
                "label encoder has {} classes, model has {}",
                encoder.len(),
                model.n_classes()
            )));
        }
        if model.n_features() != FEATURE_DIM {
            return Err(ModelError::Inconsistent(format!(
                "model expects {} features, extractor produces {}",
                model.n_features(),
                FEATURE_DIM
            )));
        }

        Ok(Self { model, encoder })
    }

    /// Load and cross-check both artifacts
    pub fn load(model_path: &Path, encoder_path: &Path) -> Result<Self, ModelError> {
        let model = MoodModel::load(model_path)?;
        let encoder = LabelEncoder::load(encoder_path)?;
        let classifier = Self::from_parts(model, encoder)?;

        info!(
            model = %model_path.display(),
            classes = ?classifier.encoder.classes(),
            "Mood classifier loaded"
        );
        Ok(classifier)
    }

    /// Load [`MODEL_FILE`] and [`ENCODER_FILE`] from `model_dir`
    pub fn load_dir(model_dir: &Path) -> Result<Self, ModelError> {
        Self::load(&model_dir.join(MODEL_FILE), &model_dir.join(ENCODER_FILE))
    }

    /// Write both artifacts into `model_dir`
    pub fn save_dir(&self, model_dir: &Path) -> Result<(), ModelError> {
        self.model.save(&model_dir.join(MODEL_FILE))?;
        self.encoder.save(&model_dir.join(ENCODER_FILE))
    }

    pub fn classes(&self) -> &[String] {
        self.encoder.classes()
    }

    /// Classify with [`DEFAULT_CONFIDENCE_THRESHOLD`]
    pub fn classify(&self, features: &[f64]) -> Result<MoodPrediction, ModelError> {
        self.classify_with_threshold(features, DEFAULT_CONFIDENCE_THRESHOLD)
    }

    /// Classify, reporting [`UNCERTAIN_LABEL`] when confidence is below `threshold`
    pub fn classify_with_threshold(
        &self,
        features: &[f64],
        threshold: f64,
    ) -> Result<MoodPrediction, ModelError> {
        if features.len() != self.model.n_features() {
            return Err(ModelError::InputWidth {
                expected: self.model.n_features(),
                actual: features.len(),
            });
        }

        let probs = self.model.predict_proba(features);
        let (index, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, p)| if p > best.1 { (i, p) } else { best });

        let class_label = self
            .encoder
            .inverse_transform(index)
            .ok_or_else(|| ModelError::Inconsistent(format!("no label for class {}", index)))?
            .to_string();
        let confidence = confidence.clamp(0.0, 1.0);
        let label = apply_threshold(&class_label, confidence, threshold).to_string();

        Ok(MoodPrediction {
            label,
            class_label,
            confidence,
        })
    }
}
