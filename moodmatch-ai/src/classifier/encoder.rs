//! Label encoder: mood label strings ↔ class indices

use super::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Sorted, unique class labels; a label's position is its class index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit over a set of labels
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class index for `label`
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
    }

    /// Label for class index `index`
    pub fn inverse_transform(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let encoder: Self = serde_json::from_str(&content)?;

        if !encoder.classes.windows(2).all(|w| w[0] < w[1]) {
            return Err(ModelError::Inconsistent(
                "label encoder classes must be sorted and unique".to_string(),
            ));
        }
        Ok(encoder)
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        super::model::write_json(path, self)
    }
}
