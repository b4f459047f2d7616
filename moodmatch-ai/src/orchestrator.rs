//! Orchestrator
//!
//! Runs Extractor → Classifier → Matcher for one query and turns the outcome into the display
//! contract consumed by the presentation layer. Every path ends in a well-defined display state;
//! only the query log is allowed to fail silently.

use crate::classifier::{
    mood_display, MoodClassifier, MoodPrediction, DEFAULT_CONFIDENCE_THRESHOLD,
};
use crate::db;
use crate::features::{Extraction, FeatureExtractor};
use crate::matcher::{self, MatchError, Recommendation, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

const ERROR_COLOR: &str = "#EF4444";
const ERROR_ICON: &str = "❌";
const NO_RECOMMENDATIONS: &str = "No recommendations";
const RECOMMENDATIONS_UNAVAILABLE: &str = "Unable to load recommendations";

/// Which kind of result is being displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayState {
    /// No file selected yet
    Waiting,
    /// Extraction or an unexpected failure
    Error,
    /// Classified below the confidence threshold
    Uncertain,
    Classified,
}

/// Query result as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDisplay {
    pub state: DisplayState,
    /// Mood display name
    pub mood: String,
    /// Confidence as a whole percentage, e.g. "87%"
    pub confidence: String,
    /// Tempo rounded to whole BPM
    pub bpm: String,
    /// Bulleted track list, or a placeholder message
    pub tracks: String,
    pub color: String,
    pub icon: String,
}

impl AnalysisDisplay {
    /// Nothing to analyse yet
    pub fn waiting() -> Self {
        Self {
            state: DisplayState::Waiting,
            mood: "Waiting".to_string(),
            confidence: "0%".to_string(),
            bpm: "0".to_string(),
            tracks: "Upload an audio file".to_string(),
            color: "#6B7280".to_string(),
            icon: "⏳".to_string(),
        }
    }

    /// The audio could not be decoded or analysed
    pub fn extraction_failed() -> Self {
        Self::error("Failed to process")
    }

    /// Catch-all for anything else that went wrong
    pub fn failed() -> Self {
        Self::error("An error occurred")
    }

    fn error(message: &str) -> Self {
        Self {
            state: DisplayState::Error,
            mood: "Error".to_string(),
            confidence: "0%".to_string(),
            bpm: "0".to_string(),
            tracks: message.to_string(),
            color: ERROR_COLOR.to_string(),
            icon: ERROR_ICON.to_string(),
        }
    }

    fn classified(
        prediction: &MoodPrediction,
        tempo: f64,
        recommendations: &Result<Vec<Recommendation>, MatchError>,
    ) -> Self {
        let display = mood_display(&prediction.label);
        let state = if prediction.is_uncertain() {
            DisplayState::Uncertain
        } else {
            DisplayState::Classified
        };

        Self {
            state,
            mood: display.name,
            confidence: format!("{:.0}%", prediction.confidence * 100.0),
            bpm: format!("{:.0}", tempo),
            tracks: format_tracks(recommendations),
            color: display.color,
            icon: display.icon,
        }
    }
}

/// Render recommendations as `• id` lines
pub fn format_tracks(recommendations: &Result<Vec<Recommendation>, MatchError>) -> String {
    match recommendations {
        Ok(list) if list.is_empty() => NO_RECOMMENDATIONS.to_string(),
        Ok(list) => list
            .iter()
            .map(|r| format!("• {}", r.track_id))
            .collect::<Vec<_>>()
            .join("\n"),
        Err(_) => RECOMMENDATIONS_UNAVAILABLE.to_string(),
    }
}

/// Outcome of the CPU-bound part of a query
enum PipelineOutcome {
    ExtractionFailed,
    ClassificationFailed,
    Analysed {
        prediction: MoodPrediction,
        tempo: f64,
        recommendations: Result<Vec<Recommendation>, MatchError>,
    },
}

/// Mood classification and recommendation pipeline
pub struct MoodOrchestrator {
    extractor: FeatureExtractor,
    classifier: Arc<MoodClassifier>,
    catalog_path: PathBuf,
    threshold: f64,
    limit: usize,
    query_log: Option<SqlitePool>,
}

impl MoodOrchestrator {
    pub fn new(
        extractor: FeatureExtractor,
        classifier: MoodClassifier,
        catalog_path: PathBuf,
    ) -> Self {
        Self {
            extractor,
            classifier: Arc::new(classifier),
            catalog_path,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            limit: DEFAULT_LIMIT,
            query_log: None,
        }
    }

    /// Minimum confidence for reporting the top class
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Maximum number of recommendations
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Record completed queries in this database
    pub fn with_query_log(mut self, pool: SqlitePool) -> Self {
        self.query_log = Some(pool);
        self
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Analyse one audio file, or report the waiting state when none is given
    pub async fn process(&self, audio_path: Option<&Path>) -> AnalysisDisplay {
        let Some(audio_path) = audio_path else {
            return AnalysisDisplay::waiting();
        };

        let extractor = self.extractor.clone();
        let classifier = Arc::clone(&self.classifier);
        let catalog_path = self.catalog_path.clone();
        let audio_path = audio_path.to_path_buf();
        let threshold = self.threshold;
        let limit = self.limit;

        let outcome = tokio::task::spawn_blocking(move || {
            run_pipeline(&extractor, &classifier, &catalog_path, &audio_path, threshold, limit)
        })
        .await;

        let (prediction, tempo, recommendations) = match outcome {
            Ok(PipelineOutcome::Analysed {
                prediction,
                tempo,
                recommendations,
            }) => (prediction, tempo, recommendations),
            Ok(PipelineOutcome::ExtractionFailed) => return AnalysisDisplay::extraction_failed(),
            Ok(PipelineOutcome::ClassificationFailed) => return AnalysisDisplay::failed(),
            Err(e) => {
                error!("Analysis task failed: {}", e);
                return AnalysisDisplay::failed();
            }
        };

        let track_ids: Vec<String> = match &recommendations {
            Ok(list) => list.iter().map(|r| r.track_id.clone()).collect(),
            Err(MatchError::FeatureMismatch { input, catalog }) => {
                error!(
                    input = *input,
                    catalog = *catalog,
                    catalog_path = %self.catalog_path.display(),
                    "Catalog feature layout does not match the extractor; rebuild the catalog"
                );
                Vec::new()
            }
            Err(e) => {
                warn!("Recommendations unavailable: {}", e);
                Vec::new()
            }
        };

        info!(
            mood = %prediction.label,
            class = %prediction.class_label,
            confidence = format!("{:.3}", prediction.confidence),
            tempo = format!("{:.1}", tempo),
            recommendations = track_ids.len(),
            "Query analysed"
        );

        if let Some(pool) = &self.query_log {
            if let Err(e) = db::log_query(pool, &prediction.label, tempo, &track_ids).await {
                warn!("Failed to log query: {}", e);
            }
        }

        AnalysisDisplay::classified(&prediction, tempo, &recommendations)
    }
}

fn run_pipeline(
    extractor: &FeatureExtractor,
    classifier: &MoodClassifier,
    catalog_path: &Path,
    audio_path: &Path,
    threshold: f64,
    limit: usize,
) -> PipelineOutcome {
    let Some(Extraction { features, tempo }) = extractor.extract(audio_path) else {
        return PipelineOutcome::ExtractionFailed;
    };

    let prediction = match classifier.classify_with_threshold(&features, threshold) {
        Ok(prediction) => prediction,
        Err(e) => {
            error!("Classification failed: {}", e);
            return PipelineOutcome::ClassificationFailed;
        }
    };

    let recommendations =
        matcher::recommend(catalog_path, &features, tempo, &prediction.label, limit);

    PipelineOutcome::Analysed {
        prediction,
        tempo,
        recommendations,
    }
}
