//! Matcher
//!
//! Ranks catalog tracks against a query feature vector. Candidates are narrowed first by mood,
//! then by tempo; each filter is advisory and falls back to the set it started from when it
//! would leave nothing. Survivors are ranked by cosine similarity.

use crate::catalog::{Catalog, CatalogEntry, CatalogError};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Relative tempo band half-width (±8%)
pub const TEMPO_TOLERANCE: f64 = 0.08;

/// Default number of recommendations
pub const DEFAULT_LIMIT: usize = 5;

/// Matcher errors
#[derive(Debug, Error)]
pub enum MatchError {
    /// Query width differs from the catalog's feature-column count
    #[error("Feature mismatch: input has {input} features, catalog has {catalog}")]
    FeatureMismatch { input: usize, catalog: usize },

    /// Catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A ranked catalog track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub track_id: String,
    pub score: f64,
}

/// Load the catalog at `catalog_path` and rank it against the query
pub fn recommend(
    catalog_path: &Path,
    query: &[f64],
    tempo: f64,
    mood: &str,
    limit: usize,
) -> Result<Vec<Recommendation>, MatchError> {
    let catalog = Catalog::load(catalog_path)?;
    recommend_from(&catalog, query, tempo, mood, limit)
}

/// Rank an already-loaded catalog snapshot against the query
pub fn recommend_from(
    catalog: &Catalog,
    query: &[f64],
    tempo: f64,
    mood: &str,
    limit: usize,
) -> Result<Vec<Recommendation>, MatchError> {
    if catalog.feature_width() != query.len() {
        return Err(MatchError::FeatureMismatch {
            input: query.len(),
            catalog: catalog.feature_width(),
        });
    }

    let all: Vec<&CatalogEntry> = catalog.entries.iter().collect();

    let mood_matches: Vec<&CatalogEntry> =
        all.iter().copied().filter(|e| e.mood == mood).collect();
    let by_mood = if mood_matches.is_empty() {
        debug!(mood = mood, "No catalog tracks for mood, using full catalog");
        all
    } else {
        mood_matches
    };

    let (low, high) = tempo_band(tempo);
    let tempo_matches: Vec<&CatalogEntry> = by_mood
        .iter()
        .copied()
        .filter(|e| e.bpm >= low && e.bpm <= high)
        .collect();
    let candidates = if tempo_matches.is_empty() {
        debug!(
            tempo = tempo,
            low = low,
            high = high,
            "No catalog tracks in tempo band, keeping mood candidates"
        );
        by_mood
    } else {
        tempo_matches
    };

    let mut ranked: Vec<Recommendation> = candidates
        .into_iter()
        .map(|entry| Recommendation {
            track_id: entry.track_id.clone(),
            score: cosine_similarity(query, &entry.features),
        })
        .collect();

    // Stable: equal scores keep catalog order
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);

    Ok(ranked)
}

/// Inclusive tempo band around `tempo`
pub fn tempo_band(tempo: f64) -> (f64, f64) {
    (tempo * (1.0 - TEMPO_TOLERANCE), tempo * (1.0 + TEMPO_TOLERANCE))
}

/// Cosine similarity in [-1, 1]; 0.0 when either vector has zero magnitude
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
