//! Catalog and classifier fixtures

use moodmatch_ai::catalog::{write_catalog_file, CatalogEntry};
use moodmatch_ai::classifier::{LabelEncoder, MoodClassifier, MoodModel};
use moodmatch_common::FEATURE_DIM;
use std::path::{Path, PathBuf};

/// Unit vector along `axis` in the full feature space
pub fn basis_vector(axis: usize) -> Vec<f64> {
    let mut v = vec![0.0; FEATURE_DIM];
    v[axis] = 1.0;
    v
}

/// Write a catalog with the canonical 30 feature columns
pub fn write_catalog_csv(path: &Path, rows: &[(&str, &str, f64, Vec<f64>)]) -> PathBuf {
    let entries: Vec<CatalogEntry> = rows
        .iter()
        .map(|(id, mood, bpm, features)| CatalogEntry {
            track_id: id.to_string(),
            mood: mood.to_string(),
            bpm: *bpm,
            features: features.clone(),
        })
        .collect();
    write_catalog_file(path, &entries).unwrap();
    path.to_path_buf()
}

/// Write a catalog with `width` feature columns and constant feature values
pub fn write_catalog_csv_with_width(
    path: &Path,
    width: usize,
    rows: &[(&str, &str, f64)],
) -> PathBuf {
    let mut header = vec!["track_id".to_string(), "mood".to_string(), "bpm".to_string()];
    header.extend((0..width).map(|i| format!("f{}", i)));

    let mut lines = vec![header.join(",")];
    for (id, mood, bpm) in rows {
        let mut cells = vec![id.to_string(), mood.to_string(), bpm.to_string()];
        cells.extend((0..width).map(|_| "0.5".to_string()));
        lines.push(cells.join(","));
    }

    std::fs::write(path, lines.join("\n") + "\n").unwrap();
    path.to_path_buf()
}

/// happy/calm/energetic/sad at 120/80/140/70 BPM, each on its own feature axis
pub fn four_track_catalog(path: &Path) -> PathBuf {
    write_catalog_csv(
        path,
        &[
            ("happy.mp3", "happy", 120.0, basis_vector(0)),
            ("calm.mp3", "calm", 80.0, basis_vector(1)),
            ("energetic.mp3", "energetic", 140.0, basis_vector(2)),
            ("sad.mp3", "sad", 70.0, basis_vector(3)),
        ],
    )
}

/// Classifier that ignores its input and always predicts `top` with probability `confidence`
pub fn fixed_classifier(labels: &[&str], top: &str, confidence: f64) -> MoodClassifier {
    let encoder = LabelEncoder::fit(labels.iter().copied());
    let others = (encoder.len() - 1) as f64;
    let mut model = MoodModel::zeros(encoder.len(), FEATURE_DIM);

    // softmax: e^a / (e^a + others) = confidence
    let top_index = encoder.transform(top).unwrap();
    model.intercepts[top_index] = (confidence * others / (1.0 - confidence)).ln();

    MoodClassifier::from_parts(model, encoder).unwrap()
}
