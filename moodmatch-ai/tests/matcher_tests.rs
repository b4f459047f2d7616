//! Matcher integration tests against catalog files on disk

mod helpers;

use helpers::{basis_vector, four_track_catalog, write_catalog_csv, write_catalog_csv_with_width};
use moodmatch_ai::catalog::CatalogError;
use moodmatch_ai::matcher::{recommend, MatchError, DEFAULT_LIMIT};
use moodmatch_common::FEATURE_DIM;
use tempfile::TempDir;

#[test]
fn test_happy_query_returns_happy_track_first() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = four_track_catalog(&temp_dir.path().join("catalog.csv"));

    // Query points at the sad track's axis; mood and tempo filters still win
    let recs = recommend(&catalog, &basis_vector(3), 118.0, "happy", DEFAULT_LIMIT).unwrap();

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].track_id, "happy.mp3");
}

#[test]
fn test_unknown_mood_uses_full_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = four_track_catalog(&temp_dir.path().join("catalog.csv"));

    // No "uncertain" tracks; tempo band around 75 keeps calm (80) and sad (70)
    let recs = recommend(&catalog, &basis_vector(1), 75.0, "uncertain", DEFAULT_LIMIT).unwrap();

    let ids: Vec<&str> = recs.iter().map(|r| r.track_id.as_str()).collect();
    assert_eq!(ids, vec!["calm.mp3", "sad.mp3"]);
    assert!(recs[0].score > recs[1].score);
}

#[test]
fn test_tempo_miss_falls_back_to_mood_set() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = write_catalog_csv(
        &temp_dir.path().join("catalog.csv"),
        &[
            ("calm-a.mp3", "calm", 60.0, basis_vector(0)),
            ("calm-b.mp3", "calm", 62.0, basis_vector(1)),
            ("happy.mp3", "happy", 150.0, basis_vector(1)),
        ],
    );

    let recs = recommend(&catalog, &basis_vector(1), 150.0, "calm", DEFAULT_LIMIT).unwrap();

    let ids: Vec<&str> = recs.iter().map(|r| r.track_id.as_str()).collect();
    assert_eq!(ids, vec!["calm-b.mp3", "calm-a.mp3"]);
}

#[test]
fn test_both_filters_miss_uses_full_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = four_track_catalog(&temp_dir.path().join("catalog.csv"));

    let recs = recommend(&catalog, &basis_vector(2), 300.0, "dreamy", DEFAULT_LIMIT).unwrap();

    assert_eq!(recs.len(), 4);
    assert_eq!(recs[0].track_id, "energetic.mp3");
}

#[test]
fn test_results_bounded_and_sorted_descending() {
    let temp_dir = TempDir::new().unwrap();
    let rows: Vec<(String, Vec<f64>)> = (0..12)
        .map(|i| {
            let mut v = basis_vector(0);
            v[1] = i as f64 * 0.3;
            (format!("track{:02}.mp3", i), v)
        })
        .collect();
    let table: Vec<(&str, &str, f64, Vec<f64>)> = rows
        .iter()
        .map(|(id, v)| (id.as_str(), "calm", 100.0, v.clone()))
        .collect();
    let catalog = write_catalog_csv(&temp_dir.path().join("catalog.csv"), &table);

    let mut query = basis_vector(0);
    query[1] = 1.0;
    for limit in [1, 3, 5, 20] {
        let recs = recommend(&catalog, &query, 100.0, "calm", limit).unwrap();
        assert!(recs.len() <= limit);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn test_narrow_catalog_is_feature_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = write_catalog_csv_with_width(
        &temp_dir.path().join("catalog.csv"),
        FEATURE_DIM - 1,
        &[("a.mp3", "happy", 120.0)],
    );

    let result = recommend(&catalog, &vec![0.1; FEATURE_DIM], 120.0, "happy", 5);

    assert!(matches!(
        result,
        Err(MatchError::FeatureMismatch {
            input: 30,
            catalog: 29
        })
    ));
}

#[test]
fn test_short_query_is_feature_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = four_track_catalog(&temp_dir.path().join("catalog.csv"));

    let result = recommend(&catalog, &[0.0; 29], 120.0, "happy", 5);
    assert!(matches!(result, Err(MatchError::FeatureMismatch { .. })));
}

#[test]
fn test_zero_query_vector_is_valid() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = four_track_catalog(&temp_dir.path().join("catalog.csv"));

    let recs = recommend(&catalog, &vec![0.0; FEATURE_DIM], 0.0, "sad", 5).unwrap();

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].track_id, "sad.mp3");
    assert_eq!(recs[0].score, 0.0);
}

#[test]
fn test_empty_catalog_gives_empty_list() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = write_catalog_csv(&temp_dir.path().join("catalog.csv"), &[]);

    let recs = recommend(&catalog, &basis_vector(0), 120.0, "happy", 5).unwrap();
    assert!(recs.is_empty());
}

#[test]
fn test_rows_with_bad_bpm_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("catalog.csv");
    write_catalog_csv_with_width(
        &path,
        FEATURE_DIM,
        &[("a.mp3", "happy", 120.0), ("b.mp3", "happy", 121.0)],
    );
    let content = std::fs::read_to_string(&path).unwrap().replace(",121,", ",n/a,");
    std::fs::write(&path, content).unwrap();

    let recs = recommend(&path, &vec![0.5; FEATURE_DIM], 120.0, "happy", 5).unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].track_id, "a.mp3");
}

#[test]
fn test_missing_catalog_is_catalog_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = recommend(
        &temp_dir.path().join("missing.csv"),
        &basis_vector(0),
        120.0,
        "happy",
        5,
    );
    assert!(matches!(result, Err(MatchError::Catalog(CatalogError::Io { .. }))));
}
