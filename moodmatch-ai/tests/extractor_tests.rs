//! Feature Extractor tests against real audio files

mod helpers;

use helpers::{generate_test_wav, write_corrupt_file, AudioConfig, Signal};
use moodmatch_ai::audio::{load_for_analysis, ANALYSIS_SAMPLE_RATE};
use moodmatch_ai::features::FeatureExtractor;
use moodmatch_common::features::{RMS_MEAN_INDEX, TEMPO_INDEX};
use moodmatch_common::FEATURE_DIM;
use tempfile::TempDir;

#[test]
fn test_stereo_tone_extracts_full_vector() {
    let temp_dir = TempDir::new().unwrap();
    let path =
        generate_test_wav(&temp_dir.path().join("tone.wav"), &AudioConfig::default()).unwrap();

    let extraction = FeatureExtractor::default().extract(&path).unwrap();

    assert_eq!(extraction.features.len(), FEATURE_DIM);
    assert!(extraction.tempo >= 0.0);
    assert_eq!(extraction.features[TEMPO_INDEX], extraction.tempo);
    assert!(extraction.features.iter().all(|v| v.is_finite()));
    assert!(extraction.features[RMS_MEAN_INDEX] > 0.1);
}

#[test]
fn test_click_track_tempo() {
    let temp_dir = TempDir::new().unwrap();
    let config = AudioConfig {
        duration_seconds: 12.0,
        sample_rate: ANALYSIS_SAMPLE_RATE,
        channels: 1,
        signal: Signal::Clicks { bpm: 120.0 },
    };
    let path = generate_test_wav(&temp_dir.path().join("clicks.wav"), &config).unwrap();

    let extraction = FeatureExtractor::default().extract(&path).unwrap();

    assert!(
        extraction.tempo > 110.0 && extraction.tempo < 130.0,
        "estimated tempo {}",
        extraction.tempo
    );
}

#[test]
fn test_silence_extracts_with_zero_tempo() {
    let temp_dir = TempDir::new().unwrap();
    let config = AudioConfig {
        signal: Signal::Silence,
        ..AudioConfig::default()
    };
    let path = generate_test_wav(&temp_dir.path().join("silence.wav"), &config).unwrap();

    let extraction = FeatureExtractor::default().extract(&path).unwrap();

    assert_eq!(extraction.features.len(), FEATURE_DIM);
    assert_eq!(extraction.tempo, 0.0);
}

#[test]
fn test_long_input_is_truncated_not_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = AudioConfig {
        duration_seconds: 70.0,
        sample_rate: 8000,
        channels: 1,
        signal: Signal::Tone(220.0),
    };
    let path = generate_test_wav(&temp_dir.path().join("long.wav"), &config).unwrap();

    let audio = load_for_analysis(&path, 60.0).unwrap();
    assert!(
        (audio.duration_seconds - 60.0).abs() < 0.1,
        "duration {}",
        audio.duration_seconds
    );

    let extraction = FeatureExtractor::default().extract(&path).unwrap();
    assert_eq!(extraction.features.len(), FEATURE_DIM);
}

#[test]
fn test_corrupt_file_is_absent() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_corrupt_file(&temp_dir.path().join("broken.mp3")).unwrap();

    assert!(FeatureExtractor::default().extract(&path).is_none());
}

#[test]
fn test_missing_file_is_absent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nothing.wav");

    assert!(FeatureExtractor::default().extract(&path).is_none());
}

#[test]
fn test_very_short_file_still_extracts() {
    let temp_dir = TempDir::new().unwrap();
    let config = AudioConfig {
        duration_seconds: 0.04,
        ..AudioConfig::default()
    };
    let path = generate_test_wav(&temp_dir.path().join("blip.wav"), &config).unwrap();

    let extraction = FeatureExtractor::default()
        .extract(&path)
        .expect("a decodable clip should always yield features");
    assert_eq!(extraction.features.len(), FEATURE_DIM);
    assert_eq!(extraction.tempo, 0.0);
}
