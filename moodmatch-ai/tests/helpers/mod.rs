//! Test Helper Utilities
//!
//! Shared utilities for testing moodmatch-ai

#![allow(dead_code)]

pub mod audio_generator;
pub mod fixtures;

pub use audio_generator::{generate_test_wav, write_corrupt_file, AudioConfig, Signal};
pub use fixtures::{
    basis_vector, fixed_classifier, four_track_catalog, write_catalog_csv,
    write_catalog_csv_with_width,
};
