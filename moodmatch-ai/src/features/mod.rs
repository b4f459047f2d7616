//! Audio feature extraction
//!
//! - `spectral`: STFT, mel filterbank, log-mel, MFCC
//! - `frames`: RMS energy, zero-crossing rate, mean/std reductions
//! - `tempo`: onset strength and global tempo estimate
//! - `extractor`: the file → (feature vector, tempo) contract

pub mod extractor;
pub mod frames;
pub mod spectral;
pub mod tempo;

pub use extractor::{extract_samples, Extraction, FeatureExtractor};
