//! Feature vector layout
//!
//! A feature vector is an ordered sequence of exactly [`FEATURE_DIM`] numbers. The layout is
//! positional and shared by the offline catalog builder and the online query path:
//!
//! | index   | meaning                                   |
//! |---------|-------------------------------------------|
//! | 0..13   | mean of MFCC coefficients 0..13           |
//! | 13..26  | standard deviation of the same 13 MFCCs   |
//! | 26      | estimated tempo (BPM)                     |
//! | 27      | mean RMS energy                           |
//! | 28      | standard deviation of RMS energy          |
//! | 29      | mean zero-crossing rate                   |
//!
//! Catalog files name the components `f0`..`f29` in the same order.

/// Number of MFCC coefficients kept per frame
pub const N_MFCC: usize = 13;

/// Total feature vector length
pub const FEATURE_DIM: usize = 2 * N_MFCC + 4;

pub const MFCC_MEAN_START: usize = 0;
pub const MFCC_STD_START: usize = N_MFCC;
pub const TEMPO_INDEX: usize = 2 * N_MFCC;
pub const RMS_MEAN_INDEX: usize = TEMPO_INDEX + 1;
pub const RMS_STD_INDEX: usize = TEMPO_INDEX + 2;
pub const ZCR_MEAN_INDEX: usize = TEMPO_INDEX + 3;

/// Ordered feature values; see the module docs for index semantics.
pub type FeatureVector = Vec<f64>;

/// Build a feature vector in the canonical order.
///
/// This is the only place the layout is produced. Every caller that needs a vector (catalog
/// builder, query path, tests) goes through here.
pub fn assemble(
    mfcc_mean: &[f64; N_MFCC],
    mfcc_std: &[f64; N_MFCC],
    tempo: f64,
    rms_mean: f64,
    rms_std: f64,
    zcr_mean: f64,
) -> FeatureVector {
    let mut vector = Vec::with_capacity(FEATURE_DIM);
    vector.extend_from_slice(mfcc_mean);
    vector.extend_from_slice(mfcc_std);
    vector.push(tempo);
    vector.push(rms_mean);
    vector.push(rms_std);
    vector.push(zcr_mean);
    debug_assert_eq!(vector.len(), FEATURE_DIM);
    vector
}

/// Column name for feature component `index` (`f{index}`)
pub fn feature_column_name(index: usize) -> String {
    format!("f{}", index)
}

/// Column names `f0`..`f29` in layout order
pub fn feature_column_names() -> Vec<String> {
    (0..FEATURE_DIM).map(feature_column_name).collect()
}

/// Parse the component index out of a feature column name.
///
/// Only `f` followed by decimal digits qualifies, so unrelated columns starting with `f`
/// (`file`, `flag`) are not mistaken for features.
pub fn feature_column_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix('f')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
