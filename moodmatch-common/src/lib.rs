//! # moodmatch Common Library
//!
//! Shared code for the moodmatch workspace:
//! - Error type shared by all crates
//! - Bootstrap configuration (TOML) and root folder resolution
//! - The positional feature-vector layout used by the catalog and the query path
//! - SQLite database creation

pub mod config;
pub mod db;
pub mod error;
pub mod features;

pub use error::{Error, Result};
pub use features::{FeatureVector, FEATURE_DIM};
