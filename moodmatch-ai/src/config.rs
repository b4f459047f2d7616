//! Service configuration resolution
//!
//! Resolves every setting the service needs from the TOML config plus the root folder
//! (CLI → ENV → TOML → OS default). Relative paths are taken relative to the root folder.

use crate::audio::DEFAULT_MAX_DURATION_SECONDS;
use crate::classifier::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::matcher::DEFAULT_LIMIT;
use moodmatch_common::config::{resolve_against, resolve_root_folder, TomlConfig};
use moodmatch_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5730;

/// Catalog location relative to the root folder
pub const DEFAULT_CATALOG_PATH: &str = "catalog/catalog_features.csv";

/// Model artifact directory relative to the root folder
pub const DEFAULT_MODEL_DIR: &str = "model";

/// Query log database relative to the root folder
pub const DEFAULT_QUERY_LOG_PATH: &str = "logs/queries.db";

/// Fully resolved service settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub catalog_path: PathBuf,
    pub model_dir: PathBuf,
    pub query_log_path: PathBuf,
    pub confidence_threshold: f64,
    pub recommendation_limit: usize,
    pub max_duration_seconds: f64,
    pub port: u16,
}

impl ServiceConfig {
    /// Resolve settings and validate them
    pub fn resolve(cli_root_folder: Option<&Path>, toml_config: &TomlConfig) -> Result<Self> {
        let root_folder = resolve_root_folder(cli_root_folder, toml_config);
        let path_or = |configured: &Option<PathBuf>, default: &str| {
            let path = configured
                .clone()
                .unwrap_or_else(|| PathBuf::from(default));
            resolve_against(&root_folder, &path)
        };

        let config = Self {
            catalog_path: path_or(&toml_config.catalog_path, DEFAULT_CATALOG_PATH),
            model_dir: path_or(&toml_config.model_dir, DEFAULT_MODEL_DIR),
            query_log_path: path_or(&toml_config.query_log_path, DEFAULT_QUERY_LOG_PATH),
            confidence_threshold: toml_config
                .confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            recommendation_limit: toml_config.recommendation_limit.unwrap_or(DEFAULT_LIMIT),
            max_duration_seconds: toml_config
                .max_duration_seconds
                .unwrap_or(DEFAULT_MAX_DURATION_SECONDS),
            port: toml_config.port.unwrap_or(DEFAULT_PORT),
            root_folder,
        };
        config.validate()?;

        info!("Root folder: {}", config.root_folder.display());
        Ok(config)
    }

    /// Reject settings the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::Config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.recommendation_limit == 0 {
            return Err(Error::Config(
                "recommendation_limit must be at least 1".to_string(),
            ));
        }
        if !self.max_duration_seconds.is_finite() || self.max_duration_seconds <= 0.0 {
            return Err(Error::Config(format!(
                "max_duration_seconds must be positive, got {}",
                self.max_duration_seconds
            )));
        }
        Ok(())
    }
}
