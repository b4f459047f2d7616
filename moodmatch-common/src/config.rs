//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a TOML file. Values resolve in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "MOODMATCH_ROOT_FOLDER";

/// Environment variable overriding the TOML config file location
pub const CONFIG_FILE_ENV: &str = "MOODMATCH_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional. Missing values fall back to compiled defaults, and relative paths
/// are resolved against the root folder.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Root folder holding catalog, model and log directories
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Catalog CSV (default: `catalog/catalog_features.csv`)
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Directory holding `mood_model.json` and `label_encoder.json` (default: `model`)
    #[serde(default)]
    pub model_dir: Option<PathBuf>,

    /// SQLite query log (default: `logs/queries.db`)
    #[serde(default)]
    pub query_log_path: Option<PathBuf>,

    /// Confidence below which a prediction is reported as uncertain
    #[serde(default)]
    pub confidence_threshold: Option<f64>,

    /// Number of recommendations returned per query
    #[serde(default)]
    pub recommendation_limit: Option<usize>,

    /// Maximum seconds of audio decoded per file
    #[serde(default)]
    pub max_duration_seconds: Option<f64>,

    /// HTTP port for `serve`
    #[serde(default)]
    pub port: Option<u16>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from an explicit path
    ///
    /// A missing file is not an error: a warning is logged and defaults are used. A file that
    /// exists but cannot be parsed is reported, since silently ignoring it hides typos.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file not found: {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config file: {}", path.display());
        Ok(config)
    }

    /// Load configuration using CLI → ENV → platform default for the file location
    pub fn load_resolved(cli_path: Option<&Path>) -> Result<Self> {
        match config_file_path(cli_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Determine which TOML file to read, if any
pub fn config_file_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("moodmatch").join("config.toml"))
}

/// Resolve the root folder: CLI → ENV → TOML → OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("moodmatch"))
        .unwrap_or_else(|| PathBuf::from("./moodmatch_data"))
}

/// Resolve `path` against `root` unless it is already absolute
pub fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
