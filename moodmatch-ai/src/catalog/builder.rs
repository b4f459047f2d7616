//! Offline catalog builder
//!
//! Scans a directory of audio files, runs the Feature Extractor over each one, tags it with a
//! mood from a file-name mapping and writes one catalog row per successful extraction. Files
//! that fail extraction are skipped.

use super::store::{write_catalog_file, CatalogEntry, CatalogError};
use crate::features::FeatureExtractor;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Mood assigned to files absent from the mapping
pub const UNKNOWN_MOOD: &str = "unknown";

/// Extensions picked up by the scan (lowercase)
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg"];

/// Catalog build errors
#[derive(Debug, Error)]
pub enum BuildError {
    /// Specified path does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Mood mapping could not be read or parsed
    #[error("Mood mapping error: {0}")]
    MoodMap(String),

    /// Writing the catalog failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// File name → mood label mapping
///
/// Keys are file names, or track ids (paths below the audio directory) to tell apart
/// same-named files in a recursive build. Stored as a flat TOML table:
/// ```toml
/// "track1.mp3" = "happy"
/// "track2.mp3" = "calm"
/// ```
#[derive(Debug, Clone, Default)]
pub struct MoodMap {
    moods: HashMap<String, String>,
}

impl MoodMap {
    pub fn from_toml_str(content: &str) -> Result<Self, BuildError> {
        let moods: HashMap<String, String> =
            toml::from_str(content).map_err(|e| BuildError::MoodMap(e.to_string()))?;
        Ok(Self { moods })
    }

    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BuildError::MoodMap(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn insert(&mut self, file_name: impl Into<String>, mood: impl Into<String>) {
        self.moods.insert(file_name.into(), mood.into());
    }

    /// Mood for `file_name`, or [`UNKNOWN_MOOD`]
    pub fn mood_for(&self, file_name: &str) -> &str {
        self.lookup(file_name).unwrap_or(UNKNOWN_MOOD)
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.moods.get(key).map(String::as_str)
    }
}

/// Outcome of a catalog build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildSummary {
    /// Rows written to the catalog
    pub written: usize,
    /// Files skipped because extraction failed
    pub skipped: Vec<PathBuf>,
}

/// Catalog builder
pub struct CatalogBuilder {
    extractor: FeatureExtractor,
    recursive: bool,
}

impl CatalogBuilder {
    pub fn new(extractor: FeatureExtractor) -> Self {
        Self {
            extractor,
            recursive: false,
        }
    }

    /// Also descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Audio files under `audio_dir`, sorted by path
    pub fn scan(&self, audio_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
        if !audio_dir.exists() {
            return Err(BuildError::PathNotFound(audio_dir.to_path_buf()));
        }
        if !audio_dir.is_dir() {
            return Err(BuildError::NotADirectory(audio_dir.to_path_buf()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(audio_dir)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Error accessing entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_audio_file(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Extract every audio file in `audio_dir` into catalog rows
    pub fn build_entries(
        &self,
        audio_dir: &Path,
        moods: &MoodMap,
    ) -> Result<(Vec<CatalogEntry>, BuildSummary), BuildError> {
        let files = self.scan(audio_dir)?;
        info!(
            directory = %audio_dir.display(),
            files = files.len(),
            "Extracting features from audio files"
        );

        let mut entries = Vec::with_capacity(files.len());
        let mut summary = BuildSummary::default();

        for path in files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let track_id = relative_track_id(audio_dir, &path);

            match self.extractor.extract(&path) {
                Some(extraction) => {
                    info!(track = %track_id, tempo = format!("{:.1}", extraction.tempo), "Processed");
                    let mood = moods
                        .lookup(&track_id)
                        .unwrap_or_else(|| moods.mood_for(&file_name));
                    entries.push(CatalogEntry {
                        mood: mood.to_string(),
                        track_id,
                        bpm: extraction.tempo,
                        features: extraction.features,
                    });
                }
                None => {
                    warn!(track = %track_id, "Extraction failed, skipping");
                    summary.skipped.push(path);
                }
            }
        }

        summary.written = entries.len();
        Ok((entries, summary))
    }

    /// Build the catalog and write it to `output`
    pub fn build(
        &self,
        audio_dir: &Path,
        moods: &MoodMap,
        output: &Path,
    ) -> Result<BuildSummary, BuildError> {
        let (entries, summary) = self.build_entries(audio_dir, moods)?;
        write_catalog_file(output, &entries)?;

        info!(
            output = %output.display(),
            written = summary.written,
            skipped = summary.skipped.len(),
            "Catalog saved"
        );
        Ok(summary)
    }
}

/// Track id for `path`: its path below `audio_dir` with `/` separators
///
/// Equal to the file name for files directly in `audio_dir`; files in subdirectories keep
/// their directory so same-named files stay distinct.
fn relative_track_id(audio_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(audio_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
