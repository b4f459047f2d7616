//! Catalog Store
//!
//! The catalog is a CSV table with columns `track_id`, `mood`, `bpm` and the feature columns
//! `f0`..`f29`. It is re-read on every query and never mutated at query time, so concurrent
//! readers each work on their own snapshot.

use moodmatch_common::features::{
    feature_column_index, feature_column_name, feature_column_names, FeatureVector,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const TRACK_ID_COLUMN: &str = "track_id";
pub const MOOD_COLUMN: &str = "mood";
pub const BPM_COLUMN: &str = "bpm";

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be opened or written
    #[error("Catalog I/O error {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV
    #[error("Catalog CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header
    #[error("Catalog is missing required column '{0}'")]
    MissingColumn(&'static str),

    /// The same feature column appears twice
    #[error("Catalog has duplicate feature column '{0}'")]
    DuplicateColumn(String),

    /// Feature columns skip an index, e.g. `f0..f28,f30`
    #[error("Catalog feature columns are not contiguous: expected '{expected}', found '{found}'")]
    FeatureColumnGap { expected: String, found: String },

    /// A feature cell is not a finite number
    #[error("Invalid value '{value}' in column {column} of catalog row {row}")]
    InvalidFeature {
        row: usize,
        column: String,
        value: String,
    },
}

/// One catalog row
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub track_id: String,
    pub mood: String,
    pub bpm: f64,
    pub features: FeatureVector,
}

/// An immutable snapshot of the catalog file
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Feature column names in layout order
    pub feature_columns: Vec<String>,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Read a catalog file
    ///
    /// Rows whose `bpm` does not parse as a finite number are dropped. Extra columns are
    /// ignored. Feature columns are ordered by their index, whatever their order in the file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_reader(file)?;

        debug!(
            path = %path.display(),
            rows = catalog.entries.len(),
            feature_columns = catalog.feature_columns.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    /// Parse a catalog from any reader
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(CatalogError::MissingColumn(name))
        };
        let track_id_idx = column(TRACK_ID_COLUMN)?;
        let mood_idx = column(MOOD_COLUMN)?;
        let bpm_idx = column(BPM_COLUMN)?;

        // (feature index, header position), sorted by feature index
        let mut feature_positions: Vec<(usize, usize)> = headers
            .iter()
            .enumerate()
            .filter_map(|(pos, name)| feature_column_index(name).map(|idx| (idx, pos)))
            .collect();
        feature_positions.sort_unstable();
        for pair in feature_positions.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(CatalogError::DuplicateColumn(headers[pair[1].1].to_string()));
            }
        }
        // Slot i must hold column f{i}
        for (expected, &(idx, pos)) in feature_positions.iter().enumerate() {
            if idx != expected {
                return Err(CatalogError::FeatureColumnGap {
                    expected: feature_column_name(expected),
                    found: headers[pos].to_string(),
                });
            }
        }
        let feature_columns: Vec<String> = feature_positions
            .iter()
            .map(|&(_, pos)| headers[pos].to_string())
            .collect();

        let mut entries = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let cell = |pos: usize| record.get(pos).unwrap_or("");

            let bpm = match cell(bpm_idx).parse::<f64>() {
                Ok(bpm) if bpm.is_finite() => bpm,
                _ => {
                    debug!(row = row, value = cell(bpm_idx), "Dropping catalog row with non-numeric bpm");
                    continue;
                }
            };

            let mut features = Vec::with_capacity(feature_positions.len());
            for &(_, pos) in &feature_positions {
                let raw = cell(pos);
                match raw.parse::<f64>() {
                    Ok(value) if value.is_finite() => features.push(value),
                    _ => {
                        return Err(CatalogError::InvalidFeature {
                            row,
                            column: headers[pos].to_string(),
                            value: raw.to_string(),
                        })
                    }
                }
            }

            entries.push(CatalogEntry {
                track_id: cell(track_id_idx).to_string(),
                mood: cell(mood_idx).to_string(),
                bpm,
                features,
            });
        }

        Ok(Self {
            feature_columns,
            entries,
        })
    }

    /// Number of feature columns
    pub fn feature_width(&self) -> usize {
        self.feature_columns.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct mood labels, sorted
    pub fn moods(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.mood.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Write catalog rows with the canonical header (`track_id, mood, bpm, f0..f29`)
pub fn write_catalog<W: std::io::Write>(
    writer: W,
    entries: &[CatalogEntry],
) -> Result<(), CatalogError> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec![
        TRACK_ID_COLUMN.to_string(),
        MOOD_COLUMN.to_string(),
        BPM_COLUMN.to_string(),
    ];
    header.extend(feature_column_names());
    writer.write_record(&header)?;

    for entry in entries {
        let mut record = vec![entry.track_id.clone(), entry.mood.clone(), entry.bpm.to_string()];
        record.extend(entry.features.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush().map_err(|e| CatalogError::Csv(e.into()))?;
    Ok(())
}

/// Write a catalog file, creating parent directories as needed
pub fn write_catalog_file(path: &Path, entries: &[CatalogEntry]) -> Result<(), CatalogError> {
    let io_err = |source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let file = std::fs::File::create(path).map_err(io_err)?;
    write_catalog(file, entries)
}
