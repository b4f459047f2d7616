//! Query log records

use chrono::{DateTime, Utc};
use moodmatch_common::{Error, Result};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// Separator between track ids in the `tracks` column
const TRACK_SEPARATOR: &str = ",";

/// One audit record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryLogEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    /// Mood label used for matching
    pub mood: String,
    pub bpm: f64,
    pub tracks: Vec<String>,
}

/// Append one audit record; each call is a single atomic insert
pub async fn log_query(pool: &SqlitePool, mood: &str, bpm: f64, tracks: &[String]) -> Result<i64> {
    let timestamp = Utc::now().to_rfc3339();
    let tracks = tracks.join(TRACK_SEPARATOR);

    let result = sqlx::query(
        r#"
        INSERT INTO queries (timestamp, mood, bpm, tracks)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&timestamp)
    .bind(mood)
    .bind(bpm)
    .bind(&tracks)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Most recent audit records, newest first
pub async fn recent_queries(pool: &SqlitePool, limit: u32) -> Result<Vec<QueryLogEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT id, timestamp, mood, bpm, tracks
        FROM queries
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let raw_timestamp: String = row.get("timestamp");
            let timestamp = DateTime::parse_from_rfc3339(&raw_timestamp)
                .map_err(|e| {
                    Error::Internal(format!("Invalid query timestamp '{}': {}", raw_timestamp, e))
                })?
                .with_timezone(&Utc);
            let tracks: String = row.get("tracks");

            Ok(QueryLogEntry {
                id: row.get("id"),
                timestamp,
                mood: row.get("mood"),
                bpm: row.get("bpm"),
                tracks: split_tracks(&tracks),
            })
        })
        .collect()
}

fn split_tracks(tracks: &str) -> Vec<String> {
    if tracks.is_empty() {
        return Vec::new();
    }
    tracks.split(TRACK_SEPARATOR).map(str::to_string).collect()
}
