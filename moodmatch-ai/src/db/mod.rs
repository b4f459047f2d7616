//! Query log database
//!
//! Append-only SQLite audit trail of completed queries. Writes are best-effort: callers log and
//! drop any failure.

pub mod queries;

pub use queries::{log_query, recent_queries, QueryLogEntry};

use moodmatch_common::db::open_database;
use moodmatch_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Open the query log database and make sure its table exists
pub async fn init_query_log(db_path: &Path) -> Result<SqlitePool> {
    let pool = open_database(db_path).await?;
    init_tables(&pool).await?;
    Ok(pool)
}

/// Create the `queries` table if it doesn't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS queries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            mood TEXT NOT NULL,
            bpm REAL NOT NULL,
            tracks TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
