//! Database connection utilities.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::FetchError;

/// Opens (or creates) the `SQLite` database at `path` and ensures the
/// schema exists.
///
/// # Errors
///
/// Returns [`FetchError`] if the parent directory cannot be created, the
/// database cannot be opened, or schema creation fails.
pub async fn open(path: &Path) -> Result<Box<dyn Database>, FetchError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    log::debug!("Opening SQLite database at {}", path.display());
    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| FetchError::Database(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;

    Ok(db)
}

/// Creates all tables if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), FetchError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS reports (
            id             TEXT PRIMARY KEY,
            location_text  TEXT,
            report_type    TEXT NOT NULL,
            notes          TEXT,
            time_seen      TEXT,
            timestamp      TEXT,
            latitude       REAL,
            longitude      REAL
        )",
    )
    .await
    .map_err(|e| FetchError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_reports_timestamp
         ON reports (timestamp)",
    )
    .await
    .map_err(|e| FetchError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS settings (
            key         TEXT PRIMARY KEY,
            value       TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        )",
    )
    .await
    .map_err(|e| FetchError::Database(e.to_string()))?;

    Ok(())
}
