//! Canonical file paths for the data directory.
//!
//! All paths are relative to the working directory's `data/` directory.

use std::path::PathBuf;

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Returns the default path of the report database.
#[must_use]
pub fn default_db_path() -> PathBuf {
    data_dir().join("safety_map.db")
}
