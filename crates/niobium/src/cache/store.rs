//! SQLite backing store for [`ContentCache`](super::ContentCache).
//!
//! Schema:
//! - processed: content_hash -> source, processed_at, output_path, artifact_path
//! - response_cache: cache_key -> response_json, model, created_at

use crate::error::{NiobiumError, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS processed (
    content_hash  TEXT PRIMARY KEY,
    source        TEXT NOT NULL,
    processed_at  REAL NOT NULL,
    output_path   TEXT,
    artifact_path TEXT
);

CREATE TABLE IF NOT EXISTS response_cache (
    cache_key     TEXT PRIMARY KEY,
    response_json TEXT NOT NULL,
    model         TEXT NOT NULL,
    created_at    REAL NOT NULL
);
";

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    /// Private in-memory database, gone when the cache is dropped.
    Memory,
}

impl StoreLocation {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Memory => None,
        }
    }
}

/// `<user config dir>/niobium/cache.db`, if the platform has a config dir.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("niobium").join("cache.db"))
}

/// Open (creating if needed) the store and apply the schema.
///
/// Every failure here is a `StorageInit` error.
pub(crate) fn open_store(location: &StoreLocation) -> Result<Connection> {
    let conn = match location {
        StoreLocation::File(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(|e| {
                    NiobiumError::storage_init_with_source(
                        format!("Failed to create cache directory {}", parent.display()),
                        e,
                    )
                })?;
            }
            Connection::open(path).map_err(|e| {
                NiobiumError::storage_init_with_source(format!("Failed to open cache store {}", path.display()), e)
            })?
        }
        StoreLocation::Memory => Connection::open_in_memory()
            .map_err(|e| NiobiumError::storage_init_with_source("Failed to open in-memory cache store", e))?,
    };

    // WAL lets other processes read while this one writes; FULL syncs every commit.
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = FULL;",
    )
    .map_err(|e| NiobiumError::storage_init_with_source("Failed to configure cache store", e))?;

    conn.execute_batch(SCHEMA)
        .map_err(|e| NiobiumError::storage_init_with_source("Failed to create cache schema", e))?;

    tracing::debug!("Opened cache store at {:?}", location);
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("cache.db");

        let conn = open_store(&StoreLocation::File(path.clone())).unwrap();
        assert!(path.exists());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('processed', 'response_cache')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn test_open_uses_wal_journal() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_store(&StoreLocation::File(dir.path().join("cache.db"))).unwrap();
        let mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0)).unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let location = StoreLocation::File(dir.path().join("cache.db"));
        drop(open_store(&location).unwrap());
        assert!(open_store(&location).is_ok());
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = open_store(&StoreLocation::File(blocker.join("cache.db"))).unwrap_err();
        assert!(matches!(err, NiobiumError::StorageInit { .. }));
    }

    #[test]
    fn test_default_store_path_shape() {
        if let Some(path) = default_store_path() {
            assert!(path.ends_with("niobium/cache.db"));
        }
    }
}
