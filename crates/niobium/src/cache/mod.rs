//! Content-addressed cache.
//!
//! Two tables in one SQLite store:
//!
//! - **processed** answers "has this exact input already been turned into
//!   cards?" keyed by the input's [`ContentDigest`](crate::digest::ContentDigest).
//! - **response_cache** memoizes remote-model responses keyed by
//!   [`cache_key`], which hashes every input that shaped the response.
//!
//! # Storage discipline
//!
//! The store is opened lazily by the first call that needs it and kept open
//! for the lifetime of the [`ContentCache`]. The connection sits behind a
//! mutex, so calls from one process are serialized and each write is its own
//! committed statement. WAL mode allows readers in other processes; writers in
//! other processes are not coordinated and the last upsert wins.
//!
//! Marking an item processed is always an explicit call. Nothing in this
//! crate does it as a side effect, so the caller decides what counts as
//! success (usually "the card was delivered").
//!
//! # Example
//!
//! ```rust
//! use niobium::cache::ContentCache;
//!
//! # fn main() -> niobium::Result<()> {
//! let cache = ContentCache::in_memory();
//! cache.mark_processed("abc123", "img.png", None, None)?;
//! assert!(cache.is_processed("abc123")?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod store;

pub use store::{StoreLocation, default_store_path};

use crate::core::config::CacheConfig;
use crate::digest::digest_str;
use crate::error::{NiobiumError, Result};
use crate::geometry::Region;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A row of the processed-items table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub digest: String,
    /// Free-text description of where the item came from.
    pub source: String,
    /// Seconds since the Unix epoch.
    pub processed_at: f64,
    pub output_location: Option<String>,
    pub artifact_location: Option<String>,
}

/// A memoized model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub key: String,
    pub payload: Value,
    pub model: String,
    /// Seconds since the Unix epoch.
    pub created_at: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub processed: usize,
    pub cached_responses: usize,
}

/// Derive the response cache key for one model query.
///
/// The four inputs are joined with `\n` (missing instructions become the
/// empty string) and hashed. Changing the model, the instructions, or even
/// the order or text of the regions yields a different key, so stale
/// responses are never served and no invalidation is needed.
pub fn cache_key(image_digest: &str, region_list_json: &str, model: &str, instructions: Option<&str>) -> String {
    let joined = format!(
        "{}\n{}\n{}\n{}",
        image_digest,
        region_list_json,
        model,
        instructions.unwrap_or("")
    );
    digest_str(&joined).into_string()
}

/// Serialize regions the way they are fed into [`cache_key`].
pub fn region_list_json(regions: &[Region]) -> Result<String> {
    Ok(serde_json::to_string(regions)?)
}

fn now_unix_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Processed-item tracking and response memoization over one SQLite store.
pub struct ContentCache {
    location: StoreLocation,
    conn: OnceCell<Mutex<Connection>>,
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("location", &self.location)
            .field("open", &self.conn.get().is_some())
            .finish()
    }
}

impl ContentCache {
    /// Cache backed by the SQLite file at `path`. Nothing is touched on disk
    /// until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_location(StoreLocation::File(path.into()))
    }

    /// Cache at `<user config dir>/niobium/cache.db`.
    pub fn at_default_location() -> Result<Self> {
        let path = default_store_path()
            .ok_or_else(|| NiobiumError::storage_init("Could not determine the user configuration directory"))?;
        Ok(Self::new(path))
    }

    /// Private in-memory store, useful for tests and dry runs.
    pub fn in_memory() -> Self {
        Self::with_location(StoreLocation::Memory)
    }

    pub fn with_location(location: StoreLocation) -> Self {
        Self {
            location,
            conn: OnceCell::new(),
        }
    }

    /// Store named by `cache.path`, else the default location.
    ///
    /// `cache.enabled` is not a property of the store: it only decides
    /// whether the pipeline consults processed records before working.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        match &config.path {
            Some(path) => Ok(Self::new(path)),
            None => Self::at_default_location(),
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn path(&self) -> Option<&Path> {
        self.location.path()
    }

    /// Open the store now instead of on first use, surfacing `StorageInit`
    /// errors up front.
    pub fn ensure_open(&self) -> Result<()> {
        self.connection().map(|_| ())
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        let conn = self
            .conn
            .get_or_try_init(|| store::open_store(&self.location).map(Mutex::new))?;
        Ok(conn.lock())
    }

    /// Look up the processed record for `digest`. `Ok(None)` means the item
    /// has not been processed; an `Err` means the store could not answer.
    pub fn is_processed(&self, digest: impl AsRef<str>) -> Result<Option<ProcessedRecord>> {
        let digest = digest.as_ref();
        let conn = self.connection()?;
        let record = conn
            .query_row(
                "SELECT content_hash, source, processed_at, output_path, artifact_path
                 FROM processed WHERE content_hash = ?1",
                params![digest],
                |row| {
                    Ok(ProcessedRecord {
                        digest: row.get(0)?,
                        source: row.get(1)?,
                        processed_at: row.get(2)?,
                        output_location: row.get(3)?,
                        artifact_location: row.get(4)?,
                    })
                },
            )
            .optional()?;

        tracing::debug!(
            "Processed lookup for {}: {}",
            digest,
            if record.is_some() { "hit" } else { "miss" }
        );
        Ok(record)
    }

    /// Record `digest` as processed, replacing any earlier record for it.
    pub fn mark_processed(
        &self,
        digest: impl AsRef<str>,
        source: &str,
        output_location: Option<&str>,
        artifact_location: Option<&str>,
    ) -> Result<()> {
        let digest = digest.as_ref();
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO processed (content_hash, source, processed_at, output_path, artifact_path)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![digest, source, now_unix_secs(), output_location, artifact_location],
        )?;
        tracing::debug!("Marked {} processed (source: {})", digest, source);
        Ok(())
    }

    /// Memoized payload for `key`, if any.
    pub fn get_cached_response(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get_cached_entry(key)?.map(|entry| entry.payload))
    }

    /// Memoized payload for `key` together with the model and timestamp.
    pub fn get_cached_entry(&self, key: &str) -> Result<Option<CachedResponse>> {
        let conn = self.connection()?;
        let row = conn
            .query_row(
                "SELECT response_json, model, created_at FROM response_cache WHERE cache_key = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, f64>(2)?)),
            )
            .optional()?;
        drop(conn);

        let Some((json, model, created_at)) = row else {
            tracing::debug!("Response cache miss for {}", key);
            return Ok(None);
        };

        let payload: Value = serde_json::from_str(&json).map_err(|e| {
            NiobiumError::storage_io_with_source(format!("Corrupt cached response for key {}", key), e)
        })?;
        tracing::debug!("Response cache hit for {} (model: {})", key, model);
        Ok(Some(CachedResponse {
            key: key.to_string(),
            payload,
            model,
            created_at,
        }))
    }

    /// Store `payload` under `key`, replacing any earlier response.
    pub fn set_cached_response(&self, key: &str, payload: &Value, model: &str) -> Result<()> {
        let json = serde_json::to_string(payload)?;
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO response_cache (cache_key, response_json, model, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, json, model, now_unix_secs()],
        )?;
        Ok(())
    }

    /// Return the memoized response for `key`, or run `compute`, store its
    /// result and return it. A failing `compute` stores nothing.
    pub fn memoize<F>(&self, key: &str, model: &str, compute: F) -> Result<Value>
    where
        F: FnOnce() -> Result<Value>,
    {
        if let Some(payload) = self.get_cached_response(key)? {
            return Ok(payload);
        }
        let payload = compute()?;
        self.set_cached_response(key, &payload, model)?;
        Ok(payload)
    }

    /// Remove every processed record and cached response in one transaction.
    pub fn clear_all(&self) -> Result<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let processed = tx.execute("DELETE FROM processed", [])?;
        let responses = tx.execute("DELETE FROM response_cache", [])?;
        tx.commit()?;
        tracing::info!(
            "Cleared cache: {} processed records, {} cached responses",
            processed,
            responses
        );
        Ok(())
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let conn = self.connection()?;
        let processed: i64 = conn.query_row("SELECT COUNT(*) FROM processed", [], |row| row.get(0))?;
        let cached_responses: i64 = conn.query_row("SELECT COUNT(*) FROM response_cache", [], |row| row.get(0))?;
        Ok(CacheStats {
            processed: processed as usize,
            cached_responses: cached_responses as usize,
        })
    }
}
