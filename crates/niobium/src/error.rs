//! Error types for Niobium.
//!
//! Every fallible operation in the crate returns [`NiobiumError`] through the
//! [`Result`] alias. Errors are built with `thiserror` and keep their source
//! chain via `#[source]`.
//!
//! # Error Handling Philosophy
//!
//! **System errors bubble up unchanged:**
//! - `NiobiumError::Io` (from `std::io::Error`) - reading a file to digest it,
//!   reading a config file
//!
//! **Storage errors are split by phase:**
//! - `StorageInit` - the cache store could not be created or opened. Fatal,
//!   the batch run should stop.
//! - `StorageIo` - a read or write failed on an already open store. Callers
//!   decide whether to abort or to behave as if no cache existed, but they must
//!   never read "not processed" out of a storage error.
//!
//! **Page specifications that disagree with the document:**
//! - `InvalidRange` - a `start-end` spec that is reversed or falls outside the
//!   document
//! - `OutOfRange` - a single page that falls outside the document
//!
//! # Example
//!
//! ```rust
//! use niobium::{NiobiumError, Result};
//!
//! fn read_source(path: &str) -> Result<Vec<u8>> {
//!     let bytes = std::fs::read(path)?;
//!     if bytes.is_empty() {
//!         return Err(NiobiumError::validation(format!("Source is empty: {}", path)));
//!     }
//!     Ok(bytes)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `NiobiumError`.
pub type Result<T> = std::result::Result<T, NiobiumError>;

/// Main error type for all Niobium operations.
#[derive(Debug, Error)]
pub enum NiobiumError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid page range '{spec}' for a document with {total_pages} pages")]
    InvalidRange { spec: String, total_pages: usize },

    #[error("Page '{spec}' is out of range for a document with {total_pages} pages")]
    OutOfRange { spec: String, total_pages: usize },

    #[error("Storage initialization failed: {message}")]
    StorageInit {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Storage I/O error: {message}")]
    StorageIo {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Detector error in '{detector}': {message}")]
    Detector { message: String, detector: String },
}

impl From<serde_json::Error> for NiobiumError {
    fn from(err: serde_json::Error) -> Self {
        NiobiumError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// Failures opening the store are mapped to `StorageInit` explicitly at the call site.
impl From<rusqlite::Error> for NiobiumError {
    fn from(err: rusqlite::Error) -> Self {
        NiobiumError::StorageIo {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<regex::Error> for NiobiumError {
    fn from(err: regex::Error) -> Self {
        NiobiumError::Validation {
            message: format!("Invalid regex pattern: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl NiobiumError {
    error_constructor!(storage_init, StorageInit);
    error_constructor!(storage_io, StorageIo);
    error_constructor!(validation, Validation);
    error_constructor!(config, Config);
    error_constructor!(serialization, Serialization);

    /// True for errors raised because a page spec disagrees with the document.
    pub fn is_page_error(&self) -> bool {
        matches!(self, Self::InvalidRange { .. } | Self::OutOfRange { .. })
    }

    /// True for errors raised by the cache backing store.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::StorageInit { .. } | Self::StorageIo { .. })
    }
}
