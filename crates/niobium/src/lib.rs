//! Niobium - image occlusion building blocks
//!
//! Niobium turns scanned or photographed study material into image-occlusion
//! flashcards. This crate holds the parts with real correctness content:
//!
//! - **Geometry** (`geometry`): merges fragmented text detections into
//!   coherent occlusion regions
//! - **Digest** (`digest`): stable SHA-256 content digests of images and files
//! - **Cache** (`cache`): SQLite-backed "already processed" tracking and
//!   memoization of remote-model responses
//! - **Pages** (`pages`): resolves user page specs ("5-10", "iv") to physical
//!   page indices
//!
//! Text detection, page rendering, the remote model and card packaging are
//! external collaborators. The detector is reached through
//! [`plugins::TextDetector`]; the rest stay with the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use niobium::cache::ContentCache;
//! use niobium::digest::digest_bytes;
//! use niobium::geometry::{Region, merge_regions};
//!
//! # fn main() -> niobium::Result<()> {
//! let cache = ContentCache::in_memory();
//! let image = b"encoded image bytes";
//! let digest = digest_bytes(image);
//!
//! if cache.is_processed(&digest)?.is_none() {
//!     let detections = vec![
//!         Region::from_rect(0.0, 0.0, 10.0, 5.0, "Glo", 0.6),
//!         Region::from_rect(12.0, 0.0, 10.0, 5.0, "merulus", 0.9),
//!     ];
//!     let regions = merge_regions(detections, 10.0, 10.0);
//!     assert_eq!(regions[0].text, "Glo merulus");
//!     // ... build and deliver the card, then:
//!     cache.mark_processed(&digest, "scan.png", None, None)?;
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod cache;
pub mod core;
pub mod digest;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod pages;
pub mod plugins;

pub use error::{NiobiumError, Result};

pub use cache::{CacheStats, CachedResponse, ContentCache, ProcessedRecord, cache_key, region_list_json};
pub use crate::core::config::NiobiumConfig;
pub use crate::core::pipeline::{OcclusionPipeline, PipelineOutcome};
pub use digest::{ContentDigest, digest_bytes, digest_file};
pub use filter::DetectionFilter;
pub use geometry::{BoundingBox, MergedRegion, Point, Region, merge_regions};
pub use pages::{PageLabelMap, PageLabels, resolve_page_range};
