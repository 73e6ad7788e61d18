//! Region geometry and the merge engine.
//!
//! Pure functions only: nothing here performs I/O or holds state.
//!
//! # Example
//!
//! ```rust
//! use niobium::geometry::{Region, merge_regions};
//!
//! let regions = vec![
//!     Region::from_rect(0.0, 0.0, 10.0, 5.0, "Glo", 0.6),
//!     Region::from_rect(12.0, 0.0, 10.0, 5.0, "merulus", 0.9),
//! ];
//! let merged = merge_regions(regions, 5.0, 5.0);
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].text, "Glo merulus");
//! ```
pub mod merge;
pub mod region;

pub use merge::{MergeLimits, merge_regions, merge_with_limits};
pub use region::{BoundingBox, MergedRegion, Point, Quad, Region, TOUCH_TOLERANCE};
