//! Boundaries to external collaborators.
//!
//! The text detector is not part of this crate. It is reached through the
//! [`TextDetector`] trait so the pipeline can be driven by any engine, or by a
//! fixed list of regions in tests.

pub mod detector;

pub use detector::{DetectOptions, StaticDetector, TextDetector};
