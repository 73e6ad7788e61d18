//! Core orchestration: configuration and the per-item pipeline.
//!
//! - `config` - Configuration loading (TOML, YAML, JSON) and discovery
//! - `pipeline` - Digest, processed check, detection, merge and filter for one item

pub mod config;
pub mod pipeline;

pub use config::{CacheConfig, ExcludeConfig, MergeConfig, NiobiumConfig};
pub use pipeline::{OcclusionPipeline, PipelineOutcome};
