//! Per-item occlusion pipeline.
//!
//! Runs one image through the stages in order:
//! 1. Digest - content hash of the encoded image
//! 2. Processed check - skip items the cache already knows (when
//!    `cache.enabled`)
//! 3. Detection - the external [`TextDetector`], in the `langs` languages
//! 4. Merge - consolidate fragments (when `merge.enabled`)
//! 5. Filter - exclusion rules and extra annotations
//!
//! The pipeline never marks an item processed. Callers do that through
//! [`OcclusionPipeline::cache`] once their own delivery step has succeeded.

use crate::{NiobiumError, Result};
use crate::cache::{ContentCache, ProcessedRecord};
use crate::core::config::{MergeConfig, NiobiumConfig};
use crate::digest::{ContentDigest, digest_bytes};
use crate::filter::{DetectionFilter, FilterOutcome};
use crate::geometry::{MergedRegion, Region, merge_with_limits};
use crate::plugins::{DetectOptions, TextDetector};
use std::path::Path;
use std::sync::Arc;

/// What happened to one item.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Already processed in an earlier run.
    Skipped { digest: ContentDigest, record: ProcessedRecord },
    /// Nothing left to occlude after merging and filtering.
    Empty { digest: ContentDigest },
    Processed {
        digest: ContentDigest,
        regions: Vec<MergedRegion>,
        /// Collected annotations, `<br>`-separated.
        extra: String,
    },
}

impl PipelineOutcome {
    pub fn digest(&self) -> &ContentDigest {
        match self {
            Self::Skipped { digest, .. } | Self::Empty { digest } | Self::Processed { digest, .. } => digest,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

pub struct OcclusionPipeline {
    detector: Arc<dyn TextDetector>,
    cache: ContentCache,
    filter: DetectionFilter,
    merge: MergeConfig,
    options: DetectOptions,
    skip_processed: bool,
}

impl OcclusionPipeline {
    /// # Errors
    ///
    /// `NiobiumError::Validation` if an exclusion pattern doesn't compile or
    /// the detector can't read one of the configured languages.
    pub fn new(detector: Arc<dyn TextDetector>, cache: ContentCache, config: &NiobiumConfig) -> Result<Self> {
        let options = DetectOptions::from_langs(&config.langs);
        if let Some(lang) = options.languages.iter().find(|l| !detector.supports_language(l)) {
            return Err(NiobiumError::validation(format!(
                "Detector '{}' does not support language '{}'",
                detector.name(),
                lang
            )));
        }

        Ok(Self {
            filter: DetectionFilter::from_config(config)?,
            merge: config.merge.clone(),
            options,
            skip_processed: config.cache.enabled,
            detector,
            cache,
        })
    }

    /// When `false`, items are reprocessed even if the cache has a record.
    /// Records are still readable and writable through [`Self::cache`].
    pub fn with_skip_processed(mut self, skip: bool) -> Self {
        self.skip_processed = skip;
        self
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn detector(&self) -> &dyn TextDetector {
        self.detector.as_ref()
    }

    pub fn detect_options(&self) -> &DetectOptions {
        &self.options
    }

    /// Merge (if enabled) then filter raw detections.
    pub fn consolidate(&self, regions: Vec<Region>) -> FilterOutcome {
        let regions = if self.merge.enabled {
            merge_with_limits(regions, self.merge.limits())
        } else {
            regions
        };
        self.filter.apply(regions)
    }

    pub fn process_bytes(&self, image: &[u8]) -> Result<PipelineOutcome> {
        let digest = digest_bytes(image);

        if self.skip_processed
            && let Some(record) = self.cache.is_processed(&digest)?
        {
            tracing::info!("Skipping {} (already processed from {})", digest, record.source);
            return Ok(PipelineOutcome::Skipped { digest, record });
        }

        let raw = self.detector.detect(image, &self.options)?;
        tracing::debug!("Detector '{}' found {} regions", self.detector.name(), raw.len());

        let FilterOutcome { kept, extra, .. } = self.consolidate(raw);
        if kept.is_empty() {
            tracing::warn!("No occlusions found for {}", digest);
            return Ok(PipelineOutcome::Empty { digest });
        }

        Ok(PipelineOutcome::Processed {
            digest,
            regions: kept,
            extra,
        })
    }

    pub fn process_file(&self, path: &Path) -> Result<PipelineOutcome> {
        let bytes = std::fs::read(path)?;
        tracing::debug!("Processing {}", path.display());
        self.process_bytes(&bytes)
    }
}
