//! Rule-based filtering of detected text.
//!
//! Rules come from [`ExcludeConfig`] and the `extra` annotation list of
//! [`NiobiumConfig`](crate::core::config::NiobiumConfig):
//!
//! - a detection matching any `exclude.regex` pattern is dropped
//! - a detection equal to an `exclude.exact` entry, ignoring case, is dropped;
//!   so is one equal to the entry with its words reversed
//! - a detection equal to an `extra` key, ignoring case, contributes the
//!   annotation to the card's extra notes and is kept

use crate::core::config::{ExcludeConfig, NiobiumConfig};
use crate::error::Result;
use crate::geometry::Region;
use indexmap::IndexMap;
use regex::Regex;

/// Separator appended after each collected annotation.
pub const EXTRA_SEPARATOR: &str = "<br>";

/// Regions that survived filtering plus collected annotations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub kept: Vec<Region>,
    /// Annotations, each followed by [`EXTRA_SEPARATOR`].
    pub extra: String,
    pub discarded: usize,
}

#[derive(Debug, Clone)]
pub struct DetectionFilter {
    patterns: Vec<Regex>,
    exact: Vec<String>,
    extra: Vec<(String, String)>,
}

impl DetectionFilter {
    /// Compile exclusion rules and annotations.
    ///
    /// # Errors
    ///
    /// `NiobiumError::Validation` if a pattern is not a valid regex.
    pub fn new(exclude: &ExcludeConfig, extra: &[IndexMap<String, String>]) -> Result<Self> {
        let patterns = exclude
            .regex
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let exact = exclude.exact.iter().map(|e| e.to_lowercase()).collect();
        let extra = extra
            .iter()
            .flat_map(|entry| entry.iter())
            .map(|(text, note)| (text.to_lowercase(), note.clone()))
            .collect();

        Ok(Self { patterns, exact, extra })
    }

    pub fn from_config(config: &NiobiumConfig) -> Result<Self> {
        Self::new(&config.exclude, &config.extra)
    }

    /// A filter that keeps everything.
    pub fn permissive() -> Self {
        Self {
            patterns: Vec::new(),
            exact: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn is_excluded(&self, text: &str) -> bool {
        if self.patterns.iter().any(|re| re.is_match(text)) {
            return true;
        }
        let lowered = text.to_lowercase();
        let reversed = reverse_word_order(&lowered);
        self.exact.iter().any(|rule| *rule == lowered || *rule == reversed)
    }

    /// Annotation for `text`, first matching entry wins.
    pub fn annotation_for(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.extra
            .iter()
            .find(|(key, _)| *key == lowered)
            .map(|(_, note)| note.as_str())
    }

    pub fn apply(&self, regions: Vec<Region>) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();

        for region in regions {
            if let Some(note) = self.annotation_for(&region.text) {
                tracing::debug!("Adding extra information for {}", region.text);
                outcome.extra.push_str(note);
                outcome.extra.push_str(EXTRA_SEPARATOR);
            }

            if self.is_excluded(&region.text) {
                tracing::debug!("Discarding occlusion with text {}", region.text);
                outcome.discarded += 1;
            } else {
                outcome.kept.push(region);
            }
        }

        outcome
    }
}

/// Words in reverse order, single-space separated.
pub fn reverse_word_order(text: &str) -> String {
    text.split_whitespace().rev().collect::<Vec<_>>().join(" ")
}
