//! Page specifications.
//!
//! Users name pages the way the document prints them ("iv", "12", "A-3") or
//! by plain 1-based position. [`resolve_page_range`] turns a spec such as
//! `"5"` or `"5-10"` into zero-based physical indices, consulting the
//! document's page labels first when they are available.

use crate::error::{NiobiumError, Result};
use std::collections::BTreeSet;

/// Read-only view of a document's page-label dictionary.
pub trait PageLabels {
    /// Physical zero-based indices whose label is exactly `label`.
    fn indices_for(&self, label: &str) -> Vec<usize>;
}

/// Page labels held in memory, one per physical page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLabelMap {
    labels: Vec<String>,
}

impl PageLabelMap {
    /// `labels[i]` is the label printed on physical page `i`.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}

impl PageLabels for PageLabelMap {
    fn indices_for(&self, label: &str) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.as_str() == label)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Resolve one token to a zero-based index. `None` when the token is neither a
/// known label nor a positive integer.
fn resolve_token(token: &str, labels: Option<&dyn PageLabels>) -> Option<usize> {
    let token = token.trim();
    if let Some(labels) = labels
        && let Some(index) = labels.indices_for(token).into_iter().min()
    {
        return Some(index);
    }
    match token.parse::<usize>() {
        Ok(page) if page >= 1 => Some(page - 1),
        _ => None,
    }
}

/// Split `spec` at the first hyphen whose two sides both resolve, so ranges
/// between hyphenated labels ("A-1-A-3") work.
fn resolve_split(spec: &str, labels: Option<&dyn PageLabels>) -> Option<(usize, usize)> {
    spec.match_indices('-').find_map(|(at, _)| {
        let start = resolve_token(&spec[..at], labels)?;
        let end = resolve_token(&spec[at + 1..], labels)?;
        Some((start, end))
    })
}

/// Convert a page spec into the set of zero-based physical indices it covers.
///
/// # Errors
///
/// - `OutOfRange` if a single-page spec doesn't name a page of the document
/// - `InvalidRange` if a `start-end` spec is reversed, unparseable, or runs
///   past the last page
///
/// # Example
///
/// ```rust
/// use niobium::pages::resolve_page_range;
///
/// let pages = resolve_page_range("5-10", 20, None).unwrap();
/// assert_eq!(pages.into_iter().collect::<Vec<_>>(), vec![4, 5, 6, 7, 8, 9]);
/// ```
pub fn resolve_page_range(spec: &str, total_pages: usize, labels: Option<&dyn PageLabels>) -> Result<BTreeSet<usize>> {
    let trimmed = spec.trim();

    // A whole label wins over a hyphen split, so "A-3" can name one page.
    let as_single = labels.and_then(|l| l.indices_for(trimmed).into_iter().min());

    let resolved = match as_single {
        None if trimmed.contains('-') => {
            let invalid = || NiobiumError::InvalidRange {
                spec: spec.to_string(),
                total_pages,
            };
            let (start, end) = resolve_split(trimmed, labels).ok_or_else(invalid)?;
            if start > end || end >= total_pages {
                return Err(invalid());
            }
            (start..=end).collect()
        }
        single => {
            let index = single
                .or_else(|| resolve_token(trimmed, labels))
                .filter(|&i| i < total_pages)
                .ok_or_else(|| NiobiumError::OutOfRange {
                    spec: spec.to_string(),
                    total_pages,
                })?;
            BTreeSet::from([index])
        }
    };

    tracing::debug!("Resolved page spec '{}' to {} page(s)", spec, resolved.len());
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(set: BTreeSet<usize>) -> Vec<usize> {
        set.into_iter().collect()
    }

    #[test]
    fn test_plain_range() {
        assert_eq!(pages(resolve_page_range("5-10", 20, None).unwrap()), vec![4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_single_page() {
        assert_eq!(pages(resolve_page_range("1", 20, None).unwrap()), vec![0]);
        assert_eq!(pages(resolve_page_range("20", 20, None).unwrap()), vec![19]);
    }

    #[test]
    fn test_single_page_out_of_range() {
        let err = resolve_page_range("25", 20, None).unwrap_err();
        assert!(matches!(err, NiobiumError::OutOfRange { total_pages: 20, .. }));
    }

    #[test]
    fn test_zero_and_garbage_are_out_of_range() {
        assert!(matches!(
            resolve_page_range("0", 20, None).unwrap_err(),
            NiobiumError::OutOfRange { .. }
        ));
        assert!(matches!(
            resolve_page_range("abc", 20, None).unwrap_err(),
            NiobiumError::OutOfRange { .. }
        ));
    }

    #[test]
    fn test_reversed_range_is_invalid() {
        let err = resolve_page_range("10-5", 20, None).unwrap_err();
        match err {
            NiobiumError::InvalidRange { spec, total_pages } => {
                assert_eq!(spec, "10-5");
                assert_eq!(total_pages, 20);
            }
            other => panic!("expected InvalidRange, got {:?}", other),
        }
    }

    #[test]
    fn test_range_past_end_is_invalid() {
        assert!(matches!(
            resolve_page_range("15-21", 20, None).unwrap_err(),
            NiobiumError::InvalidRange { .. }
        ));
        assert_eq!(pages(resolve_page_range("15-20", 20, None).unwrap()).len(), 6);
    }

    #[test]
    fn test_malformed_ranges_are_invalid() {
        for spec in ["-5", "5-", "1-2-3", "a-b"] {
            assert!(
                matches!(resolve_page_range(spec, 20, None).unwrap_err(), NiobiumError::InvalidRange { .. }),
                "spec {} should be invalid",
                spec
            );
        }
    }

    #[test]
    fn test_labels_take_precedence() {
        let labels = PageLabelMap::from_labels(["i", "ii", "iii", "1", "2", "3", "4"]);
        let resolved = resolve_page_range("1-3", labels.len(), Some(&labels)).unwrap();
        assert_eq!(pages(resolved), vec![3, 4, 5]);

        let roman = resolve_page_range("ii", labels.len(), Some(&labels)).unwrap();
        assert_eq!(pages(roman), vec![1]);
    }

    #[test]
    fn test_unknown_label_falls_back_to_physical_number() {
        let labels = PageLabelMap::from_labels(["i", "ii", "1", "2"]);
        let resolved = resolve_page_range("4", labels.len(), Some(&labels)).unwrap();
        assert_eq!(pages(resolved), vec![3]);
    }

    #[test]
    fn test_hyphenated_label_is_single_page() {
        let labels = PageLabelMap::from_labels(["A-1", "A-2", "A-3"]);
        let resolved = resolve_page_range("A-3", labels.len(), Some(&labels)).unwrap();
        assert_eq!(pages(resolved), vec![2]);
    }

    #[test]
    fn test_range_between_hyphenated_labels() {
        let labels = PageLabelMap::from_labels(["A-1", "A-2", "A-3", "B-1"]);
        let resolved = resolve_page_range("A-1-A-3", labels.len(), Some(&labels)).unwrap();
        assert_eq!(pages(resolved), vec![0, 1, 2]);

        let mixed = resolve_page_range("A-2-4", labels.len(), Some(&labels)).unwrap();
        assert_eq!(pages(mixed), vec![1, 2, 3]);

        assert!(matches!(
            resolve_page_range("A-3-A-1", labels.len(), Some(&labels)).unwrap_err(),
            NiobiumError::InvalidRange { .. }
        ));
    }

    #[test]
    fn test_duplicate_label_uses_first_page() {
        let labels = PageLabelMap::from_labels(["1", "2", "1", "2"]);
        assert_eq!(pages(resolve_page_range("2", 4, Some(&labels)).unwrap()), vec![1]);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(pages(resolve_page_range(" 2 - 3 ", 5, None).unwrap()), vec![1, 2]);
    }

    #[test]
    fn test_label_map_accessors() {
        let labels = PageLabelMap::from_labels(vec!["cover".to_string()]);
        assert_eq!(labels.label(0), Some("cover"));
        assert_eq!(labels.label(1), None);
        assert!(!labels.is_empty());
    }
}
