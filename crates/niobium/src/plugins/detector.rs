//! Text detector trait.

use crate::Result;
use crate::geometry::Region;
use std::path::Path;

/// Per-call detection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectOptions {
    /// Language codes in priority order.
    pub languages: Vec<String>,
}

impl DetectOptions {
    /// Parse a comma separated list such as `"en, de"`. Blank entries are
    /// skipped; an empty list falls back to `en`.
    pub fn from_langs(langs: &str) -> Self {
        let mut languages: Vec<String> = langs
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if languages.is_empty() {
            languages.push("en".to_string());
        }
        Self { languages }
    }
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self::from_langs("en")
    }
}

/// Trait for text detection engines.
///
/// Implementations return raw, possibly fragmented detections in the
/// detector's own order. They must be thread-safe (`Send + Sync`) so one
/// instance can be shared across a batch.
///
/// # Example
///
/// ```rust
/// use niobium::Result;
/// use niobium::geometry::Region;
/// use niobium::plugins::{DetectOptions, TextDetector};
///
/// struct WholeImage;
///
/// impl TextDetector for WholeImage {
///     fn name(&self) -> &str {
///         "whole-image"
///     }
///
///     fn detect(&self, image: &[u8], options: &DetectOptions) -> Result<Vec<Region>> {
///         if image.is_empty() {
///             return Ok(Vec::new());
///         }
///         let text = format!("label ({})", options.languages.join("+"));
///         Ok(vec![Region::from_rect(0.0, 0.0, 100.0, 20.0, text, 1.0)])
///     }
/// }
/// ```
pub trait TextDetector: Send + Sync {
    fn name(&self) -> &str;

    /// Detect text regions in an encoded image.
    ///
    /// # Errors
    ///
    /// - `NiobiumError::Detector` - the engine failed
    /// - `NiobiumError::Io` - I/O errors (these always bubble up)
    fn detect(&self, image: &[u8], options: &DetectOptions) -> Result<Vec<Region>>;

    /// Detect text regions in an image file.
    ///
    /// Default implementation reads the file and calls `detect`.
    fn detect_file(&self, path: &Path, options: &DetectOptions) -> Result<Vec<Region>> {
        let bytes = std::fs::read(path)?;
        self.detect(&bytes, options)
    }

    /// Whether the engine can read `lang`. Defaults to accepting everything.
    fn supports_language(&self, _lang: &str) -> bool {
        true
    }
}

/// Detector that returns a fixed list of regions for every image.
///
/// Useful for replaying detections captured earlier.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    regions: Vec<Region>,
}

impl StaticDetector {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }
}

impl TextDetector for StaticDetector {
    fn name(&self) -> &str {
        "static"
    }

    fn detect(&self, _image: &[u8], _options: &DetectOptions) -> Result<Vec<Region>> {
        Ok(self.regions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NiobiumError;

    struct FailingDetector;

    impl TextDetector for FailingDetector {
        fn name(&self) -> &str {
            "failing"
        }

        fn supports_language(&self, lang: &str) -> bool {
            lang == "en"
        }

        fn detect(&self, _image: &[u8], _options: &DetectOptions) -> Result<Vec<Region>> {
            Err(NiobiumError::Detector {
                message: "model not loaded".to_string(),
                detector: self.name().to_string(),
            })
        }
    }

    #[test]
    fn test_static_detector_replays_regions() {
        let region = Region::from_rect(1.0, 2.0, 3.0, 4.0, "Aorta", 0.8);
        let detector = StaticDetector::new(vec![region.clone()]);
        assert_eq!(detector.detect(b"anything", &DetectOptions::default()).unwrap(), vec![region]);
    }

    #[test]
    fn test_detect_file_reads_then_detects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"png").unwrap();

        let detector = StaticDetector::default();
        assert!(detector.detect_file(&path, &DetectOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_detect_file_missing_is_io_error() {
        let err = FailingDetector
            .detect_file(Path::new("/nonexistent/scan.png"), &DetectOptions::default())
            .unwrap_err();
        assert!(matches!(err, NiobiumError::Io(_)));
    }

    #[test]
    fn test_detector_error_carries_name() {
        let err = FailingDetector.detect(b"png", &DetectOptions::default()).unwrap_err();
        assert!(err.to_string().contains("'failing'"));
    }

    #[test]
    fn test_detect_options_from_langs() {
        assert_eq!(DetectOptions::from_langs("en, de,,la ").languages, vec!["en", "de", "la"]);
        assert_eq!(DetectOptions::from_langs(" , ").languages, vec!["en"]);
        assert_eq!(DetectOptions::default().languages, vec!["en"]);
    }

    #[test]
    fn test_supports_language() {
        assert!(StaticDetector::default().supports_language("xx"));
        assert!(FailingDetector.supports_language("en"));
        assert!(!FailingDetector.supports_language("de"));
    }
}
