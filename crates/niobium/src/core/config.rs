//! Configuration loading and management.
//!
//! Configuration can come from TOML, YAML or JSON files, be discovered in the
//! directory hierarchy (`niobium.toml`), or be resolved the way the command
//! line tool does it: an explicit path, then the per-user
//! `<config dir>/niobium/config.json`, then built-in defaults.

use crate::geometry::MergeLimits;
use crate::{NiobiumError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
///
/// # Example
///
/// ```rust
/// use niobium::core::config::NiobiumConfig;
///
/// let config = NiobiumConfig::default();
/// assert!(config.merge.enabled);
/// assert_eq!(config.merge.limit_x, 10.0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NiobiumConfig {
    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Detections to drop before card construction
    #[serde(default)]
    pub exclude: ExcludeConfig,

    /// Notes attached to a card when a detection's text matches a key.
    /// Each entry is a map of `{text: annotation}`.
    #[serde(default)]
    pub extra: Vec<IndexMap<String, String>>,

    /// Detector language list, comma separated (e.g. "en,de")
    #[serde(default = "default_langs")]
    pub langs: String,
}

/// Merge engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Horizontal proximity limit in pixels
    #[serde(default = "default_merge_limit")]
    pub limit_x: f64,

    /// Vertical proximity limit in pixels
    #[serde(default = "default_merge_limit")]
    pub limit_y: f64,
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `false` skips the cache for this run without clearing it
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Store location (None = `<config dir>/niobium/cache.db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Exclusion rules applied to detected text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeConfig {
    /// Drop detections whose text matches any of these patterns
    #[serde(default)]
    pub regex: Vec<String>,

    /// Drop detections equal to any of these (case-insensitive, either word order)
    #[serde(default)]
    pub exact: Vec<String>,
}

fn default_true() -> bool {
    true
}
fn default_merge_limit() -> f64 {
    10.0
}
fn default_langs() -> String {
    "en".to_string()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit_x: default_merge_limit(),
            limit_y: default_merge_limit(),
        }
    }
}

impl MergeConfig {
    pub fn limits(&self) -> MergeLimits {
        MergeLimits::new(self.limit_x, self.limit_y)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl NiobiumConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `NiobiumError::Config` if the file can't be read or isn't valid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| NiobiumError::config(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| NiobiumError::config(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| NiobiumError::config(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load a config file, choosing the format from its extension.
    /// Unknown extensions are read as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_json_file(path),
        }
    }

    /// Discover `niobium.toml` in the current directory or its parents.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(NiobiumError::Io)?;

        loop {
            let candidate = current.join("niobium.toml");
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// `<config dir>/niobium/config.json`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("niobium").join("config.json"))
    }

    /// Resolve configuration: an explicit path must exist; otherwise the
    /// per-user config is used when present, else the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(NiobiumError::config(format!("Config file not found: {}", path.display())));
            }
            tracing::info!("Using config: {}", path.display());
            return Self::from_file(path);
        }

        if let Some(user) = Self::user_config_path()
            && user.is_file()
        {
            tracing::info!("Using config: {}", user.display());
            return Self::from_file(&user);
        }

        tracing::debug!("Using built-in default config");
        Ok(Self::default())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| NiobiumError::config_with_source(format!("Failed to read config file {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = NiobiumConfig::default();
        assert!(config.merge.enabled);
        assert_eq!(config.merge.limits(), MergeLimits::new(10.0, 10.0));
        assert!(config.cache.enabled);
        assert!(config.cache.path.is_none());
        assert!(config.exclude.regex.is_empty());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: NiobiumConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.langs, "en");
        assert_eq!(config.merge.limit_y, 10.0);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "merge": {"enabled": true, "limit_x": 15, "limit_y": 8},
                "exclude": {"regex": ["^Fig\\.?\\s*\\d+"], "exact": ["copyright"]},
                "extra": [{"Glomerulus": "Filters blood plasma"}],
                "langs": "en,de"
            }"#,
        )
        .unwrap();

        let config = NiobiumConfig::from_file(&path).unwrap();
        assert_eq!(config.merge.limit_x, 15.0);
        assert_eq!(config.merge.limit_y, 8.0);
        assert_eq!(config.exclude.exact, vec!["copyright".to_string()]);
        assert_eq!(config.extra[0]["Glomerulus"], "Filters blood plasma");
        assert_eq!(config.langs, "en,de");
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("niobium.toml");
        fs::write(
            &path,
            r#"
[merge]
enabled = false

[cache]
enabled = false
path = "/tmp/niobium-test/cache.db"
        "#,
        )
        .unwrap();

        let config = NiobiumConfig::from_file(&path).unwrap();
        assert!(!config.merge.enabled);
        assert_eq!(config.merge.limit_x, 10.0);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.path, Some(PathBuf::from("/tmp/niobium-test/cache.db")));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "exclude:\n  exact:\n    - Panel A\nextra:\n  - Liver: Largest internal organ\n",
        )
        .unwrap();

        let config = NiobiumConfig::from_file(&path).unwrap();
        assert_eq!(config.exclude.exact, vec!["Panel A".to_string()]);
        assert_eq!(config.extra[0]["Liver"], "Largest internal organ");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = NiobiumConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, NiobiumError::Config { .. }));
    }

    #[test]
    fn test_resolve_missing_explicit_path() {
        let err = NiobiumConfig::resolve(Some(Path::new("/nonexistent/niobium.json"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{"langs": "fr"}"#).unwrap();

        let config = NiobiumConfig::resolve(Some(&path)).unwrap();
        assert_eq!(config.langs, "fr");
    }

    #[test]
    #[serial]
    fn test_discover_niobium_toml() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("niobium.toml"), "langs = \"la\"\n").unwrap();
        let nested = dir.path().join("decks").join("anatomy");
        fs::create_dir_all(&nested).unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&nested).unwrap();

        let result = std::panic::catch_unwind(|| {
            let config = NiobiumConfig::discover().unwrap();
            assert_eq!(config.unwrap().langs, "la");
        });

        std::env::set_current_dir(&original_dir).unwrap();

        if let Err(e) = result {
            std::panic::resume_unwind(e);
        }
    }
}
