//! Extension-to-folder mapping.
//!
//! This module owns the table that decides where a file goes based on its
//! extension. The table is built once per run from the built-in defaults,
//! optionally merged with a user-supplied JSON override file, and is
//! immutable afterwards.
//!
//! # Configuration File Format
//!
//! A flat JSON object mapping dotted lowercase extension keys to relative
//! folder paths, with an optional `__others__` key for the fallback folder:
//!
//! ```json
//! {
//!     ".js": "custom/js",
//!     ".svg": "public/icons",
//!     "__others__": "unsorted"
//! }
//! ```
//!
//! Override entries win per key; every default entry without an override
//! remains in effect.

use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Sentinel key for extensions with no explicit rule.
pub const OTHERS_KEY: &str = "__others__";

/// Folder the sentinel key points at unless a config overrides it.
const DEFAULT_OTHERS_FOLDER: &str = "misc";

/// Built-in rules, dotted lowercase keys.
const DEFAULT_RULES: &[(&str, &str)] = &[
    (".html", "src/pages"),
    (".css", "src/styles"),
    (".js", "src/scripts"),
    (".json", "src/data"),
    (".png", "public/images"),
    (".jpg", "public/images"),
    (".jpeg", "public/images"),
    (".gif", "public/images"),
    (".mp4", "public/videos"),
    (".webm", "public/videos"),
    (OTHERS_KEY, DEFAULT_OTHERS_FOLDER),
];

/// Errors that can occur while loading the mapping.
#[derive(Debug, Clone)]
pub enum MappingError {
    /// Config file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Config file is not a flat JSON object of string-to-string entries.
    ConfigInvalid {
        /// The config file that failed to parse.
        path: PathBuf,
        /// The underlying parse error.
        reason: String,
    },
    /// A non-sentinel key maps to an empty folder string.
    EmptyFolder { key: String },
    /// IO error while reading the config file.
    IoError { path: PathBuf, reason: String },
}

impl std::fmt::Display for MappingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            MappingError::ConfigInvalid { path, reason } => {
                write!(f, "Invalid configuration {}: {}", path.display(), reason)
            }
            MappingError::EmptyFolder { key } => {
                write!(f, "Mapping entry '{}' has an empty folder", key)
            }
            MappingError::IoError { path, reason } => {
                write!(f, "IO error reading {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for MappingError {}

/// Extension-to-folder association table with a fallback entry.
///
/// Invariant: the `__others__` sentinel is always present and non-empty, so
/// every extension resolves to some folder.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    entries: HashMap<String, String>,
}

impl Mapping {
    /// Creates a mapping holding only the built-in default rules.
    pub fn defaults() -> Self {
        Self {
            entries: DEFAULT_RULES
                .iter()
                .map(|(ext, folder)| (ext.to_string(), folder.to_string()))
                .collect(),
        }
    }

    /// Loads the mapping for a run.
    ///
    /// Without a config path this is the built-in default table. With one,
    /// the file must exist and parse as a flat JSON object of string
    /// entries; its entries then override same-key defaults. A config that
    /// was explicitly requested but cannot be used is an error, never a
    /// silent fallback.
    pub fn load(config_path: Option<&Path>) -> Result<Self, MappingError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::defaults()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, MappingError> {
        if !path.is_file() {
            return Err(MappingError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| MappingError::IoError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let overrides: Mapping =
            serde_json::from_str(&content).map_err(|e| MappingError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!(
            "loaded {} override entries from {}",
            overrides.entries.len(),
            path.display()
        );

        let mut mapping = Self::defaults();
        mapping.merge(overrides)?;
        Ok(mapping)
    }

    /// Merges override entries on top of this mapping, one key at a time.
    ///
    /// Keys are normalized to lowercase. An empty folder for the sentinel
    /// key keeps the default fallback folder; an empty folder anywhere else
    /// is rejected.
    fn merge(&mut self, overrides: Mapping) -> Result<(), MappingError> {
        for (key, folder) in overrides.entries {
            let key = key.to_lowercase();
            if folder.is_empty() {
                if key == OTHERS_KEY {
                    debug!(
                        "config left {} empty, keeping '{}'",
                        OTHERS_KEY, DEFAULT_OTHERS_FOLDER
                    );
                    continue;
                }
                return Err(MappingError::EmptyFolder { key });
            }
            self.entries.insert(key, folder);
        }
        Ok(())
    }

    /// Returns the folder for a dotted lowercase extension key (e.g. `.png`),
    /// falling back to the sentinel entry for unknown extensions.
    pub fn folder_for(&self, ext: &str) -> &str {
        self.entries
            .get(ext)
            .map(String::as_str)
            .unwrap_or_else(|| self.sentinel_folder())
    }

    /// Returns the fallback folder for unmatched extensions.
    pub fn sentinel_folder(&self) -> &str {
        self.entries
            .get(OTHERS_KEY)
            .map(String::as_str)
            .unwrap_or(DEFAULT_OTHERS_FOLDER)
    }

    /// Number of entries, sentinel included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Mapping {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp config");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp config");
        file
    }

    #[test]
    fn test_defaults_contain_sentinel() {
        let mapping = Mapping::defaults();
        assert_eq!(mapping.sentinel_folder(), "misc");
        assert!(!mapping.is_empty());
    }

    #[test]
    fn test_folder_for_known_extension() {
        let mapping = Mapping::defaults();
        assert_eq!(mapping.folder_for(".png"), "public/images");
        assert_eq!(mapping.folder_for(".html"), "src/pages");
    }

    #[test]
    fn test_folder_for_unknown_extension_falls_back() {
        let mapping = Mapping::defaults();
        assert_eq!(mapping.folder_for(".xyz"), "misc");
    }

    #[test]
    fn test_load_without_config_returns_defaults() {
        let mapping = Mapping::load(None).expect("Defaults should load");
        assert_eq!(mapping.len(), Mapping::defaults().len());
        assert_eq!(mapping.folder_for(".css"), "src/styles");
    }

    #[test]
    fn test_override_wins_per_key() {
        let config = write_config(r#"{ ".js": "custom/js" }"#);
        let mapping = Mapping::load(Some(config.path())).expect("Config should load");

        assert_eq!(mapping.folder_for(".js"), "custom/js");
        // Untouched defaults remain.
        assert_eq!(mapping.folder_for(".css"), "src/styles");
        assert_eq!(mapping.sentinel_folder(), "misc");
    }

    #[test]
    fn test_override_sentinel() {
        let config = write_config(r#"{ "__others__": "unsorted" }"#);
        let mapping = Mapping::load(Some(config.path())).expect("Config should load");
        assert_eq!(mapping.sentinel_folder(), "unsorted");
        assert_eq!(mapping.folder_for(".xyz"), "unsorted");
    }

    #[test]
    fn test_empty_sentinel_keeps_default() {
        let config = write_config(r#"{ "__others__": "" }"#);
        let mapping = Mapping::load(Some(config.path())).expect("Config should load");
        assert_eq!(mapping.sentinel_folder(), "misc");
    }

    #[test]
    fn test_empty_folder_is_rejected() {
        let config = write_config(r#"{ ".js": "" }"#);
        let result = Mapping::load(Some(config.path()));
        assert!(matches!(result, Err(MappingError::EmptyFolder { .. })));
    }

    #[test]
    fn test_keys_normalized_to_lowercase() {
        let config = write_config(r#"{ ".PNG": "images" }"#);
        let mapping = Mapping::load(Some(config.path())).expect("Config should load");
        assert_eq!(mapping.folder_for(".png"), "images");
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let result = Mapping::load(Some(Path::new("/no/such/config.json")));
        assert!(matches!(result, Err(MappingError::ConfigNotFound(_))));
    }

    #[test]
    fn test_malformed_config_is_fatal() {
        let config = write_config("{ not json");
        let result = Mapping::load(Some(config.path()));
        assert!(matches!(result, Err(MappingError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_non_string_values_are_rejected() {
        let config = write_config(r#"{ ".js": 42 }"#);
        let result = Mapping::load(Some(config.path()));
        assert!(matches!(result, Err(MappingError::ConfigInvalid { .. })));
    }
}
