use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Heuristic tunables, overridable through [`IngestConfig`].
pub const DEFAULT_EXTENSION: &str = "json";
pub const DEFAULT_PROSE_MIN_CHARS: usize = 20; // shorter map values look like labels/ids
pub const DEFAULT_FRAGMENT_MIN_CHARS: usize = 10; // last-resort recovery filter
pub const DEFAULT_MAX_RECOVERED_CHARS: usize = 20_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// File extension (without the dot) of transcript documents; matched
    /// case-insensitively.
    pub extension: String,
    /// Map members scanned during fallback flattening count as prose only
    /// when longer than this many characters.
    pub prose_min_chars: usize,
    /// Strings recovered by the last-resort pass must be longer than this.
    pub fragment_min_chars: usize,
    /// Cap on the text produced by the last-resort pass.
    pub max_recovered_chars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            prose_min_chars: DEFAULT_PROSE_MIN_CHARS,
            fragment_min_chars: DEFAULT_FRAGMENT_MIN_CHARS,
            max_recovered_chars: DEFAULT_MAX_RECOVERED_CHARS,
        }
    }
}

impl IngestConfig {
    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.json");
        std::fs::write(&path, r#"{"prose_min_chars": 40}"#).unwrap();

        let cfg = IngestConfig::from_path(&path).unwrap();
        assert_eq!(cfg.prose_min_chars, 40);
        assert_eq!(cfg.fragment_min_chars, DEFAULT_FRAGMENT_MIN_CHARS);
        assert_eq!(cfg.max_recovered_chars, DEFAULT_MAX_RECOVERED_CHARS);
        assert_eq!(cfg.extension, "json");
    }

    #[test]
    fn bad_config_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.json");
        std::fs::write(&path, "prose_min_chars = 40").unwrap();

        assert!(matches!(
            IngestConfig::from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn extension_match_ignores_case() {
        let cfg = IngestConfig::default();
        assert!(cfg.matches_extension(Path::new("a/b/meeting.JSON")));
        assert!(cfg.matches_extension(Path::new("meeting.json")));
        assert!(!cfg.matches_extension(Path::new("meeting.json.bak")));
        assert!(!cfg.matches_extension(Path::new("README")));
    }
}
