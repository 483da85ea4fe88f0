//! Parse options for the DOT grammar
//!
//! Options deserialize from YAML or JSON. Every field has a default, so an
//! empty document yields [`DotOptions::default`]; unknown keys are rejected.
//!
//! ```yaml
//! comments: keep
//! validate_compass: false
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommentMode {
    /// Comments never reach the grammar.
    #[default]
    Skip,
    /// Comments between statements and graphs become `COMMENT` nodes.
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DotOptions {
    pub comments: CommentMode,
    /// Reject `id:port:compass` ports whose compass is not a compass point.
    pub validate_compass: bool,
    /// Reject `--` in a digraph and `->` in a graph.
    pub validate_edge_ops: bool,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            comments: CommentMode::Skip,
            validate_compass: true,
            validate_edge_ops: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML options: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown options format for {0} (expected .yaml, .yml or .json)")]
    UnknownFormat(PathBuf),
}

impl DotOptions {
    pub fn keep_comments(&self) -> bool {
        self.comments == CommentMode::Keep
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load options from a file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ConfigError::UnknownFormat(path.to_path_buf())),
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DotOptions::default();
        assert_eq!(options.comments, CommentMode::Skip);
        assert!(options.validate_compass);
        assert!(options.validate_edge_ops);
        assert_eq!(DotOptions::from_yaml_str("").unwrap(), options);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let options = DotOptions::from_yaml_str("comments: keep\n").unwrap();
        assert!(options.keep_comments());
        assert!(options.validate_compass);
    }

    #[test]
    fn test_json_options() {
        let options = DotOptions::from_json_str(r#"{"validate_edge_ops": false}"#).unwrap();
        assert!(!options.validate_edge_ops);
        assert_eq!(options.comments, CommentMode::Skip);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = DotOptions::from_yaml_str("strictness: high\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = std::env::temp_dir().join(format!("dotparse-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("options.yml");
        fs::write(&path, "validate_compass: false\n").unwrap();

        let options = DotOptions::load(&path).unwrap();
        assert!(!options.validate_compass);

        let err = DotOptions::load(dir.join("options.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFormat(_)));
        fs::remove_dir_all(&dir).unwrap();
    }
}
