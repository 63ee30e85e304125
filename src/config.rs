// ==============================================================================
// config.rs - Report Table Configuration
// ==============================================================================
// Description: JSON configuration for table comments and column filter types
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format:
//   {
//     "comments": { "mlst-results": "Sequence types from the MLST scheme" },
//     "datatype": { "ST": "input", "Coverage": "number" },
//     "classifier": { "categorical_overrides": ["ST", "MLST", "cgST"] }
//   }
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::annotation::ClassifierConfig;
use crate::tables::HeaderFilter;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file {0:?} not found")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Per-table comments and per-column filter overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table link -> comment shown under the table
    #[serde(default)]
    pub comments: HashMap<String, String>,

    /// Column name -> forced header filter type
    #[serde(default)]
    pub datatype: HashMap<String, HeaderFilter>,

    /// Annotation column classification
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl TableConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        debug!(
            "Loaded table config {:?}: {} comments, {} datatype overrides, {} categorical overrides",
            path,
            config.comments.len(),
            config.datatype.len(),
            config.classifier.categorical_overrides.len()
        );
        Ok(config)
    }

    pub fn comment(&self, link: &str) -> &str {
        self.comments.get(link).map(String::as_str).unwrap_or("")
    }

    pub fn datatype(&self, column: &str) -> Option<HeaderFilter> {
        self.datatype.get(column).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"comments": {{"mlst": "Typing results"}}, "datatype": {{"ST": "input"}}}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = TableConfig::load(file.path()).unwrap();
        assert_eq!(config.comment("mlst"), "Typing results");
        assert_eq!(config.comment("other"), "");
        assert_eq!(config.datatype("ST"), Some(HeaderFilter::Input));
        assert_eq!(config.datatype("Coverage"), None);
    }

    #[test]
    fn test_sections_default_to_empty() {
        let config: TableConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TableConfig::default());
        assert!(config.classifier.is_override("ST"));
        assert!(config.classifier.is_override("MSLT"));
    }

    #[test]
    fn test_load_categorical_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"classifier": {{"categorical_overrides": ["cgST", "ST"]}}}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = TableConfig::load(file.path()).unwrap();
        assert!(config.classifier.is_override("cgST"));
        assert!(config.classifier.is_override("ST"));
        assert!(!config.classifier.is_override("MLST"));
        assert!(config.comments.is_empty());
    }

    #[test]
    fn test_empty_classifier_section_keeps_default_overrides() {
        let config: TableConfig = serde_json::from_str(r#"{"classifier": {}}"#).unwrap();
        assert_eq!(config.classifier, ClassifierConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TableConfig::load(dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            TableConfig::load(file.path()).unwrap_err(),
            ConfigError::JsonError(_)
        ));
    }
}
