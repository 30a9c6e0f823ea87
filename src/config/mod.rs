//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::toy::{DEFAULT_LABELS, LabelVocabulary};

/// Catalog client configuration
///
/// Every field has a default, so an empty document is a valid configuration.
///
/// # Example
/// ```yaml
/// base_url: http://localhost:3030/api
/// debounce_ms: 500
/// labels:
///   - Doll
///   - Puzzle
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root of the REST API; toys live under `{base_url}/toy`
    pub base_url: String,

    /// Label vocabulary, in display order
    pub labels: Vec<String>,

    /// Delay applied to filter input before querying
    pub debounce_ms: u64,

    /// Per-request timeout for the REST store
    pub request_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "/api".to_string(),
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            debounce_ms: 300,
            request_timeout_secs: 10,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        if config.labels.is_empty() {
            anyhow::bail!("label vocabulary must not be empty");
        }
        Ok(config)
    }

    pub fn vocabulary(&self) -> LabelVocabulary {
        LabelVocabulary::new(self.labels.iter().cloned())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `base_url` without a trailing slash
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
