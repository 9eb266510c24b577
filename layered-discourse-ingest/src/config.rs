//! Ingestion configuration, read from TOML.

use layered_discourse::SenseSelector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{IngestError, IngestResult};

/// Senses whose third level is kept when reducing to level 2.
pub const RESTATEMENT_OVERRIDES: [&str; 2] = [
    "Expansion.Restatement.Equivalence",
    "Expansion.Restatement.Specification",
];

/// Configuration shared by both pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Sense selection; a `[sense]` table replaces the defaults field by field.
    #[serde(default = "default_sense")]
    pub sense: SenseSelector,
}

fn default_sense() -> SenseSelector {
    SenseSelector::default().with_overrides(RESTATEMENT_OVERRIDES)
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sense: default_sense(),
        }
    }
}

impl IngestConfig {
    /// Create with a specific sense selector.
    pub fn with_sense(sense: SenseSelector) -> Self {
        Self { sense }
    }

    /// Parse from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from a TOML file; a missing file means defaults.
    pub fn load(path: &Path) -> IngestResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| IngestError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| IngestError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.sense.level, 2);
        assert!(config
            .sense
            .overrides
            .contains("Expansion.Restatement.Specification"));
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(IngestConfig::from_toml("").unwrap(), IngestConfig::default());
    }

    #[test]
    fn test_sense_table() {
        let config = IngestConfig::from_toml(
            r#"
            [sense]
            level = 3
            conn_index = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.sense.level, 3);
        assert_eq!(config.sense.conn_index, 1);
        assert_eq!(config.sense.sense_index, 0);
        assert!(config.sense.overrides.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = IngestConfig::load(&dir.path().join("ingest.toml")).unwrap();
        assert_eq!(config, IngestConfig::default());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.toml");
        fs::write(&path, "[sense]\nlevel = \"deep\"\n").unwrap();
        assert!(matches!(
            IngestConfig::load(&path),
            Err(IngestError::Config { .. })
        ));
    }
}
