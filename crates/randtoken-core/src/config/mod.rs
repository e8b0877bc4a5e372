//! Configuration types for randtoken.
//!
//! # Configuration File
//!
//! ```yaml
//! tokens:
//!   token_length: 30
//!   token_count: 10
//!   enable_special_chars: true
//!   enable_random_case: true
//! storage:
//!   data_dir: data
//! display:
//!   detail_budget: 2000
//!   summary_limit: 10
//! ```

pub mod storage;
pub mod tokens;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use storage::{DisplayConfig, EXPORTS_DIR_NAME, STORE_FILE_NAME, StorageConfig};
pub use tokens::TokenPolicy;

/// Default configuration file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "randtoken.yaml";

/// Complete randtoken configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandtokenConfig {
    /// Token generation policy.
    pub tokens: TokenPolicy,

    /// Store and export locations.
    pub storage: StorageConfig,

    /// Listing presentation policy.
    pub display: DisplayConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RandtokenConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content. An empty document yields defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.token_length == 0 {
            return Err(ConfigError::Config(
                "tokens.token_length must be a positive integer".to_string(),
            ));
        }
        if self.tokens.token_count == 0 {
            return Err(ConfigError::Config(
                "tokens.token_count must be a positive integer".to_string(),
            ));
        }
        if self.display.summary_limit == 0 {
            return Err(ConfigError::Config(
                "display.summary_limit must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_is_default() {
        let config = RandtokenConfig::from_yaml("").unwrap();
        assert_eq!(config, RandtokenConfig::default());
    }

    #[test]
    fn test_parse_full_document() {
        let yaml = r#"
tokens:
  token_length: 8
  token_count: 3
  enable_special_chars: false
  enable_random_case: false
storage:
  data_dir: /tmp/randtoken
display:
  summary_limit: 5
"#;
        let config = RandtokenConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.tokens.token_length, 8);
        assert_eq!(config.tokens.token_count, 3);
        assert!(!config.tokens.enable_special_chars);
        assert!(!config.tokens.enable_random_case);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/randtoken"));
        assert_eq!(config.display.summary_limit, 5);
        assert_eq!(config.display.detail_budget, 2000);
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = RandtokenConfig::from_yaml("tokens:\n  token_length: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_zero_count_rejected() {
        let err = RandtokenConfig::from_yaml("tokens:\n  token_count: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_unknown_type_is_yaml_error() {
        let err = RandtokenConfig::from_yaml("tokens:\n  token_count: many\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = RandtokenConfig::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, RandtokenConfig::default());
    }

    #[test]
    fn test_load_or_default_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "tokens:\n  token_count: 4\n").unwrap();
        let config = RandtokenConfig::load_or_default(&path).unwrap();
        assert_eq!(config.tokens.token_count, 4);
    }
}
