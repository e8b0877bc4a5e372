//! Storage and display configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name of the persisted store inside the data directory.
pub const STORE_FILE_NAME: &str = "tokens.json";

/// Subdirectory of the data directory that receives export artifacts.
pub const EXPORTS_DIR_NAME: &str = "exports";

/// Where the record store and export artifacts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory holding `tokens.json` and the `exports/` subdirectory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Path of the persisted store file.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    /// Directory that receives export artifacts.
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join(EXPORTS_DIR_NAME)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Presentation policy for listings.
///
/// The full listing is rendered unless it would exceed `detail_budget`
/// characters, in which case only the first `summary_limit` entries are shown
/// as id and remark pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_detail_budget")]
    pub detail_budget: usize,

    #[serde(default = "default_summary_limit")]
    pub summary_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            detail_budget: default_detail_budget(),
            summary_limit: default_summary_limit(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_detail_budget() -> usize {
    2000
}

fn default_summary_limit() -> usize {
    10
}
