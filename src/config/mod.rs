//! Configuration
//!
//! Layered configuration built with the `config` crate. Precedence (lowest to highest):
//! built-in defaults, workspace `.filetree.toml`, explicit file, `FILETREE__*` environment.

mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod workspace;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use workspace::storage_paths::StoreConfig;

use crate::logging::LoggingConfig;
use crate::store::history::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiletreeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub tree: TreeConfig,
}

/// Command history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

/// Tree behaviour settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Initial content of files created from the tree
    #[serde(default)]
    pub new_file_content: String,
}
