//! StoreConfig and resolve_path for the workspace snapshot store.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Snapshot store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the sled store, relative to the workspace root.
    /// None means the per-workspace XDG data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolve the store path to an actual filesystem location.
    pub fn resolve_path(&self, workspace_root: &Path) -> Result<PathBuf, ApiError> {
        match &self.path {
            Some(path) if path.is_absolute() => Ok(path.clone()),
            Some(path) => Ok(workspace_root.join(path)),
            None => Ok(xdg::workspace_data_dir(workspace_root)?.join("store")),
        }
    }
}
