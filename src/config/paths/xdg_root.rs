//! XDG Base Directory utilities for workspace data management.

use crate::error::ApiError;
use std::path::{Path, PathBuf};

/// Get XDG data home directory
///
/// Returns `$XDG_DATA_HOME` if set, otherwise defaults to `$HOME/.local/share`
pub fn data_home() -> Option<PathBuf> {
    if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        if !xdg_data_home.is_empty() {
            return Some(PathBuf::from(xdg_data_home));
        }
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local").join("share"))
}

/// Get the data directory for a specific workspace
///
/// Returns `$XDG_DATA_HOME/filetree/<workspace_path>/`. The canonical workspace path
/// is mirrored as a directory structure, so `/home/user/proj` becomes
/// `$XDG_DATA_HOME/filetree/home/user/proj/`.
pub fn workspace_data_dir(workspace_root: &Path) -> Result<PathBuf, ApiError> {
    let data_home = data_home().ok_or_else(|| {
        ApiError::ConfigError(
            "Could not determine XDG data home directory (HOME not set)".to_string(),
        )
    })?;

    let canonical = dunce::canonicalize(workspace_root).map_err(|e| {
        ApiError::ConfigError(format!("Failed to canonicalize workspace path: {}", e))
    })?;

    let mut data_dir = data_home.join("filetree");
    for component in canonical.components() {
        if let std::path::Component::Normal(name) = component {
            data_dir = data_dir.join(name);
        }
    }

    Ok(data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_data_dir_mirrors_workspace_path() {
        let temp = tempfile::tempdir().unwrap();
        let dir = workspace_data_dir(temp.path()).unwrap();
        let last = temp.path().file_name().unwrap();
        assert!(dir.ends_with(last));
        assert!(dir.to_string_lossy().contains("filetree"));
    }
}
