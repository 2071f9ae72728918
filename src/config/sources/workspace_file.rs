//! Workspace file source: `<workspace>/.filetree.toml`, optional.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};

pub const WORKSPACE_CONFIG_FILE: &str = ".filetree.toml";

pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(WORKSPACE_CONFIG_FILE)
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = workspace_config_path(workspace_root);
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(false)))
}
