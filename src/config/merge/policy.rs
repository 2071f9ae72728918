//! Built-in defaults every config build starts from.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("history.capacity", 100_i64)?
        .set_default("tree.new_file_content", "")?
        .set_default("logging.level", "info")
}
