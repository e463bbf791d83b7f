//! Global config file source: `$XDG_CONFIG_HOME/cidnav/config.toml`

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use tracing::debug;

/// Add the global config file when it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Ok(config_home) = xdg::config_home() else {
        return Ok(builder);
    };
    let path = config_home.join("cidnav").join("config.toml");
    if !path.exists() {
        return Ok(builder);
    }
    debug!(file = %path.display(), "Layering global config");
    Ok(builder.add_source(File::from(path).required(false)))
}
