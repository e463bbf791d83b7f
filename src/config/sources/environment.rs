//! Environment overlay: `CIDNAV__STORAGE__IS_MODAL=true` sets `storage.is_modal`

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment};

/// Prefix of config keys taken from the environment
pub const ENV_PREFIX: &str = "CIDNAV";

/// Separator between the prefix and each nested key
pub const ENV_SEPARATOR: &str = "__";

pub fn source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(source()))
}
