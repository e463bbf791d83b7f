//! Defaults every configuration build starts from.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Builder seeded with the keys other layers most often override.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("storage.transport_endpoint", "https://ipfs.io")?
        .set_default("storage.upload_multiple", true)?
        .set_default("logging.level", "warn")?
        .set_default("logging.output", "stderr")
}
