//! Environment variable source: NOTES_TREE_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "NOTES_TREE";

/// Add environment variable overlay to builder.
/// Uses NOTES_TREE prefix and __ as separator for nested keys,
/// e.g. `NOTES_TREE__STORAGE__MODE=internal`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
