use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, LevelSettings, TechnicalSettings, ValuationAssumptions, ValuationPolicy,
};

/// Prefix for environment overrides, e.g. `LODESTAR__ASSUMPTIONS__BETA=1.3`.
pub const ENV_PREFIX: &str = "LODESTAR";

/// Loads the application configuration from a TOML file.
///
/// This function is the primary entry point for this crate. It reads the file (which
/// may be absent, leaving every setting at its default), applies `LODESTAR__*`
/// environment overrides, deserializes into our strongly-typed `Config` struct and
/// validates it.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), ?config, "Loaded configuration");
    Ok(config)
}
