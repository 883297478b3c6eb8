use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisConfig, Config, LoggingConfig, ProviderConfig, ServerConfig, SEASON_PLACEHOLDER,
};

/// The file looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "gridiron";

/// Prefix for environment overrides, e.g. `GRIDIRON__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "GRIDIRON";

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file (`gridiron.toml`
/// in the working directory unless `path` is given; optional in that case),
/// then `GRIDIRON__*` environment variables. The result is validated before
/// it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder().add_source(file).add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = from_builder(builder)?;
    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
