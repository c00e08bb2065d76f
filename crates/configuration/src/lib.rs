use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use cli::AnalysisOverrides;
pub use error::ConfigError;
pub use settings::{AnalysisSettings, DataSources, Settings};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix of the environment variables that override file values,
/// e.g. `SENTIMENT__ANALYSIS__TOP_N=3`.
pub const ENV_PREFIX: &str = "SENTIMENT";

/// Loads the dashboard settings.
///
/// Values come from the built-in defaults, then the TOML file, then the
/// environment. An explicitly given `path` must exist; the default
/// `config.toml` is optional.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(?settings, "Loaded configuration.");
    Ok(settings)
}
