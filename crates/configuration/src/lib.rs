use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{
    Config, DataSettings, DataSource, LoggingSettings, PortfolioConfig, RiskSettings, WindowSettings,
};

/// Loads and validates the application configuration.
///
/// The TOML file at `path` is read first, then any `STRESSVAR__SECTION__KEY`
/// environment variable overrides the matching entry (e.g.
/// `STRESSVAR__RISK__WINDOW=30`).
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("STRESSVAR")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Loads and validates a configuration held in memory as TOML text.
pub fn load_config_from_str(contents: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(contents, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
