use config::{Config, Environment, File};
use herald::{EmitterConfig, HeraldError};
use serde::Deserialize;
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Errors raised while loading the demo settings.
#[herald_derive::herald_error]
pub enum DemoConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Emitter settings rejected{}: {source}", format_context(.context))]
    Emitter { source: HeraldError, context: Option<Cow<'static, str>> },
}

/// Settings of the demo binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Default level of the console log; `RUST_LOG` overrides it.
    pub log_level: String,
    /// Options shared by every emitter the scenarios create.
    pub emitter: EmitterConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { log_level: DEFAULT_LOG_LEVEL.to_owned(), emitter: EmitterConfig::default() }
    }
}

/// Loads the settings from an optional file, overlaid with `HERALD__`
/// environment variables (`HERALD__EMITTER__LABEL` maps to `emitter.label`).
///
/// # Errors
/// Returns [`DemoConfigError`] if the file is missing or malformed, or if the
/// emitter options fail validation.
pub fn load_config(path: Option<&Path>) -> Result<DemoConfig, DemoConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        debug!("Loading config from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(
            Environment::with_prefix("HERALD")
                .separator("__")
                .convert_case(config::Case::Snake)
                .try_parsing(true),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<DemoConfig>()
        .context("Failed to deserialize config")?;

    config.emitter.validate().context("emitter")?;
    Ok(config)
}
