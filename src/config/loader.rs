//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::secret::ApiSecret;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the provider API secret.
pub const ENV_API_SECRET: &str = "CASTLE_API_SECRET";
/// Environment variable holding the provider app id.
pub const ENV_APP_ID: &str = "CASTLE_APP_ID";
/// Environment variable overriding the origin URL.
pub const ENV_ORIGIN: &str = "RISK_GATE_ORIGIN";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply env overrides.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: GateConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build configuration from defaults plus environment only.
pub fn load_from_env() -> Result<GateConfig, ConfigError> {
    let mut config = GateConfig::default();

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment-provided values onto `config`.
///
/// `lookup` is injected so tests do not touch the process environment.
pub fn apply_env_overrides<F>(config: &mut GateConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret) = lookup(ENV_API_SECRET) {
        config.risk.api_secret = Some(ApiSecret::new(secret));
    }
    if let Some(app_id) = lookup(ENV_APP_ID) {
        config.risk.app_id = Some(app_id);
    }
    if let Some(origin) = lookup(ENV_ORIGIN) {
        config.origin.url = origin;
    }
}
