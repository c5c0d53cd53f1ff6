//! Configuration loading from disk and environment.
//!
//! The configuration is read exactly once at startup: an optional TOML file,
//! then environment overrides, then semantic validation. After that the value
//! is immutable and shared via `Arc`.

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{BasicAuthConfig, MirrorConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file plus environment overrides.
pub fn load_config(path: &Path) -> Result<MirrorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: MirrorConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults and environment overrides only.
///
/// Used when no config file is given; the origin must then be supplied via
/// `ASSET_MIRROR_ORIGIN`.
pub fn load_from_env() -> Result<MirrorConfig, ConfigError> {
    let mut config = MirrorConfig::default();

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `ASSET_MIRROR_*` environment overrides on top of a config value.
fn apply_env_overrides(config: &mut MirrorConfig) {
    if let Ok(origin) = env::var("ASSET_MIRROR_ORIGIN") {
        config.origin.base_url = origin;
    }
    if let Ok(cdn) = env::var("ASSET_MIRROR_CDN") {
        config.origin.cdn_url = Some(cdn);
    }
    if let (Ok(username), Ok(password)) = (
        env::var("ASSET_MIRROR_USERNAME"),
        env::var("ASSET_MIRROR_PASSWORD"),
    ) {
        config.origin.basic_auth = Some(BasicAuthConfig { username, password });
    }
    if let Ok(verbose) = env::var("ASSET_MIRROR_VERBOSE") {
        config.observability.verbose = matches!(verbose.as_str(), "1" | "true" | "yes");
    }
}
