//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::SiteConfig;
use crate::config::validation::{validate_config, validate_vhost_config, ValidationError};
use crate::error::ConfigError;

/// Load and validate the main configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    load_with(path, validate_config)
}

/// Load and validate a virtual host configuration from a TOML file.
pub fn load_vhost_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    load_with(path, validate_vhost_config)
}

fn load_with(
    path: &Path,
    validate: fn(&SiteConfig) -> Result<(), Vec<ValidationError>>,
) -> Result<SiteConfig, ConfigError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    let config: SiteConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: display.clone(),
        source,
    })?;

    validate(&config).map_err(|errors| ConfigError::Validation {
        path: display,
        errors,
    })?;

    Ok(config)
}
