//! Configuration management for spag.
//!
//! Configuration is read from `<spagDir>/config.yml` and merged with
//! defaults. The loaded [`SpagConfig`] is handed to the command layer; library
//! code takes the values it needs as parameters.

pub mod schema;

pub use schema::SpagConfig;

use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::files;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Loads configuration for the spag directory `spag_dir`.
///
/// Reads `<spag_dir>/config.yml` if it exists, merges it over the defaults
/// and validates the result. An unreadable or unparsable file is logged and
/// ignored. The `spagDir` of the result is always `spag_dir`, since a config
/// file cannot relocate itself.
///
/// # Arguments
///
/// * `spag_dir` - The spag directory, `.spag` when `None`
///
/// # Example
///
/// ```no_run
/// use spag::config::load_config;
///
/// let config = load_config(None).unwrap();
/// println!("History limit: {}", config.history_limit);
/// ```
pub fn load_config(spag_dir: Option<PathBuf>) -> Result<SpagConfig, ConfigError> {
    let mut config = SpagConfig::default();
    if let Some(dir) = spag_dir {
        config.spag_dir = dir;
    }

    let path = config.config_file();
    if path.is_file() {
        match files::read_file(&path).map(|text| serde_yaml::from_str::<SpagConfig>(&text)) {
            Ok(Ok(user_config)) => {
                debug!(path = %path.display(), "loaded config");
                let spag_dir = config.spag_dir.clone();
                config = config.merge(&user_config);
                config.spag_dir = spag_dir;
            }
            Ok(Err(e)) => {
                warn!(path = %path.display(), error = %e, "failed to parse config, using defaults")
            }
            Err(e) => warn!(error = %e, "failed to read config, using defaults"),
        }
    }

    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}
