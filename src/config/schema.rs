//! Configuration schema for spag.
//!
//! This module defines the configuration structure and validation logic for
//! the settings read from `.spag/config.yml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::files::DEFAULT_EXTENSION;
use crate::history::DEFAULT_MAX_HISTORY_ENTRIES;
use crate::variables::BodyMode;

/// Main configuration structure for spag.
///
/// Every field is optional in the file; missing settings fall back to the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpagConfig {
    /// Directory holding environments, remembered exchanges and history.
    ///
    /// Defaults to `.spag` in the working directory.
    #[serde(default = "default_spag_dir")]
    pub spag_dir: PathBuf,

    /// Directories searched for request files.
    ///
    /// When empty, the active environment's `dir` is used, then `.`.
    #[serde(default)]
    pub request_dirs: Vec<PathBuf>,

    /// Extension of request, environment and exchange files. Defaults to `.yml`.
    ///
    /// Must start with a `.`.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Maximum number of requests to keep in history.
    ///
    /// Defaults to 1000. Must be > 0.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Whether `@` shortcuts are expanded in `--data`, `-H` and `render` text.
    #[serde(default = "default_shortcuts")]
    pub shortcuts: bool,

    /// Whether recorded response bodies are decoded as JSON for lookups.
    #[serde(default)]
    pub body_mode: BodyMode,
}

impl Default for SpagConfig {
    fn default() -> Self {
        Self {
            spag_dir: default_spag_dir(),
            request_dirs: Vec::new(),
            extension: default_extension(),
            history_limit: default_history_limit(),
            shortcuts: default_shortcuts(),
            body_mode: BodyMode::default(),
        }
    }
}

impl SpagConfig {
    /// Validates the configuration and returns errors if any settings are invalid.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.history_limit == 0 {
            return Err("historyLimit must be greater than 0".to_string());
        }

        if self.extension.len() < 2 || !self.extension.starts_with('.') {
            return Err(format!(
                "extension must start with '.' and name a suffix, got '{}'",
                self.extension
            ));
        }

        Ok(())
    }

    /// Merges this configuration with another, using values from `other` where present.
    ///
    /// # Arguments
    ///
    /// * `other` - Configuration to merge with (takes precedence)
    pub fn merge(&self, other: &SpagConfig) -> Self {
        Self {
            spag_dir: other.spag_dir.clone(),
            request_dirs: if other.request_dirs.is_empty() {
                self.request_dirs.clone()
            } else {
                other.request_dirs.clone()
            },
            extension: other.extension.clone(),
            history_limit: other.history_limit,
            shortcuts: other.shortcuts,
            body_mode: other.body_mode,
        }
    }

    /// `<spagDir>/config.yml`
    pub fn config_file(&self) -> PathBuf {
        self.spag_dir.join("config.yml")
    }

    /// `<spagDir>/environments`
    pub fn environments_dir(&self) -> PathBuf {
        self.spag_dir.join("environments")
    }

    /// `<spagDir>/remembers`
    pub fn remembers_dir(&self) -> PathBuf {
        self.spag_dir.join("remembers")
    }

    /// `<spagDir>/history.yml`
    pub fn history_file(&self) -> PathBuf {
        self.spag_dir.join("history.yml")
    }
}

// Default value functions for serde

fn default_spag_dir() -> PathBuf {
    PathBuf::from(".spag")
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_MAX_HISTORY_ENTRIES
}

fn default_shortcuts() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpagConfig::default();
        assert_eq!(config.spag_dir, PathBuf::from(".spag"));
        assert!(config.request_dirs.is_empty());
        assert_eq!(config.extension, ".yml");
        assert_eq!(config.history_limit, 1000);
        assert!(config.shortcuts);
        assert_eq!(config.body_mode, BodyMode::Structured);
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(SpagConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_history_limit() {
        let config = SpagConfig {
            history_limit: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            "historyLimit must be greater than 0"
        );
    }

    #[test]
    fn test_config_validation_bad_extension() {
        for ext in ["", ".", "yml"] {
            let config = SpagConfig {
                extension: ext.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{:?} should be rejected", ext);
        }
    }

    #[test]
    fn test_derived_paths() {
        let config = SpagConfig {
            spag_dir: PathBuf::from("/work/.spag"),
            ..Default::default()
        };
        assert_eq!(config.config_file(), PathBuf::from("/work/.spag/config.yml"));
        assert_eq!(config.environments_dir(), PathBuf::from("/work/.spag/environments"));
        assert_eq!(config.remembers_dir(), PathBuf::from("/work/.spag/remembers"));
        assert_eq!(config.history_file(), PathBuf::from("/work/.spag/history.yml"));
    }

    #[test]
    fn test_merge_keeps_base_request_dirs_when_unset() {
        let base = SpagConfig {
            request_dirs: vec![PathBuf::from("requests")],
            ..Default::default()
        };
        let custom = SpagConfig {
            history_limit: 50,
            ..Default::default()
        };

        let merged = base.merge(&custom);
        assert_eq!(merged.history_limit, 50);
        assert_eq!(merged.request_dirs, vec![PathBuf::from("requests")]);
    }

    #[test]
    fn test_deserialization_with_defaults() {
        let config: SpagConfig = serde_yaml::from_str(
            "historyLimit: 10\nbodyMode: raw\nrequestDirs: [api, more]\n",
        )
        .unwrap();
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.body_mode, BodyMode::Raw);
        assert_eq!(config.request_dirs.len(), 2);
        assert_eq!(config.extension, ".yml");
        assert!(config.shortcuts);
    }
}
