//! Error types for file lookup and loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while indexing, resolving, or reading files.
#[derive(Debug, Error)]
pub enum FileError {
    /// An indexed root directory does not exist.
    #[error("Requests directory {} not found", .0.display())]
    DirectoryNotFound(PathBuf),

    /// No indexed file carries this bare filename.
    #[error("No files matching '{0}'")]
    NoMatch(String),

    /// The bare filename exists, but no path ends with the qualified key.
    #[error("Invalid request name {0}")]
    InvalidName(String),

    /// More than one indexed path matches the key.
    #[error("Ambiguous request name '{name}'. Pick from {}", format_matches(.matches))]
    Ambiguous {
        /// The normalized key that was looked up
        name: String,
        /// Every path that matched
        matches: Vec<PathBuf>,
    },

    /// Reading or writing a file failed.
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        /// The file involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file was not valid YAML.
    #[error("Failed to load yaml file {}: {source}", path.display())]
    Yaml {
        /// The file involved
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_yaml::Error,
    },
}

fn format_matches(matches: &[PathBuf]) -> String {
    let names: Vec<String> = matches.iter().map(|p| p.display().to_string()).collect();
    format!("[{}]", names.join(", "))
}

impl FileError {
    /// True for errors that must never be swallowed by candidate fallback.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, FileError::Ambiguous { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message_lists_every_match() {
        let err = FileError::Ambiguous {
            name: "req.yml".to_string(),
            matches: vec![PathBuf::from("/a/v1/req.yml"), PathBuf::from("/a/v2/req.yml")],
        };
        let msg = err.to_string();
        assert!(msg.contains("/a/v1/req.yml"));
        assert!(msg.contains("/a/v2/req.yml"));
        assert!(err.is_ambiguous());
    }

    #[test]
    fn test_no_match_message() {
        let err = FileError::NoMatch("thing.yml".to_string());
        assert_eq!(err.to_string(), "No files matching 'thing.yml'");
        assert!(!err.is_ambiguous());
    }
}
