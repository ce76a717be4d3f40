//! Integration tests module for spag
//!
//! Shared helpers for building an on-disk workspace in a temporary directory.

pub mod end_to_end_test;
pub mod request_chaining_test;

use spag::commands::Workspace;
use spag::config::SpagConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A workspace whose spag directory and request directory live in `dir`.
pub fn workspace(dir: &TempDir) -> Workspace {
    let config = SpagConfig {
        spag_dir: dir.path().join(".spag"),
        request_dirs: vec![dir.path().join("requests")],
        ..Default::default()
    };
    Workspace::new(config)
}

/// Writes `content` to `dir/rel`, creating parent directories.
pub fn write_file(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create test directory");
    }
    fs::write(&path, content).expect("Failed to write test file");
    path
}
