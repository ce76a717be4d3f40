//! Lookup of request and exchange files by short name.
//!
//! A [`PathIndex`] maps every bare filename found under a set of directory
//! trees to the absolute paths carrying that name. Given a tree like:
//!
//! ```text
//! myrequests/
//!     v1/
//!         create_thing.yml
//!     v2/
//!         create_thing.yml
//!     list_things.yml
//! ```
//!
//! `list_things` resolves directly, while `create_thing` is ambiguous and must
//! be qualified as `v1/create_thing` or `v2/create_thing`. The index never
//! silently picks one of several candidates.

pub mod error;

pub use error::FileError;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::document::Document;

/// Default extension for request, environment and exchange files.
pub const DEFAULT_EXTENSION: &str = ".yml";

/// Index from bare filename to the set of absolute paths with that name.
#[derive(Debug, Clone)]
pub struct PathIndex {
    extension: String,
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<String, BTreeSet<PathBuf>>,
}

impl PathIndex {
    /// Creates an empty index recognizing files that end with `extension`.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            dirs: BTreeSet::new(),
            files: BTreeMap::new(),
        }
    }

    /// Creates an index over all of `dirs`.
    ///
    /// # Errors
    ///
    /// Returns `FileError::DirectoryNotFound` if any directory is missing.
    pub fn with_dirs<I, P>(extension: impl Into<String>, dirs: I) -> Result<Self, FileError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut index = Self::new(extension);
        for dir in dirs {
            index.add_dir(dir)?;
        }
        Ok(index)
    }

    /// The extension this index recognizes.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns true if `name` carries the recognized extension.
    pub fn has_valid_extension(&self, name: &str) -> bool {
        name.ends_with(&self.extension)
    }

    /// Walks `dir` and indexes every file with the recognized extension.
    ///
    /// Adding the same directory twice (by absolute path) is a no-op.
    pub fn add_dir(&mut self, dir: impl AsRef<Path>) -> Result<(), FileError> {
        let absdir = absolute(dir.as_ref())?;
        if !absdir.is_dir() {
            return Err(FileError::DirectoryNotFound(absdir));
        }
        if !self.dirs.insert(absdir.clone()) {
            return Ok(());
        }

        let mut indexed = 0usize;
        for entry in WalkDir::new(&absdir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(filename) = entry.file_name().to_str() else {
                continue;
            };
            if !self.has_valid_extension(filename) {
                continue;
            }
            self.files
                .entry(filename.to_string())
                .or_default()
                .insert(entry.path().to_path_buf());
            indexed += 1;
        }

        debug!(dir = %absdir.display(), files = indexed, "indexed directory");
        Ok(())
    }

    /// Appends the extension to `key` unless it already has it, after
    /// stripping leading and trailing slashes.
    pub fn normalize_key(&self, key: &str) -> String {
        let key = key.trim_matches('/');
        if self.has_valid_extension(key) {
            key.to_string()
        } else {
            format!("{}{}", key, self.extension)
        }
    }

    /// Resolves a possibly-qualified key to exactly one indexed path.
    ///
    /// # Examples
    ///
    /// With `req.yml` present under both `v1/` and `v2/`:
    ///
    /// - `get_path("v1/req")` returns `.../v1/req.yml`
    /// - `get_path("req")` fails with `FileError::Ambiguous`
    pub fn get_path(&self, key: &str) -> Result<PathBuf, FileError> {
        let key = self.normalize_key(key);
        let key_parts = split_path(Path::new(&key));

        let Some(filename) = key_parts.last() else {
            return Err(FileError::InvalidName(key));
        };

        let paths = self
            .files
            .get(filename)
            .filter(|paths| !paths.is_empty())
            .ok_or_else(|| FileError::NoMatch(filename.clone()))?;

        if paths.len() == 1 {
            if let Some(path) = paths.iter().next() {
                return Ok(path.clone());
            }
        }

        // if key = 'a/b/c.yml', keep the paths ending with 'a/b/c.yml'
        let matches: Vec<PathBuf> = paths
            .iter()
            .filter(|path| {
                let parts = split_path(path);
                parts.len() >= key_parts.len()
                    && parts[parts.len() - key_parts.len()..] == key_parts[..]
            })
            .cloned()
            .collect();

        match matches.len() {
            0 => Err(FileError::InvalidName(key)),
            1 => Ok(matches.into_iter().next().unwrap_or_default()),
            _ => Err(FileError::Ambiguous {
                name: key,
                matches,
            }),
        }
    }

    /// Every indexed path, relative to the current directory, sorted.
    pub fn get_file_list(&self) -> Vec<String> {
        let cwd = std::env::current_dir().unwrap_or_default();
        self.file_list_relative_to(&cwd)
    }

    /// Every indexed path relative to `base` (or absolute when outside it), sorted.
    pub fn file_list_relative_to(&self, base: &Path) -> Vec<String> {
        let mut list: Vec<String> = self
            .files
            .values()
            .flatten()
            .map(|path| {
                path.strip_prefix(base)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        list.sort();
        list
    }

    /// Number of distinct indexed files.
    pub fn len(&self) -> usize {
        self.files.values().map(BTreeSet::len).sum()
    }

    /// True when nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normal components of a path: `a/b/c.yml` -> `["a", "b", "c.yml"]`.
pub fn split_path(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Appends `extension` to `name` unless already present.
pub fn ensure_extension(name: &str, extension: &str) -> String {
    if name.ends_with(extension) {
        name.to_string()
    } else {
        format!("{}{}", name, extension)
    }
}

/// Absolute form of `path` with `.` and `..` folded away lexically.
///
/// Symlinks are not resolved, so `a/link/..` becomes `a`.
pub fn absolute(path: &Path) -> Result<PathBuf, FileError> {
    let path = std::path::absolute(path).map_err(|e| FileError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(normalize(&path))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // never pops past the root
                if !matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                ) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Reads a file into a string.
pub fn read_file(path: &Path) -> Result<String, FileError> {
    fs::read_to_string(path).map_err(|e| FileError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Writes `contents`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> Result<(), FileError> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, contents).map_err(|e| FileError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Creates `dir` and its parents if missing.
pub fn ensure_dir_exists(dir: &Path) -> Result<(), FileError> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| FileError::Io {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Loads a YAML file as a [`Document`].
pub fn load_yaml_file(path: &Path) -> Result<Document, FileError> {
    let text = read_file(path)?;
    Document::from_yaml_str(&text).map_err(|e| FileError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })
}
