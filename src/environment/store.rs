//! File-backed environment store.
//!
//! Layout under the environments root (by default `.spag/environments/`):
//!
//! ```text
//! .spag/environments/
//!     active          <- name of the active environment
//!     default.yml
//!     dev.yml
//!     staging/eu.yml  <- qualified names work like request names
//! ```
//!
//! When no `active` file exists the `default` environment is active, and a
//! missing `default.yml` reads as an empty environment. Reads never create
//! files; only the editing operations write.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{EnvError, EnvironmentProvider, DEFAULT_ENV_NAME};
use crate::document::{split_dotted, Document, PathError};
use crate::files::{self, FileError, PathIndex};

/// File holding the active environment's name.
const ACTIVE_FILE: &str = "active";

/// Environment names may be qualified with `/`, like request names.
static ENV_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_\-]+(/[A-Za-z0-9_\-]+)*(\.[A-Za-z0-9]+)?$")
        .expect("Failed to compile environment name regex")
});

/// Environments stored as YAML files in one directory tree.
#[derive(Debug, Clone)]
pub struct EnvironmentStore {
    root: PathBuf,
    extension: String,
}

impl EnvironmentStore {
    /// Creates a store rooted at `root` for files ending in `extension`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// The directory holding the environment files
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn active_file(&self) -> PathBuf {
        self.root.join(ACTIVE_FILE)
    }

    fn validate_name(name: &str) -> Result<(), EnvError> {
        if ENV_NAME_REGEX.is_match(name) {
            Ok(())
        } else {
            Err(EnvError::InvalidName(name.to_string()))
        }
    }

    /// Name of the active environment, `default` when none was activated.
    pub fn active_name(&self) -> Result<String, EnvError> {
        let active = self.active_file();
        if !active.is_file() {
            return Ok(DEFAULT_ENV_NAME.to_string());
        }
        let name = files::read_file(&active)?;
        let name = name.trim();
        if name.is_empty() {
            Ok(DEFAULT_ENV_NAME.to_string())
        } else {
            Ok(name.to_string())
        }
    }

    /// Resolves an environment name to its file.
    fn find_path(&self, name: &str) -> Result<PathBuf, EnvError> {
        if !self.root.is_dir() {
            return Err(EnvError::NotFound(name.to_string()));
        }
        let index = PathIndex::with_dirs(self.extension.clone(), [&self.root])?;
        index.get_path(name).map_err(|e| match e {
            FileError::NoMatch(_) | FileError::InvalidName(_) => {
                EnvError::NotFound(name.to_string())
            }
            other => EnvError::File(other),
        })
    }

    /// Path to write `name` to: the existing file, or a new one under the root.
    fn target_path(&self, name: &str) -> Result<PathBuf, EnvError> {
        match self.find_path(name) {
            Ok(path) => Ok(path),
            Err(EnvError::NotFound(_)) => {
                Ok(self.root.join(files::ensure_extension(name, &self.extension)))
            }
            Err(e) => Err(e),
        }
    }

    /// Loads the environment called `name`.
    pub fn load(&self, name: &str) -> Result<Document, EnvError> {
        let path = match self.find_path(name) {
            Ok(path) => path,
            Err(EnvError::NotFound(_)) if name == DEFAULT_ENV_NAME => {
                debug!("default environment missing, using an empty one");
                return Ok(Document::mapping());
            }
            Err(e) => return Err(e),
        };

        debug!(path = %path.display(), "loading environment");
        match files::load_yaml_file(&path)? {
            doc @ Document::Mapping(_) => Ok(doc),
            Document::Scalar(crate::document::Scalar::Null) => Ok(Document::mapping()),
            other => Err(EnvError::InvalidFormat(format!(
                "environment '{}' must be a mapping, found a {}",
                name,
                other.kind()
            ))),
        }
    }

    /// Loads the active environment.
    pub fn load_active(&self) -> Result<Document, EnvError> {
        let name = self.active_name()?;
        self.load(&name)
    }

    /// Makes `name` the active environment. The environment must exist,
    /// except for `default` which is created empty on demand.
    pub fn activate(&self, name: &str) -> Result<(), EnvError> {
        Self::validate_name(name)?;
        match self.find_path(name) {
            Ok(_) => {}
            Err(EnvError::NotFound(_)) if name == DEFAULT_ENV_NAME => {
                self.write(name, &Document::mapping())?;
            }
            Err(e) => return Err(e),
        }
        files::write_file(&self.active_file(), name)?;
        Ok(())
    }

    /// Reverts to the `default` environment.
    pub fn deactivate(&self) -> Result<(), EnvError> {
        let active = self.active_file();
        if active.exists() {
            fs::remove_file(&active).map_err(|e| FileError::Io {
                path: active.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Names of every stored environment, sorted.
    pub fn list(&self) -> Result<Vec<String>, EnvError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let index = PathIndex::with_dirs(self.extension.clone(), [&self.root])?;
        let root = files::absolute(&self.root)?;
        Ok(index
            .file_list_relative_to(&root)
            .into_iter()
            .map(|name| {
                name.strip_suffix(self.extension.as_str())
                    .map(str::to_string)
                    .unwrap_or(name)
            })
            .collect())
    }

    /// Sets dotted keys in the active environment and returns the result.
    ///
    /// `("a.b.c", "efg")` sets `env["a"]["b"]["c"] = "efg"`, creating the
    /// intermediate mappings.
    pub fn set(&self, pairs: &[(String, Document)]) -> Result<Document, EnvError> {
        let name = self.active_name()?;
        let mut env = self.load(&name)?;
        for (key, value) in pairs {
            let keys = split_dotted(key);
            env.set_path(&keys, value.clone())?;
        }
        self.write(&name, &env)?;
        Ok(env)
    }

    /// Removes a dotted key from the active environment.
    pub fn unset(&self, key: &str) -> Result<Document, EnvError> {
        let name = self.active_name()?;
        let mut env = self.load(&name)?;
        let keys = split_dotted(key);
        env.remove_path(&keys).map_err(|e| match e {
            PathError::NotFound { .. } | PathError::EmptyPath => {
                EnvError::KeyNotFound(key.to_string())
            }
            other => EnvError::Path(other),
        })?;
        self.write(&name, &env)?;
        Ok(env)
    }

    /// Empties the active environment.
    pub fn unset_all(&self) -> Result<Document, EnvError> {
        let name = self.active_name()?;
        let env = Document::mapping();
        self.write(&name, &env)?;
        Ok(env)
    }

    /// Writes an environment document, creating the file if needed.
    pub fn write(&self, name: &str, env: &Document) -> Result<(), EnvError> {
        Self::validate_name(name)?;
        let path = self.target_path(name)?;
        let text = env.to_yaml_string().map_err(|e| FileError::Yaml {
            path: path.clone(),
            source: e,
        })?;
        files::write_file(&path, &text)?;
        Ok(())
    }
}

impl EnvironmentProvider for EnvironmentStore {
    fn load_environment(&self, name: Option<&str>) -> Result<Document, EnvError> {
        match name {
            Some(name) => self.load(name),
            None => self.load_active(),
        }
    }
}
