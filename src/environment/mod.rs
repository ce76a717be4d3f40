//! Environment management for spag
//!
//! Environments are named YAML documents (dev, staging, production, ...) holding
//! an `endpoint`, default `headers`, a request `dir` and any other values that
//! templates may reference as `{{[dev].some.key}}` or `{{[].some.key}}` for the
//! active environment.
//!
//! The template engine only ever reads environments through the
//! [`EnvironmentProvider`] trait. [`EnvironmentStore`] is the file-backed
//! implementation used by the CLI; [`MemoryEnvironments`] serves tests and
//! benchmarks.
//!
//! # Example
//!
//! ```no_run
//! use spag::environment::{EnvironmentProvider, EnvironmentStore};
//!
//! let store = EnvironmentStore::new(".spag/environments", ".yml");
//! store.activate("dev").unwrap();
//!
//! let env = store.load_environment(None).unwrap();
//! if let Ok(endpoint) = env.lookup("endpoint") {
//!     println!("Endpoint: {:?}", endpoint.as_str());
//! }
//! ```

pub mod store;

use std::collections::HashMap;
use thiserror::Error;

use crate::document::{Document, PathError};
use crate::files::FileError;

pub use store::EnvironmentStore;

/// Name of the environment used when none has been activated.
pub const DEFAULT_ENV_NAME: &str = "default";

/// Errors that can occur while reading or editing environments
#[derive(Debug, Error)]
pub enum EnvError {
    /// No environment with this name exists
    #[error("Environment '{0}' not found")]
    NotFound(String),

    /// The environment name is not usable as a file name
    #[error("Invalid environment name: '{0}'. Names must be alphanumeric with underscores/hyphens")]
    InvalidName(String),

    /// A key to unset or read was not present
    #[error("Could not find '{0}' in the environment")]
    KeyNotFound(String),

    /// The environment file is not a mapping at its root
    #[error("Invalid environment format: {0}")]
    InvalidFormat(String),

    /// A key path could not be applied to the document
    #[error("Invalid key path: {0}")]
    Path(#[from] PathError),

    /// Reading or writing the environment files failed
    #[error(transparent)]
    File(#[from] FileError),
}

/// Read access to environment documents.
pub trait EnvironmentProvider {
    /// Loads the environment called `name`, or the active one when `None`.
    fn load_environment(&self, name: Option<&str>) -> Result<Document, EnvError>;
}

/// In-memory environments with an optional active name.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnvironments {
    environments: HashMap<String, Document>,
    active: Option<String>,
}

impl MemoryEnvironments {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an environment
    pub fn insert(&mut self, name: impl Into<String>, env: Document) {
        self.environments.insert(name.into(), env);
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, env: Document) -> Self {
        self.insert(name, env);
        self
    }

    /// Sets the active environment. Returns false if it does not exist.
    pub fn set_active(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.environments.contains_key(&name) {
            self.active = Some(name);
            true
        } else {
            false
        }
    }
}

impl EnvironmentProvider for MemoryEnvironments {
    fn load_environment(&self, name: Option<&str>) -> Result<Document, EnvError> {
        let name = match name {
            Some(name) => name,
            None => self.active.as_deref().unwrap_or(DEFAULT_ENV_NAME),
        };
        self.environments
            .get(name)
            .cloned()
            .ok_or_else(|| EnvError::NotFound(name.to_string()))
    }
}
