//! Named recorded exchanges.
//!
//! Every recorded exchange is saved as `last` and, optionally, under a name
//! of the user's choosing. Qualified names such as `things/create` are stored
//! in subdirectories and looked up with the same short-name rules as request
//! files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::models::{HistoryError, RecordedExchange};
use crate::document::Document;
use crate::files::{self, FileError, PathIndex};

/// Name under which the most recent exchange is always stored.
pub const LAST_EXCHANGE: &str = "last";

/// Read access to recorded exchanges.
pub trait RecordedExchangeStore {
    /// Loads the exchange stored as `name` as a walkable document.
    fn load_exchange(&self, name: &str) -> Result<Document, HistoryError>;
}

/// Recorded exchanges stored as YAML files under one directory.
#[derive(Debug, Clone)]
pub struct RememberStore {
    root: PathBuf,
    extension: String,
}

impl RememberStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves `exchange` under `name` and as `last`.
    ///
    /// For `a/b/c` the file lands in `<root>/a/b/c.yml`, not `<root>/c.yml`.
    ///
    /// # Returns
    ///
    /// The path of the named file.
    pub fn remember(
        &self,
        name: &str,
        exchange: &RecordedExchange,
    ) -> Result<PathBuf, HistoryError> {
        if name != LAST_EXCHANGE {
            self.remember(LAST_EXCHANGE, exchange)?;
        }

        let parts = files::split_path(Path::new(name));
        let Some((filename, dirs)) = parts.split_last() else {
            return Err(HistoryError::File(FileError::InvalidName(name.to_string())));
        };

        let mut path = self.root.clone();
        path.extend(dirs);
        path.push(files::ensure_extension(filename, &self.extension));

        files::write_file(&path, &exchange.to_yaml_string()?)?;
        debug!(path = %path.display(), "remembered exchange");
        Ok(path)
    }
}

impl RecordedExchangeStore for RememberStore {
    fn load_exchange(&self, name: &str) -> Result<Document, HistoryError> {
        if !self.root.is_dir() {
            return Err(HistoryError::NotFound(name.to_string()));
        }

        // rebuilt on every lookup so freshly remembered files are visible
        let index = PathIndex::with_dirs(self.extension.clone(), [&self.root])?;
        let path = index.get_path(name).map_err(|e| match e {
            FileError::NoMatch(_) | FileError::InvalidName(_) => {
                HistoryError::NotFound(name.to_string())
            }
            other => HistoryError::File(other),
        })?;

        debug!(path = %path.display(), "loading recorded exchange");
        Ok(files::load_yaml_file(&path)?)
    }
}

/// In-memory recorded exchanges.
#[derive(Debug, Clone, Default)]
pub struct MemoryExchanges {
    exchanges: HashMap<String, Document>,
}

impl MemoryExchanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw document under `name`.
    pub fn insert(&mut self, name: impl Into<String>, doc: Document) {
        self.exchanges.insert(name.into(), doc);
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, doc: Document) -> Self {
        self.insert(name, doc);
        self
    }

    /// Stores an exchange under `name` and as `last`.
    pub fn remember(
        &mut self,
        name: &str,
        exchange: &RecordedExchange,
    ) -> Result<(), HistoryError> {
        let doc = exchange.to_document()?;
        self.insert(LAST_EXCHANGE, doc.clone());
        self.insert(name, doc);
        Ok(())
    }
}

impl RecordedExchangeStore for MemoryExchanges {
    fn load_exchange(&self, name: &str) -> Result<Document, HistoryError> {
        self.exchanges
            .get(name)
            .cloned()
            .ok_or_else(|| HistoryError::NotFound(name.to_string()))
    }
}
