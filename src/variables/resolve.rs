//! Candidate lookups against environments and recorded exchanges.
//!
//! Every lookup returns a [`LookupError`] on a miss. The placeholder
//! resolver treats those as "try the next candidate" unless
//! [`LookupError::is_fatal`] says otherwise; the shortcut expander has no
//! fallback and reports every miss.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::document::{split_dotted, Document, PathError, Scalar};
use crate::environment::{EnvError, EnvironmentProvider};
use crate::history::{HistoryError, RecordedExchangeStore};

/// How textual `response.body` values of recorded exchanges are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyMode {
    /// Decode the body as JSON when it parses, so `response.body.id` works
    #[default]
    Structured,
    /// Leave the body as text
    Raw,
}

/// Why a single candidate failed to produce a value.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Bad `[env]` syntax inside an item
    #[error("{0}")]
    Syntax(String),

    #[error(transparent)]
    Environment(#[from] EnvError),

    #[error(transparent)]
    Exchange(#[from] HistoryError),

    #[error(transparent)]
    Path(#[from] PathError),
}

impl LookupError {
    /// Ambiguous file names are never silently skipped.
    pub fn is_fatal(&self) -> bool {
        match self {
            LookupError::Environment(EnvError::File(e)) => e.is_ambiguous(),
            LookupError::Exchange(e) => e.is_ambiguous(),
            _ => false,
        }
    }
}

/// The data sources placeholders and shortcuts read from.
#[derive(Clone, Copy)]
pub struct VariableSources<'a> {
    pub environments: &'a dyn EnvironmentProvider,
    pub exchanges: &'a dyn RecordedExchangeStore,
    pub body_mode: BodyMode,
}

impl<'a> VariableSources<'a> {
    /// Sources with the default (structured) body mode.
    pub fn new(
        environments: &'a dyn EnvironmentProvider,
        exchanges: &'a dyn RecordedExchangeStore,
    ) -> Self {
        Self {
            environments,
            exchanges,
            body_mode: BodyMode::default(),
        }
    }

    pub fn with_body_mode(mut self, body_mode: BodyMode) -> Self {
        self.body_mode = body_mode;
        self
    }

    /// Looks up `[env]path` or `[]path` (the active environment).
    ///
    /// `[env]poo`, `[env].poo` and `[env]...poo..` all walk the same path.
    pub fn lookup_environment_item(&self, item: &str) -> Result<String, LookupError> {
        let (name, path) = split_environment_item(item)?;
        if split_dotted(path).is_empty() {
            return Err(LookupError::Syntax(format!("No path found after {}", item)));
        }

        let name = name.trim();
        let env = self
            .environments
            .load_environment((!name.is_empty()).then_some(name))?;
        Ok(env.lookup(path)?.interpolate()?)
    }

    /// Looks up `name.path` in the recorded exchange `name`.
    ///
    /// The path is walked from the root of the exchange, so `request.method`,
    /// `response.status` and `response.body.id` are all reachable.
    pub fn lookup_exchange_item(&self, item: &str) -> Result<String, LookupError> {
        let Some((name, path)) = item.split_once('.') else {
            return Err(LookupError::Syntax(format!("No path found after {}", item)));
        };

        let mut doc = self.exchanges.load_exchange(name)?;
        if self.body_mode == BodyMode::Structured {
            decode_body(&mut doc);
        }
        Ok(doc.lookup(path)?.interpolate()?)
    }
}

/// Splits `[name]rest` into `("name", "rest")`.
fn split_environment_item(item: &str) -> Result<(&str, &str), LookupError> {
    let Some(inner) = item.strip_prefix('[') else {
        return Err(LookupError::Syntax(format!("No brackets found in '{}'", item)));
    };
    let Some(end) = inner.find(']') else {
        return Err(LookupError::Syntax(format!("Unclosed bracket: '{}'", item)));
    };
    Ok((&inner[..end], &inner[end + 1..]))
}

/// Replaces a textual `response.body` with its JSON structure when it parses.
fn decode_body(doc: &mut Document) {
    let Document::Mapping(root) = doc else {
        return;
    };
    let Some(Document::Mapping(response)) = root.get_mut("response") else {
        return;
    };
    let Some(body) = response.get_mut("body") else {
        return;
    };
    let Document::Scalar(Scalar::String(text)) = &*body else {
        return;
    };

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => *body = Document::from(value),
        // not json; the caller may not need the body at all
        Err(e) => debug!(error = %e, "response body is not json"),
    }
}
