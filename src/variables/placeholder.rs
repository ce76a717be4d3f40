//! Parsing and evaluation of a single `{{ ... }}` placeholder.
//!
//! A placeholder holds an ordered list of candidates and an optional
//! default:
//!
//! ```text
//! {{[dev].headers.accept, post.response.body.id, thing_id : fallback}}
//! ```
//!
//! Items are typed by their syntax alone:
//!
//! - `[env]path` / `[]path` reads an environment (empty name = active)
//! - `name.path` reads the recorded exchange `name`
//! - a bare word reads a `--with` binding
//!
//! The first candidate that yields a value wins. The default is literal text
//! and is never evaluated.

use std::collections::HashMap;
use tracing::debug;

use super::error::VarError;
use super::resolve::{LookupError, VariableSources};

/// One candidate data source inside a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate<'a> {
    /// `[env]path`
    Environment(&'a str),
    /// `name.path`
    Exchange(&'a str),
    /// bare identifier
    With(&'a str),
}

impl<'a> Candidate<'a> {
    /// Classifies a trimmed item by its syntax.
    pub fn classify(item: &'a str) -> Self {
        if item.starts_with('[') {
            Candidate::Environment(item)
        } else if item.contains('.') {
            Candidate::Exchange(item)
        } else {
            Candidate::With(item)
        }
    }
}

/// A parsed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// The full `{{...}}` text, kept for diagnostics
    pub original: &'a str,
    pub candidates: Vec<Candidate<'a>>,
    pub default: Option<&'a str>,
}

impl<'a> Placeholder<'a> {
    /// Parses the full `{{...}}` text of a placeholder.
    ///
    /// # Errors
    ///
    /// `VarError::MalformedPlaceholder` if the inner text contains braces or
    /// `@`, or if a `:` is followed by nothing.
    pub fn parse(original: &'a str) -> Result<Self, VarError> {
        let inner = original
            .strip_prefix("{{")
            .and_then(|s| s.strip_suffix("}}"))
            .ok_or_else(|| VarError::malformed(original, "expected '{{...}}'"))?;

        if inner.contains('{') || inner.contains('}') {
            return Err(VarError::malformed(
                original,
                "'{{' and '}}' not allowed in double-braced list",
            ));
        }
        if inner.contains('@') {
            return Err(VarError::malformed(
                original,
                "shortcut '@' not allowed in double-braced list",
            ));
        }

        let mut items: Vec<&str> = inner
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect();

        // 'item:my:weird:default' -> item 'item', default 'my:weird:default'
        let mut default = None;
        if let Some(last) = items.pop() {
            match last.split_once(':') {
                Some((item, value)) => {
                    let value = value.trim();
                    if value.is_empty() {
                        return Err(VarError::malformed(
                            original,
                            "expected default value after ':'",
                        ));
                    }
                    default = Some(value);
                    let item = item.trim();
                    if !item.is_empty() {
                        items.push(item);
                    }
                }
                None => items.push(last),
            }
        }

        Ok(Self {
            original,
            candidates: items.into_iter().map(Candidate::classify).collect(),
            default,
        })
    }

    /// Evaluates the candidates in order, falling back to the default.
    ///
    /// Candidate misses are swallowed. An ambiguous environment or exchange
    /// name is not a miss and aborts immediately.
    ///
    /// # Errors
    ///
    /// `VarError::SubstitutionFailed` if nothing resolves and there is no
    /// default.
    pub fn resolve(
        &self,
        withs: &HashMap<String, String>,
        sources: &VariableSources<'_>,
    ) -> Result<String, VarError> {
        for candidate in &self.candidates {
            let outcome = match *candidate {
                Candidate::Environment(item) => sources.lookup_environment_item(item),
                Candidate::Exchange(item) => sources.lookup_exchange_item(item),
                Candidate::With(name) => match withs.get(name) {
                    Some(value) => return Ok(value.clone()),
                    None => {
                        debug!(name, "no --with binding");
                        continue;
                    }
                },
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if e.is_fatal() => return Err(into_fatal(self.original, e)),
                Err(e) => debug!(candidate = ?candidate, error = %e, "candidate did not resolve"),
            }
        }

        if let Some(default) = self.default {
            return Ok(default.to_string());
        }

        Err(VarError::failed(
            self.original,
            "no candidate resolved and no default was given",
        ))
    }
}

fn into_fatal(original: &str, err: LookupError) -> VarError {
    match err {
        LookupError::Environment(e) => VarError::Environment(e),
        LookupError::Exchange(e) => VarError::Exchange(e),
        other => VarError::failed(original, other.to_string()),
    }
}
