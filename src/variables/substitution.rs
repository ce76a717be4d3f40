//! Template substitution engine for spag
//!
//! `untemplate` rewrites every `{{...}}` placeholder in a string and then,
//! when enabled, every `@` shortcut. Each syntax class is handled in one
//! left-to-right pass over the input: literal runs are copied to the output
//! buffer, spans are replaced by their resolved value, and substituted text
//! is never scanned again.
//!
//! Any failure aborts the whole call; partial output is never returned.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::error::VarError;
use super::placeholder::Placeholder;
use super::resolve::VariableSources;
use super::shortcut::{expand_shortcut, SHORTCUT_SIGIL};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// How much of an unclosed placeholder is quoted in the error.
const UNCLOSED_SNIPPET_LEN: usize = 20;

/// `--with` keys are bare identifiers, the only form a placeholder can name.
static WITH_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("Failed to compile with key regex"));

/// Byte range of the first `{{...}}` span in `text`.
///
/// # Errors
///
/// `VarError::UnclosedBraces` if a `{{` has no `}}` after it.
pub fn find_placeholder(text: &str) -> Result<Option<(usize, usize)>, VarError> {
    let Some(start) = text.find(OPEN) else {
        return Ok(None);
    };
    match text[start + OPEN.len()..].find(CLOSE) {
        Some(offset) => Ok(Some((start, start + OPEN.len() + offset + CLOSE.len()))),
        None => Err(VarError::UnclosedBraces(
            text[start..].chars().take(UNCLOSED_SNIPPET_LEN).collect(),
        )),
    }
}

/// Parses `key=value` arguments into with-bindings.
///
/// Values are kept verbatim; [`untemplate`] expands their shortcuts.
///
/// # Examples
///
/// ```
/// use spag::variables::parse_withs;
///
/// let withs = parse_withs(&["id=@id".to_string(), "q=a=b".to_string()]).unwrap();
/// assert_eq!(withs["id"], "@id");
/// assert_eq!(withs["q"], "a=b");
/// ```
pub fn parse_withs<S: AsRef<str>>(args: &[S]) -> Result<HashMap<String, String>, VarError> {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            match arg.split_once('=') {
                Some((key, value)) if WITH_KEY_REGEX.is_match(key.trim()) => {
                    Ok((key.trim().to_string(), value.to_string()))
                }
                _ => Err(VarError::InvalidWith(arg.to_string())),
            }
        })
        .collect()
}

/// Replaces every placeholder, then (optionally) every shortcut, in `text`.
///
/// # Arguments
///
/// * `text` - The template text
/// * `withs` - Caller-supplied bindings; their values are shortcut-expanded
///   before use, so `id=@id` binds the id of the last response
/// * `shortcuts` - Whether to expand `@` shortcuts after the placeholders
/// * `sources` - Environments and recorded exchanges to read from
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use spag::environment::MemoryEnvironments;
/// use spag::history::MemoryExchanges;
/// use spag::variables::{untemplate, VariableSources};
///
/// let envs = MemoryEnvironments::new();
/// let exchanges = MemoryExchanges::new();
/// let sources = VariableSources::new(&envs, &exchanges);
/// let withs = HashMap::from([("id".to_string(), "42".to_string())]);
///
/// let out = untemplate("/things/{{id}}?q={{q : all}}", &withs, false, &sources).unwrap();
/// assert_eq!(out, "/things/42?q=all");
/// ```
pub fn untemplate(
    text: &str,
    withs: &HashMap<String, String>,
    shortcuts: bool,
    sources: &VariableSources<'_>,
) -> Result<String, VarError> {
    let withs = resolve_withs(withs, sources)?;
    let text = substitute_braces(text, &withs, sources)?;
    if shortcuts {
        substitute_shortcuts(&text, sources)
    } else {
        Ok(text)
    }
}

/// Expands the shortcuts in every with-binding value.
pub fn resolve_withs(
    withs: &HashMap<String, String>,
    sources: &VariableSources<'_>,
) -> Result<HashMap<String, String>, VarError> {
    withs
        .iter()
        .map(|(key, value)| Ok((key.clone(), substitute_shortcuts(value, sources)?)))
        .collect()
}

/// The braces pass: replaces each `{{...}}` span, left to right.
pub fn substitute_braces(
    text: &str,
    withs: &HashMap<String, String>,
    sources: &VariableSources<'_>,
) -> Result<String, VarError> {
    // fast path
    if !text.contains(OPEN) {
        return Ok(text.to_string());
    }

    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some((start, end)) = find_placeholder(rest)? {
        output.push_str(&rest[..start]);
        let placeholder = Placeholder::parse(&rest[start..end])?;
        output.push_str(&placeholder.resolve(withs, sources)?);
        rest = &rest[end..];
    }
    output.push_str(rest);
    Ok(output)
}

/// The shortcut pass: replaces each `@key` span, left to right.
pub fn substitute_shortcuts(text: &str, sources: &VariableSources<'_>) -> Result<String, VarError> {
    if !text.contains(SHORTCUT_SIGIL) {
        return Ok(text.to_string());
    }

    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find(SHORTCUT_SIGIL) {
        output.push_str(&rest[..at]);
        let after = &rest[at + SHORTCUT_SIGIL.len_utf8()..];
        let (value, consumed) = expand_shortcut(after, sources)?;
        output.push_str(&value);
        rest = &after[consumed..];
    }
    output.push_str(rest);
    Ok(output)
}
