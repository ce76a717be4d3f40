//! Describes the parameters a template expects.
//!
//! Used by `spag params` to show, for each placeholder and shortcut in a
//! request file, which sources can satisfy it. Nothing is resolved here.

use std::fmt;

use super::error::VarError;
use super::placeholder::{Candidate, Placeholder};
use super::shortcut::{capture_key, ShortcutTarget, SHORTCUT_SIGIL};
use super::substitution::find_placeholder;

/// One placeholder or shortcut found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescription {
    /// The text as it appears in the template
    pub text: String,
    /// Sources tried in order
    pub sources: Vec<String>,
    pub default: Option<String>,
}

impl fmt::Display for ParamDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.text)?;
        for source in &self.sources {
            writeln!(f, "  - {}", source)?;
        }
        match &self.default {
            Some(default) => writeln!(f, "  default: {}", default),
            None => writeln!(f, "  (required)"),
        }
    }
}

fn describe_candidate(candidate: &Candidate<'_>) -> String {
    match *candidate {
        Candidate::Environment(item) => describe_environment_item(item),
        Candidate::Exchange(item) => match item.split_once('.') {
            Some((name, path)) => format!("recorded exchange '{}': {}", name, path),
            None => format!("recorded exchange '{}'", item),
        },
        Candidate::With(name) => format!("--with {}=<value>", name),
    }
}

fn describe_environment_item(item: &str) -> String {
    let parsed = item
        .strip_prefix('[')
        .and_then(|inner| inner.split_once(']'));
    match parsed {
        Some((name, path)) if name.trim().is_empty() => {
            format!("active environment: {}", path.trim_matches('.'))
        }
        Some((name, path)) => {
            format!("environment '{}': {}", name.trim(), path.trim_matches('.'))
        }
        None => format!("malformed environment reference {}", item),
    }
}

/// Lists every placeholder (and, when `shortcuts` is set, every shortcut)
/// in `text`, in order of appearance.
///
/// # Errors
///
/// The same syntax errors `untemplate` would raise: unclosed braces,
/// malformed placeholders and malformed shortcuts.
pub fn describe_params(text: &str, shortcuts: bool) -> Result<Vec<ParamDescription>, VarError> {
    let mut params = Vec::new();
    let mut rest = text;

    loop {
        let span = find_placeholder(rest)?;
        let literal = match span {
            Some((start, _)) => &rest[..start],
            None => rest,
        };
        if shortcuts {
            describe_shortcuts(literal, &mut params)?;
        }

        let Some((start, end)) = span else {
            break;
        };
        let placeholder = Placeholder::parse(&rest[start..end])?;
        params.push(ParamDescription {
            text: placeholder.original.to_string(),
            sources: placeholder.candidates.iter().map(describe_candidate).collect(),
            default: placeholder.default.map(str::to_string),
        });
        rest = &rest[end..];
    }

    Ok(params)
}

fn describe_shortcuts(literal: &str, params: &mut Vec<ParamDescription>) -> Result<(), VarError> {
    let mut rest = literal;
    while let Some(at) = rest.find(SHORTCUT_SIGIL) {
        let after = &rest[at + SHORTCUT_SIGIL.len_utf8()..];
        let (key, consumed) = capture_key(after)?;
        let target = ShortcutTarget::from_key(key);
        let source = match &target {
            ShortcutTarget::Environment(item) => describe_environment_item(item),
            ShortcutTarget::Exchange(item) => {
                describe_candidate(&Candidate::Exchange(item.as_str()))
            }
        };
        params.push(ParamDescription {
            text: format!("{}{}", SHORTCUT_SIGIL, &after[..consumed]),
            sources: vec![source],
            default: None,
        });
        rest = &after[consumed..];
    }
    Ok(())
}
