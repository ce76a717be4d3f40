//! The `@` shortcut notation.
//!
//! Shortcuts are sugar for the common case of chaining off the most recent
//! response:
//!
//! | shortcut               | equivalent placeholder              |
//! |------------------------|-------------------------------------|
//! | `@id`                  | `{{last.response.body.id}}`         |
//! | `@headers.location`    | `{{last.response.headers.location}}`|
//! | `@[dev].endpoint`      | `{{[dev].endpoint}}`                |
//!
//! A shortcut has no fallback list and no default, so any failure to
//! resolve it is fatal.

use super::error::VarError;
use super::resolve::VariableSources;
use crate::history::LAST_EXCHANGE;

/// The character that introduces a shortcut.
pub const SHORTCUT_SIGIL: char = '@';

/// Letters, digits, `_`, `.` and the brackets of `[env]` references.
pub fn is_shortcut_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']')
}

/// Where a shortcut key is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutTarget {
    /// `[env]path`, looked up as an environment item
    Environment(String),
    /// `last.response...`, looked up as a recorded exchange item
    Exchange(String),
}

impl ShortcutTarget {
    /// Maps a captured key (dots already trimmed) to its lookup item.
    pub fn from_key(key: &str) -> Self {
        if key.starts_with('[') {
            ShortcutTarget::Environment(key.to_string())
        } else if key.contains('.') {
            ShortcutTarget::Exchange(format!("{}.response.{}", LAST_EXCHANGE, key))
        } else {
            ShortcutTarget::Exchange(format!("{}.response.body.{}", LAST_EXCHANGE, key))
        }
    }

    /// The lookup item in placeholder syntax, without braces.
    pub fn item(&self) -> &str {
        match self {
            ShortcutTarget::Environment(item) | ShortcutTarget::Exchange(item) => item,
        }
    }
}

/// Captures the shortcut key from the text following the sigil.
///
/// # Returns
///
/// The key with leading and trailing dots removed (so `@...id.` reads as
/// `@id`), and the number of bytes consumed after the sigil.
///
/// # Errors
///
/// - `VarError::EmptyShortcut` if nothing follows the sigil
/// - `VarError::InvalidShortcutChar` if the first character is not allowed
pub fn capture_key(after_sigil: &str) -> Result<(&str, usize), VarError> {
    let first = after_sigil.chars().next().ok_or(VarError::EmptyShortcut)?;
    if !is_shortcut_char(first) {
        return Err(VarError::InvalidShortcutChar(first));
    }

    let consumed = after_sigil
        .find(|c: char| !is_shortcut_char(c))
        .unwrap_or(after_sigil.len());
    Ok((after_sigil[..consumed].trim_matches('.'), consumed))
}

/// Expands the shortcut at the start of `after_sigil`.
///
/// # Returns
///
/// The resolved value and the number of bytes consumed after the sigil.
/// Anything after the consumed span is left for the caller to scan.
pub fn expand_shortcut(
    after_sigil: &str,
    sources: &VariableSources<'_>,
) -> Result<(String, usize), VarError> {
    let (key, consumed) = capture_key(after_sigil)?;
    let original = format!("{}{}", SHORTCUT_SIGIL, &after_sigil[..consumed]);

    let target = ShortcutTarget::from_key(key);
    let value = match &target {
        ShortcutTarget::Environment(item) => sources.lookup_environment_item(item),
        ShortcutTarget::Exchange(item) => sources.lookup_exchange_item(item),
    }
    .map_err(|e| VarError::failed(&original, e.to_string()))?;

    Ok((value, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::environment::MemoryEnvironments;
    use crate::history::MemoryExchanges;

    #[test]
    fn test_capture_key_stops_at_disallowed_char() {
        assert_eq!(capture_key("id/things").unwrap(), ("id", 2));
        assert_eq!(capture_key("body.id?x=1").unwrap(), ("body.id", 7));
        assert_eq!(capture_key("[dev].endpoint").unwrap(), ("[dev].endpoint", 14));
    }

    #[test]
    fn test_capture_key_trims_dots() {
        assert_eq!(capture_key("...id..").unwrap(), ("id", 7));
        assert_eq!(capture_key("id.").unwrap(), ("id", 3));
    }

    #[test]
    fn test_capture_key_errors() {
        assert!(matches!(capture_key(""), Err(VarError::EmptyShortcut)));
        assert!(matches!(capture_key("/x"), Err(VarError::InvalidShortcutChar('/'))));
        assert!(matches!(capture_key(" id"), Err(VarError::InvalidShortcutChar(' '))));
    }

    #[test]
    fn test_target_mapping() {
        assert_eq!(
            ShortcutTarget::from_key("id"),
            ShortcutTarget::Exchange("last.response.body.id".to_string())
        );
        assert_eq!(
            ShortcutTarget::from_key("headers.location"),
            ShortcutTarget::Exchange("last.response.headers.location".to_string())
        );
        assert_eq!(
            ShortcutTarget::from_key("[dev].endpoint"),
            ShortcutTarget::Environment("[dev].endpoint".to_string())
        );
    }

    #[test]
    fn test_expand_failure_is_fatal() {
        let envs = MemoryEnvironments::new();
        let exchanges = MemoryExchanges::new().with(
            "last",
            Document::from_yaml_str("response:\n  body: '{\"id\": 1}'\n").unwrap(),
        );
        let sources = VariableSources::new(&envs, &exchanges);

        assert_eq!(expand_shortcut("id/rest", &sources).unwrap(), ("1".to_string(), 2));
        match expand_shortcut("nope/rest", &sources) {
            Err(VarError::SubstitutionFailed { placeholder, reason }) => {
                assert_eq!(placeholder, "@nope");
                assert_eq!(reason, "key 'nope' not found");
            }
            other => panic!("Expected SubstitutionFailed, got {:?}", other),
        }
    }
}
