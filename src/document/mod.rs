//! Loosely-typed document trees with dotted-path navigation.
//!
//! Environment files and recorded exchanges are arbitrary YAML (and response
//! bodies are usually JSON). Both are converted into a [`Document`] so that a
//! dotted path such as `response.body.items.0.id` can be walked the same way
//! regardless of where the data came from.
//!
//! Walking never panics: every way a path can miss is reported as a
//! [`PathError`] so callers decide whether a miss is fatal or just means
//! "try the next candidate".

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors produced while walking or editing a document by path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path had no keys after trimming dots.
    #[error("empty key path")]
    EmptyPath,

    /// A mapping did not contain the requested key.
    #[error("key '{key}' not found")]
    NotFound {
        /// The key that was missing
        key: String,
    },

    /// Tried to key into a scalar value.
    #[error("cannot look up '{key}' in a {found} value")]
    TypeMismatch {
        /// The key that was requested
        key: String,
        /// The kind of node that was found instead of a mapping or sequence
        found: &'static str,
    },

    /// A non-numeric key was used on a sequence.
    #[error("'{key}' is not a valid list index")]
    InvalidIndex {
        /// The offending key
        key: String,
    },

    /// A numeric key was past the end of a sequence.
    #[error("list index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// Length of the sequence
        len: usize,
    },

    /// The path resolved to a mapping or sequence where text was required.
    #[error("refusing to interpolate a {found} value")]
    NotScalar {
        /// Kind of node found
        found: &'static str,
    },
}

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => write!(f, "{}", s),
        }
    }
}

/// A structured document: mapping, sequence, or scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Mapping(BTreeMap<String, Document>),
    Sequence(Vec<Document>),
    Scalar(Scalar),
}

impl Default for Document {
    fn default() -> Self {
        Document::Mapping(BTreeMap::new())
    }
}

/// Splits a dotted path into keys, ignoring leading and trailing dots.
///
/// `"a.b.0"`, `".a.b.0"` and `"a.b.0..."` all produce `["a", "b", "0"]`.
pub fn split_dotted(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('.');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('.').collect()
}

impl Document {
    /// Creates an empty mapping.
    pub fn mapping() -> Self {
        Document::default()
    }

    /// Creates a string scalar.
    pub fn string(value: impl Into<String>) -> Self {
        Document::Scalar(Scalar::String(value.into()))
    }

    /// Human-readable name of this node's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Mapping(_) => "mapping",
            Document::Sequence(_) => "list",
            Document::Scalar(Scalar::Null) => "null",
            Document::Scalar(Scalar::Bool(_)) => "boolean",
            Document::Scalar(Scalar::Integer(_)) | Document::Scalar(Scalar::Float(_)) => "number",
            Document::Scalar(Scalar::String(_)) => "string",
        }
    }

    /// Returns the string if this node is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the mapping if this node is one.
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Document>> {
        match self {
            Document::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up a direct child of a mapping.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Walks a sequence of keys from this node.
    ///
    /// Numeric keys index into sequences. Any other combination that cannot
    /// be followed is reported with a specific [`PathError`].
    pub fn walk<S: AsRef<str>>(&self, keys: &[S]) -> Result<&Document, PathError> {
        if keys.is_empty() {
            return Err(PathError::EmptyPath);
        }

        let mut current = self;
        for key in keys {
            let key = key.as_ref();
            current = match current {
                Document::Mapping(map) => map.get(key).ok_or_else(|| PathError::NotFound {
                    key: key.to_string(),
                })?,
                Document::Sequence(items) => {
                    let index: usize = key.parse().map_err(|_| PathError::InvalidIndex {
                        key: key.to_string(),
                    })?;
                    items.get(index).ok_or(PathError::IndexOutOfRange {
                        index,
                        len: items.len(),
                    })?
                }
                Document::Scalar(_) => {
                    return Err(PathError::TypeMismatch {
                        key: key.to_string(),
                        found: current.kind(),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Walks a dotted path such as `headers.accept`.
    pub fn lookup(&self, path: &str) -> Result<&Document, PathError> {
        self.walk(&split_dotted(path))
    }

    /// Renders this node as text for substitution into a template.
    pub fn interpolate(&self) -> Result<String, PathError> {
        match self {
            Document::Scalar(s) => Ok(s.to_string()),
            other => Err(PathError::NotScalar {
                found: other.kind(),
            }),
        }
    }

    /// Sets `keys` to `value`, creating intermediate mappings as needed.
    pub fn set_path<S: AsRef<str>>(
        &mut self,
        keys: &[S],
        value: Document,
    ) -> Result<(), PathError> {
        let (last, parents) = keys.split_last().ok_or(PathError::EmptyPath)?;

        let mut current = self;
        for key in parents {
            let key = key.as_ref();
            let found = current.kind();
            let map = match current {
                Document::Mapping(map) => map,
                _ => {
                    return Err(PathError::TypeMismatch {
                        key: key.to_string(),
                        found,
                    })
                }
            };
            current = map.entry(key.to_string()).or_insert_with(Document::mapping);
        }

        let found = current.kind();
        match current {
            Document::Mapping(map) => {
                map.insert(last.as_ref().to_string(), value);
                Ok(())
            }
            _ => Err(PathError::TypeMismatch {
                key: last.as_ref().to_string(),
                found,
            }),
        }
    }

    /// Removes the node at `keys`, returning it.
    pub fn remove_path<S: AsRef<str>>(&mut self, keys: &[S]) -> Result<Document, PathError> {
        let (last, parents) = keys.split_last().ok_or(PathError::EmptyPath)?;

        let mut current = self;
        for key in parents {
            let key = key.as_ref();
            let found = current.kind();
            current = match current {
                Document::Mapping(map) => map.get_mut(key).ok_or_else(|| PathError::NotFound {
                    key: key.to_string(),
                })?,
                _ => {
                    return Err(PathError::TypeMismatch {
                        key: key.to_string(),
                        found,
                    })
                }
            };
        }

        let found = current.kind();
        match current {
            Document::Mapping(map) => map.remove(last.as_ref()).ok_or_else(|| PathError::NotFound {
                key: last.as_ref().to_string(),
            }),
            _ => Err(PathError::TypeMismatch {
                key: last.as_ref().to_string(),
                found,
            }),
        }
    }
}

fn yaml_key_to_string(key: serde_yaml::Value) -> String {
    match Document::from(key) {
        Document::Scalar(s) => s.to_string(),
        // complex keys are vanishingly rare; keep them addressable by their YAML text
        other => serde_yaml::to_string(&serde_yaml::Value::from(&other))
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

impl From<serde_yaml::Value> for Document {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => Document::Scalar(Scalar::Null),
            Value::Bool(b) => Document::Scalar(Scalar::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Document::Scalar(Scalar::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Document::Scalar(Scalar::String(u.to_string()))
                } else {
                    Document::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Value::String(s) => Document::Scalar(Scalar::String(s)),
            Value::Sequence(items) => {
                Document::Sequence(items.into_iter().map(Document::from).collect())
            }
            Value::Mapping(map) => Document::Mapping(
                map.into_iter()
                    .map(|(k, v)| (yaml_key_to_string(k), Document::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Document::from(tagged.value),
        }
    }
}

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Document::Scalar(Scalar::Null),
            Value::Bool(b) => Document::Scalar(Scalar::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Document::Scalar(Scalar::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Document::Scalar(Scalar::String(u.to_string()))
                } else {
                    Document::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Value::String(s) => Document::Scalar(Scalar::String(s)),
            Value::Array(items) => {
                Document::Sequence(items.into_iter().map(Document::from).collect())
            }
            Value::Object(map) => {
                Document::Mapping(map.into_iter().map(|(k, v)| (k, Document::from(v))).collect())
            }
        }
    }
}

impl From<&Document> for serde_yaml::Value {
    fn from(doc: &Document) -> Self {
        use serde_yaml::Value;
        match doc {
            Document::Scalar(Scalar::Null) => Value::Null,
            Document::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Document::Scalar(Scalar::Integer(i)) => Value::Number((*i).into()),
            Document::Scalar(Scalar::Float(x)) => Value::Number((*x).into()),
            Document::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            Document::Sequence(items) => Value::Sequence(items.iter().map(Value::from).collect()),
            Document::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| (Value::String(k.clone()), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Document {
    /// Parses a YAML string into a document. An empty string is an empty mapping.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Document::mapping());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        Ok(Document::from(value))
    }

    /// Serializes this document as block-style YAML.
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&serde_yaml::Value::from(self))
    }
}
