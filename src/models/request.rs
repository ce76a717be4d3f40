//! Request file and prepared request models.
//!
//! A request file is a small YAML document:
//!
//! ```yaml
//! method: POST
//! uri: /things/{{thing_id}}
//! headers:
//!   content-type: application/json
//! body:
//!   name: wumbo
//! ```
//!
//! Structured bodies are sent as JSON; string bodies are sent verbatim.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::document::Document;

/// Errors raised while reading a request file or building a request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid request file: {0}")]
    InvalidFormat(String),

    #[error("Unknown HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("No endpoint given. Pass --endpoint or set one with `spag env set endpoint=<url>`")]
    MissingEndpoint,

    #[error("Failed to load request file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to encode request body: {0}")]
    Body(#[from] serde_json::Error),
}

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
        }
    }

    /// Parses a method name, ignoring case.
    ///
    /// # Returns
    ///
    /// `Some(HttpMethod)` if the string is a valid HTTP method, `None` otherwise.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            "HEAD" => Some(HttpMethod::HEAD),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RawRequestFile {
    method: String,
    uri: String,
    #[serde(default)]
    headers: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    body: Option<serde_yaml::Value>,
}

/// A parsed request file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFile {
    pub method: HttpMethod,
    pub uri: String,
    pub headers: BTreeMap<String, String>,
    /// The body as it will be sent
    pub body: Option<String>,
}

impl RequestFile {
    /// Parses an (already untemplated) request file.
    pub fn parse(text: &str) -> Result<Self, RequestError> {
        let raw: RawRequestFile = serde_yaml::from_str(text)?;

        let method = HttpMethod::parse(&raw.method)
            .ok_or_else(|| RequestError::InvalidMethod(raw.method.clone()))?;

        let mut headers = BTreeMap::new();
        for (key, value) in raw.headers {
            let value = Document::from(value).interpolate().map_err(|e| {
                RequestError::InvalidFormat(format!("header '{}': {}", key, e))
            })?;
            headers.insert(key, value);
        }

        let body = match raw.body {
            None | Some(serde_yaml::Value::Null) => None,
            Some(serde_yaml::Value::String(text)) => Some(text),
            Some(value @ (serde_yaml::Value::Mapping(_) | serde_yaml::Value::Sequence(_))) => {
                Some(serde_json::to_string(&value)?)
            }
            Some(other) => Some(Document::from(other).interpolate().map_err(|e| {
                RequestError::InvalidFormat(format!("body: {}", e))
            })?),
        };

        Ok(Self {
            method,
            uri: raw.uri,
            headers,
            body,
        })
    }
}

/// A fully resolved request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl fmt::Display for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.method, self.url)?;
        for (key, value) in &self.headers {
            writeln!(f, "{}: {}", key, value)?;
        }
        if let Some(body) = &self.body {
            writeln!(f)?;
            writeln!(f, "{}", body)?;
        }
        Ok(())
    }
}
