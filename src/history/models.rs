//! Data models for recorded exchanges and history entries.
//!
//! A [`RecordedExchange`] is the request/response pair that is written to
//! `.spag/remembers/<name>.yml` and appended to `.spag/history.yml`. Its YAML
//! shape is what placeholders such as `{{last.response.body.id}}` walk:
//!
//! ```yaml
//! request:
//!   method: POST
//!   endpoint: http://localhost:5000
//!   uri: /things
//!   headers:
//!     content-type: application/json
//!   body: '{"id": "wumbo"}'
//! response:
//!   status: 201
//!   headers: {}
//!   body: '{"id": "wumbo"}'
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

use crate::document::Document;
use crate::files::FileError;

/// Errors that can occur while recording or reading exchanges and history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// No recorded exchange is stored under this name.
    #[error("No recorded exchange named '{0}'")]
    NotFound(String),

    /// A request URL could not be split into endpoint and uri.
    #[error("Invalid request url '{url}': {source}")]
    InvalidUrl {
        /// The offending url
        url: String,
        /// Underlying parse error
        #[source]
        source: url::ParseError,
    },

    /// A history index was not a number.
    #[error("Invalid history index {0}")]
    InvalidIndex(String),

    /// A history index was past the end of the history.
    #[error("No request at #{index} (history holds {len} requests)")]
    OutOfBounds {
        /// Requested index
        index: usize,
        /// Number of stored entries
        len: usize,
    },

    /// An exchange or history document could not be (de)serialized.
    #[error("History serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    /// Reading or writing a file failed.
    #[error(transparent)]
    File(#[from] FileError),
}

impl HistoryError {
    /// True when the error came from an ambiguous file name.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, HistoryError::File(e) if e.is_ambiguous())
    }
}

/// The request half of a recorded exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub method: String,
    /// Scheme, host and port, e.g. `http://localhost:5000`
    pub endpoint: String,
    /// Path and query, e.g. `/things?page=2`
    pub uri: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// The response half of a recorded exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
}

/// A request and the response it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedExchange {
    pub request: ExchangeRequest,
    pub response: ExchangeResponse,
}

/// Splits a full URL into its origin and its path plus query.
///
/// `http://example.com:8080/a/b?c=d` becomes
/// `("http://example.com:8080", "/a/b?c=d")`.
pub fn split_url(raw: &str) -> Result<(String, String), HistoryError> {
    let url = Url::parse(raw).map_err(|e| HistoryError::InvalidUrl {
        url: raw.to_string(),
        source: e,
    })?;

    let endpoint = url.origin().ascii_serialization();
    let mut uri = url.path().to_string();
    if let Some(query) = url.query() {
        uri.push('?');
        uri.push_str(query);
    }
    Ok((endpoint, uri))
}

impl RecordedExchange {
    /// Builds an exchange from a full request URL and the response parts.
    ///
    /// # Arguments
    ///
    /// * `method` - Request method
    /// * `url` - Full request URL, split into `endpoint` and `uri`
    /// * `request_headers` - Headers that were sent
    /// * `request_body` - Body that was sent, if any
    /// * `response` - What came back
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::InvalidUrl` if `url` is not absolute.
    pub fn new(
        method: &str,
        url: &str,
        request_headers: BTreeMap<String, String>,
        request_body: Option<String>,
        response: ExchangeResponse,
    ) -> Result<Self, HistoryError> {
        let (endpoint, uri) = split_url(url)?;
        Ok(Self {
            request: ExchangeRequest {
                method: method.to_uppercase(),
                endpoint,
                uri,
                headers: request_headers,
                body: request_body,
            },
            response,
        })
    }

    /// Parses an exchange from its YAML form.
    pub fn from_yaml_str(text: &str) -> Result<Self, HistoryError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Serializes the exchange as YAML.
    pub fn to_yaml_string(&self) -> Result<String, HistoryError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The exchange as a walkable document.
    pub fn to_document(&self) -> Result<Document, HistoryError> {
        Ok(Document::from(serde_yaml::to_value(self)?))
    }

    /// `METHOD endpointuri`, the one-line form used in listings.
    pub fn summary(&self) -> String {
        format!(
            "{} {}{}",
            self.request.method, self.request.endpoint, self.request.uri
        )
    }
}

/// One entry of the request history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the exchange was recorded, in UTC.
    pub recorded_at: DateTime<Utc>,
    pub request: ExchangeRequest,
    pub response: ExchangeResponse,
}

impl HistoryEntry {
    /// Stamps an exchange with the current time.
    pub fn new(exchange: RecordedExchange) -> Self {
        Self::at(exchange, Utc::now())
    }

    /// Stamps an exchange with a given time.
    pub fn at(exchange: RecordedExchange, recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at,
            request: exchange.request,
            response: exchange.response,
        }
    }

    /// The exchange without its timestamp.
    pub fn exchange(&self) -> RecordedExchange {
        RecordedExchange {
            request: self.request.clone(),
            response: self.response.clone(),
        }
    }
}
