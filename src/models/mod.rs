//! Data models for request files and prepared requests.

pub mod request;

pub use request::{HttpMethod, PreparedRequest, RequestError, RequestFile};
