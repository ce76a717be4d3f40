//! Recorded exchanges and request history.
//!
//! Two stores live under the spag directory:
//!
//! - `remembers/` holds named exchanges (always including `last`) that
//!   placeholders and shortcuts read from, e.g. `{{last.response.body.id}}`
//!   or `@id`
//! - `history.yml` holds the most recent exchanges, newest first
//!
//! # Example
//!
//! ```ignore
//! use spag::history::{History, RememberStore, RecordedExchange};
//!
//! let url = "http://localhost:5000/things";
//! let exchange = RecordedExchange::new("GET", url, headers, None, response)?;
//! RememberStore::new(".spag/remembers", ".yml").remember("things", &exchange)?;
//! History::new(".spag/history.yml", 1000).append(&exchange)?;
//! ```

pub mod models;
pub mod remember;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use models::{
    split_url, ExchangeRequest, ExchangeResponse, HistoryEntry, HistoryError, RecordedExchange,
};
pub use remember::{MemoryExchanges, RecordedExchangeStore, RememberStore, LAST_EXCHANGE};
pub use storage::{History, DEFAULT_MAX_HISTORY_ENTRIES};
pub use ui::{format_history_entry, format_history_list, format_history_summary};
