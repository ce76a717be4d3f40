//! spag: a command-line HTTP workbench
//!
//! Requests live in YAML files next to your code. spag finds them by short
//! name, fills in their `{{placeholders}}` from environments, previously
//! recorded exchanges and `--with` bindings, and hands back a request ready to
//! send.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - **files**: Path Index resolving short names like `things/get` to files
//! - **document**: The nested YAML/JSON value type and dotted-path lookups
//! - **environment**: Named environments and the active-environment store
//! - **history**: Recorded exchanges, named remembers and the request history
//! - **variables**: The template engine (placeholders and `@` shortcuts)
//! - **models**: Request files and prepared requests
//! - **config**: Settings read from `.spag/config.yml`
//! - **commands**: Command handlers behind the `spag` binary
//!
//! # Templates
//!
//! A placeholder lists candidates tried left to right, with an optional
//! default after the last colon:
//!
//! ```text
//! {{thing_id}}                     a --with binding
//! {{[].endpoint}}                  the active environment
//! {{[dev].headers.auth}}           a named environment
//! {{last.response.body.id}}        the most recent exchange
//! {{thing_id, last.response.body.id : 1}}
//! ```
//!
//! Outside braces, `@id` is short for `{{last.response.body.id}}` and
//! `@[].token` for `{{[].token}}`.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use spag::environment::MemoryEnvironments;
//! use spag::history::MemoryExchanges;
//! use spag::variables::{untemplate, VariableSources};
//! use spag::document::Document;
//!
//! let envs = MemoryEnvironments::new()
//!     .with("default", Document::from_yaml_str("endpoint: http://localhost").unwrap());
//! let exchanges = MemoryExchanges::new();
//! let sources = VariableSources::new(&envs, &exchanges);
//!
//! let withs = HashMap::from([("id".to_string(), "7".to_string())]);
//! let out = untemplate("{{[].endpoint}}/things/{{id}}", &withs, true, &sources).unwrap();
//! assert_eq!(out, "http://localhost/things/7");
//! ```

pub mod commands;
pub mod config;
pub mod document;
pub mod environment;
pub mod files;
pub mod history;
pub mod models;
pub mod variables;
