//! Variables module for spag
//!
//! This module rewrites placeholder and shortcut syntax in request text:
//!
//! - `{{[env].path, name.path, with_key : default}}` placeholders, resolved
//!   against environments, recorded exchanges and `--with` bindings
//! - `@key` shortcuts, resolved against the last recorded exchange
//!
//! Data sources are injected through [`VariableSources`]; nothing in here
//! knows where environments or exchanges are stored.

pub mod error;
pub mod params;
pub mod placeholder;
pub mod resolve;
pub mod shortcut;
pub mod substitution;

pub use error::VarError;
pub use params::{describe_params, ParamDescription};
pub use placeholder::{Candidate, Placeholder};
pub use resolve::{BodyMode, LookupError, VariableSources};
pub use shortcut::{expand_shortcut, ShortcutTarget};
pub use substitution::{parse_withs, untemplate};
