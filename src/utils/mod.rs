//! Small shared helpers.
//!
//! - [`path`]: filesystem path normalization
//! - [`plural`]: count formatting for log lines
//! - [`url`]: url path joining

pub mod path;
mod plural;
pub mod url;

pub use plural::{plural_count, plural_s};
