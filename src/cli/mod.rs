//! Command-line interface module.

mod args;
pub mod publish;
pub mod validate;

pub use args::{Cli, Commands, PublishArgs, ValidateArgs};
