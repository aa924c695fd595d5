//! Command-line entry point for `heraldd`.

pub mod commands;
pub mod error;

pub use commands::{Cli, Commands};
pub use error::{CliError, CliResult};
