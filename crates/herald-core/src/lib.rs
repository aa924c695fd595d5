//! Shared configuration schema, error types, and logging bootstrap.

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{Error, Result};
