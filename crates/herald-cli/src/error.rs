//! CLI-level error type. Wraps `herald_core::Error` plus the small set of
//! failures that only make sense at the process boundary (binding the
//! metrics listener, waiting on signals).

use thiserror::Error;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] herald_core::Error),

    #[error("failed to bind metrics listener on {address}: {source}")]
    MetricsBind {
        address: String,
        source: std::io::Error,
    },

    #[error("failed to install signal handler: {0}")]
    Signal(std::io::Error),
}
