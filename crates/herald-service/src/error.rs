//! Service controller error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("failed to connect to systemd: {0}")]
    Connect(String),

    #[error("failed to query unit {unit}: {source}")]
    Query { unit: String, source: String },

    #[error("failed to restart unit {unit}: {source}")]
    Restart { unit: String, source: String },
}
