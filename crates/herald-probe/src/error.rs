//! Probe error types.

use thiserror::Error;

/// Result type for a single probe execution.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Why a probe execution was considered a failure.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("no probe configured")]
    NotConfigured,

    #[error("probe cancelled")]
    Cancelled,

    #[error("probe timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status code {got}, expected one of {expected:?}")]
    UnexpectedStatus { got: u16, expected: Vec<u16> },

    #[error("grpc health check failed: {0}")]
    Grpc(String),

    #[error("service {service:?} not serving (status: {status})")]
    NotServing { service: Option<String>, status: String },

    #[error("failed to spawn command: {0}")]
    Spawn(String),

    #[error("unexpected exit code {got}, expected one of {expected:?}")]
    UnexpectedExitCode { got: i32, expected: Vec<i32> },
}
