//! Top-level error type: configuration and logger-initialization failures
//! are the only causes of process exit (§7 Error Handling Design).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseConfig {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("invalid log level {0:?}: {1}")]
    InvalidLogLevel(String, String),

    #[error("failed to initialize log file {path}: {source}")]
    LogFile {
        path: String,
        source: std::io::Error,
    },
}
