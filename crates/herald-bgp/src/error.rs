//! BGP path-builder and speaker error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BgpError>;

#[derive(Error, Debug)]
pub enum BgpError {
    #[error("invalid prefix {0:?}: {1}")]
    InvalidPrefix(String, String),

    #[error("invalid next hop {0:?}: {1}")]
    InvalidNextHop(String, String),

    #[error("peer {address} already configured")]
    DuplicatePeer { address: String },

    #[error("no such path for prefix {0}")]
    PathNotFound(String),

    #[error("speaker is not running")]
    NotRunning,
}
