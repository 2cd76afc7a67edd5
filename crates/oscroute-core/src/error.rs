//! Error types for oscroute

use thiserror::Error;

/// Result type alias for oscroute core operations
pub type Result<T> = std::result::Result<T, Error>;

/// oscroute error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed subscribe/unsubscribe input (bad segment, missing token, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The host environment cannot provide a connection primitive
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
