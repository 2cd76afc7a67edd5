//! Client error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Core(#[from] oscroute_core::Error),

    #[error("transport error: {0}")]
    Transport(#[from] oscroute_transport::TransportError),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),
}

impl ClientError {
    /// Whether this is a malformed-argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            ClientError::Core(oscroute_core::Error::InvalidArgument(_))
                | ClientError::Transport(oscroute_transport::TransportError::Core(
                    oscroute_core::Error::InvalidArgument(_)
                ))
        )
    }
}

impl From<rosc::OscError> for ClientError {
    fn from(e: rosc::OscError) -> Self {
        ClientError::Decode(format!("{:?}", e))
    }
}
