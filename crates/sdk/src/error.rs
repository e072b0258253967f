//! SDK Error Types

use thiserror::Error;

/// Server code for a duplicate registration
pub const ALREADY_REGISTERED_CODE: i32 = 4002;

/// Server code for a store failure
pub const STORE_UNAVAILABLE_CODE: i32 = 5001;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("RPC error ({code}): {message}")]
    Rpc { code: i32, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SdkError {
    /// The user is already waiting; look up the rank instead
    pub fn is_already_registered(&self) -> bool {
        matches!(self, SdkError::Rpc { code, .. } if *code == ALREADY_REGISTERED_CODE)
    }

    /// The daemon could not reach its store; safe to retry later
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, SdkError::Rpc { code, .. } if *code == STORE_UNAVAILABLE_CODE)
    }
}

impl From<jsonrpsee::core::ClientError> for SdkError {
    fn from(e: jsonrpsee::core::ClientError) -> Self {
        match e {
            jsonrpsee::core::ClientError::Call(call_err) => SdkError::Rpc {
                code: call_err.code(),
                message: call_err.message().to_string(),
            },
            jsonrpsee::core::ClientError::Transport(e) => {
                SdkError::Transport(format!("Transport error: {}", e))
            }
            jsonrpsee::core::ClientError::RestartNeeded(_) => {
                SdkError::Connection("Connection restart needed".to_string())
            }
            jsonrpsee::core::ClientError::ParseError(e) => SdkError::Serialization(e),
            _ => SdkError::Other(e.to_string()),
        }
    }
}
