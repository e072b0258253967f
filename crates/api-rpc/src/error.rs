//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use serde_json::json;
use waitroom_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const ALREADY_REGISTERED: i32 = 4002;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const STORE_UNAVAILABLE: i32 = 5001;
    pub const CONFIGURATION_ERROR: i32 = 5003;
}

/// Convert AppError to JSON-RPC ErrorObject
///
/// `AlreadyRegistered` carries the queue and user in `data` so callers can
/// fall back to a rank lookup without parsing the message.
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let message = err.to_string();
    match err {
        AppError::AlreadyRegistered { queue, user_id } => ErrorObjectOwned::owned(
            code::ALREADY_REGISTERED,
            message,
            Some(json!({ "queue": queue, "user_id": user_id })),
        ),
        AppError::Validation(_) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, message, None::<()>)
        }
        AppError::StoreUnavailable(_) => {
            ErrorObjectOwned::owned(code::STORE_UNAVAILABLE, message, None::<()>)
        }
        AppError::Configuration(_) => {
            ErrorObjectOwned::owned(code::CONFIGURATION_ERROR, message, None::<()>)
        }
        AppError::Internal(_) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, message, None::<()>),
    }
}
