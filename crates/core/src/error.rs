// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// User is already waiting in the queue. Callers should look up the rank instead.
    #[error("User {user_id} is already registered in queue {queue}")]
    AlreadyRegistered { queue: String, user_id: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Startup cannot continue (missing capability, unreadable configuration)
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for the registration conflict, which is recoverable by a rank lookup
    pub fn is_already_registered(&self) -> bool {
        matches!(self, AppError::AlreadyRegistered { .. })
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::StoreUnavailable(String)
