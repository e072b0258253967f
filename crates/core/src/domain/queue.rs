// Queue Domain Model
//
// A queue is implicit: it exists while its wait or proceed structure holds members.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Queue identifier
pub type QueueName = String;

/// Queue used when the caller does not name one
pub const DEFAULT_QUEUE: &str = "default";

/// Pattern matching every wait structure in the store
pub const WAIT_KEY_SCAN_PATTERN: &str = "users:queue:*:wait";

const KEY_PREFIX: &str = "users:queue:";
const WAIT_SUFFIX: &str = ":wait";
const PROCEED_SUFFIX: &str = ":proceed";

const MAX_QUEUE_NAME_LEN: usize = 64;
const MAX_USER_ID_LEN: usize = 128;

/// Store key of the wait structure for `queue`
pub fn wait_key(queue: &str) -> String {
    format!("{KEY_PREFIX}{queue}{WAIT_SUFFIX}")
}

/// Store key of the admitted (proceed) structure for `queue`
pub fn proceed_key(queue: &str) -> String {
    format!("{KEY_PREFIX}{queue}{PROCEED_SUFFIX}")
}

/// Extract the queue name from a wait key (third colon-delimited segment).
///
/// Returns `None` for keys that are not wait keys.
pub fn queue_name_from_wait_key(key: &str) -> Option<&str> {
    let mut segments = key.split(':');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some("users"), Some("queue"), Some(name), Some("wait"), None) if !name.is_empty() => {
            Some(name)
        }
        _ => None,
    }
}

/// Validate a queue name.
///
/// Names are restricted to `[A-Za-z0-9_-]` so they never contain the key separator.
pub fn validate_queue_name(queue: &str) -> Result<()> {
    if queue.is_empty() {
        return Err(AppError::Validation("Queue name cannot be empty".to_string()));
    }

    if queue.len() > MAX_QUEUE_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Queue name too long: {} chars (max {})",
            queue.len(),
            MAX_QUEUE_NAME_LEN
        )));
    }

    if !queue
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::Validation(format!(
            "Queue name must be alphanumeric (plus '_' and '-'): {queue}"
        )));
    }

    Ok(())
}

/// Validate a user identifier
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() {
        return Err(AppError::Validation("User id cannot be empty".to_string()));
    }

    if user_id.len() > MAX_USER_ID_LEN {
        return Err(AppError::Validation(format!(
            "User id too long: {} chars (max {})",
            user_id.len(),
            MAX_USER_ID_LEN
        )));
    }

    if user_id.contains(':') || user_id.chars().any(char::is_control) {
        return Err(AppError::Validation(format!(
            "User id contains invalid characters: {user_id:?}"
        )));
    }

    Ok(())
}

/// Outcome of a waiting-room visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryDecision {
    /// Token verified, the user may go through
    Admitted,
    /// Still waiting at this 1-based rank (`None` if the user left the wait structure meanwhile)
    Waiting { rank: Option<u64> },
}

/// Member counts of one queue's structures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub waiting: u64,
    pub admitted: u64,
}
