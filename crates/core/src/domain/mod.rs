// Domain Layer - Pure business logic and entities

pub mod queue;
pub mod token;

// Re-exports
pub use queue::{
    proceed_key, queue_name_from_wait_key, validate_queue_name, validate_user_id, wait_key,
    EntryDecision, QueueName, QueueStats, DEFAULT_QUEUE, WAIT_KEY_SCAN_PATTERN,
};
pub use token::{TokenBinding, TokenGenerator};
