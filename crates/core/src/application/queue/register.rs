// Register Use Case

use crate::domain::{validate_queue_name, validate_user_id, wait_key};
use crate::error::{AppError, Result};
use crate::port::{OrderedStore, TimeProvider};
use tracing::debug;

/// Execute register use case
///
/// Inserts `user_id` into the wait structure of `queue`, scored by the current
/// second, and returns its 1-based rank.
///
/// # Errors
///
/// * `AppError::AlreadyRegistered` - the user is already waiting; nothing changed
/// * `AppError::StoreUnavailable` - store failure, not retried
///
/// The rank is `None` only if the scheduler admitted the user between the
/// insert and the rank lookup.
pub async fn execute(
    store: &dyn OrderedStore,
    time_provider: &dyn TimeProvider,
    queue: &str,
    user_id: &str,
) -> Result<Option<u64>> {
    validate_queue_name(queue)?;
    validate_user_id(user_id)?;

    let key = wait_key(queue);
    let score = time_provider.now_secs();

    let inserted = store.insert_if_absent(&key, user_id, score).await?;
    if !inserted {
        return Err(AppError::AlreadyRegistered {
            queue: queue.to_string(),
            user_id: user_id.to_string(),
        });
    }

    let rank = store.rank_of(&key, user_id).await?.map(|r| r + 1);

    debug!(queue = %queue, user_id = %user_id, score = score, rank = ?rank, "User registered");

    Ok(rank)
}
