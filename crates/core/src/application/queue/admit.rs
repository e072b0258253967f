// Admit Batch Use Case

use crate::domain::{proceed_key, validate_queue_name, wait_key};
use crate::error::Result;
use crate::port::{OrderedStore, TimeProvider};
use tracing::debug;

/// Execute admit-batch use case
///
/// Pops up to `count` lowest-scored users from the wait structure and adds
/// them to the proceed structure, scored by the current second. Users are
/// added in their wait order. Returns the number moved.
///
/// The pop and the inserts are separate store commands: a failure after the
/// pop is returned to the caller and the members already popped but not yet
/// inserted are not restored.
pub async fn execute(
    store: &dyn OrderedStore,
    time_provider: &dyn TimeProvider,
    queue: &str,
    count: u64,
) -> Result<u64> {
    validate_queue_name(queue)?;

    if count == 0 {
        return Ok(0);
    }

    let popped = store.pop_lowest(&wait_key(queue), count).await?;
    if popped.is_empty() {
        return Ok(0);
    }

    let admitted_at = time_provider.now_secs();
    let proceed = proceed_key(queue);
    for user_id in &popped {
        store.upsert(&proceed, user_id, admitted_at).await?;
    }

    debug!(
        queue = %queue,
        requested = count,
        admitted = popped.len(),
        "Batch admitted"
    );

    Ok(popped.len() as u64)
}
