// Application constants (No magic values)
use std::time::Duration;

/// Members admitted per queue on each scheduler pass
pub const DEFAULT_ADMIT_BATCH_SIZE: u64 = 100;

/// Delay before the first scheduler pass after startup (5s)
pub const DEFAULT_SCHEDULER_INITIAL_DELAY: Duration = Duration::from_secs(5);

/// Delay between the end of one scheduler pass and the start of the next (10s)
pub const DEFAULT_SCHEDULER_INTERVAL: Duration = Duration::from_secs(10);
