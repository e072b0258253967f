// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod queue;
pub mod scheduler;
mod shutdown;

// Re-exports
pub use queue::QueueService;
pub use scheduler::{AdmissionScheduler, QueueOutcome, SchedulerConfig, SchedulerState, TickReport};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
