//! Admission Scheduler - Periodically admits a batch from every active queue
//!
//! A single background task: wait, scan the store for wait structures, admit
//! one batch per discovered queue, repeat. Passes never overlap because the
//! next wait starts only after the previous pass finished.
//!
//! Failures are isolated per queue: one queue's store error is logged and
//! recorded in the [`TickReport`] while the other queues are still admitted.

use crate::application::constants::{
    DEFAULT_ADMIT_BATCH_SIZE, DEFAULT_SCHEDULER_INITIAL_DELAY, DEFAULT_SCHEDULER_INTERVAL,
};
use crate::application::{QueueService, ShutdownToken};
use crate::domain::{queue_name_from_wait_key, QueueName, WAIT_KEY_SCAN_PATTERN};
use crate::port::OrderedStore;
use futures::future::join_all;
use futures::StreamExt;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Scheduler configuration, fixed at startup
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub batch_size: u64,
    pub initial_delay: Duration,
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            batch_size: DEFAULT_ADMIT_BATCH_SIZE,
            initial_delay: DEFAULT_SCHEDULER_INITIAL_DELAY,
            interval: DEFAULT_SCHEDULER_INTERVAL,
        }
    }
}

/// Lifecycle state. Decided once at construction and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Disabled,
    Running,
}

/// Result of one queue's admission attempt within a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueOutcome {
    Admitted(u64),
    Failed(String),
}

/// Summary of one scan-and-admit pass
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub outcomes: BTreeMap<QueueName, QueueOutcome>,
    /// Set when the key scan broke off; `outcomes` covers the queues found before it
    pub scan_error: Option<String>,
}

impl TickReport {
    pub fn total_admitted(&self) -> u64 {
        self.outcomes
            .values()
            .map(|o| match o {
                QueueOutcome::Admitted(n) => *n,
                QueueOutcome::Failed(_) => 0,
            })
            .sum()
    }

    pub fn failed_queues(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, QueueOutcome::Failed(_)))
            .map(|(q, _)| q.as_str())
            .collect()
    }
}

/// Admission scheduler
pub struct AdmissionScheduler {
    queues: Arc<QueueService>,
    store: Arc<dyn OrderedStore>,
    config: SchedulerConfig,
}

impl AdmissionScheduler {
    /// # Arguments
    /// * `queues` - Queue service performing the admissions
    /// * `store` - Store scanned for active wait structures
    /// * `config` - Enable switch, batch size and timing
    pub fn new(
        queues: Arc<QueueService>,
        store: Arc<dyn OrderedStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            queues,
            store,
            config,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.config.enabled {
            SchedulerState::Running
        } else {
            SchedulerState::Disabled
        }
    }

    /// Run the admission loop (background task)
    ///
    /// Returns immediately when disabled; otherwise runs until `shutdown` fires.
    /// Should be spawned in tokio::spawn
    pub async fn run(self, mut shutdown: ShutdownToken) {
        if self.state() == SchedulerState::Disabled {
            info!("Admission scheduler disabled, users are admitted only on request");
            return;
        }

        info!(
            batch_size = self.config.batch_size,
            initial_delay_ms = self.config.initial_delay.as_millis() as u64,
            interval_ms = self.config.interval.as_millis() as u64,
            "Admission scheduler started"
        );

        let mut delay = self.config.initial_delay;
        loop {
            tokio::select! {
                _ = shutdown.wait() => {
                    info!("Admission scheduler stopped");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let report = self.tick().await;
            debug!(
                queues = report.outcomes.len(),
                admitted = report.total_admitted(),
                failed = report.failed_queues().len(),
                "Admission pass finished"
            );

            delay = self.config.interval;
        }
    }

    /// One scan-and-admit pass over every queue with waiting users
    pub async fn tick(&self) -> TickReport {
        let (queues, scan_error) = self.discover_queues().await;
        let batch_size = self.config.batch_size;

        let attempts = queues.into_iter().map(|queue| async move {
            let outcome = match self.queues.admit_batch(&queue, batch_size).await {
                Ok(admitted) => {
                    info!(
                        queue = %queue,
                        tried = batch_size,
                        allowed = admitted,
                        "Tried {} and allowed {} members of {} queue",
                        batch_size,
                        admitted,
                        queue
                    );
                    QueueOutcome::Admitted(admitted)
                }
                Err(e) => {
                    error!(queue = %queue, error = ?e, "Batch admission failed");
                    QueueOutcome::Failed(e.to_string())
                }
            };
            (queue, outcome)
        });

        TickReport {
            outcomes: join_all(attempts).await.into_iter().collect(),
            scan_error,
        }
    }

    /// Queue names of all wait structures, deduplicated
    async fn discover_queues(&self) -> (BTreeSet<QueueName>, Option<String>) {
        let mut keys = self.store.scan_keys(WAIT_KEY_SCAN_PATTERN);
        let mut queues = BTreeSet::new();

        while let Some(next) = keys.next().await {
            match next {
                Ok(key) => match queue_name_from_wait_key(&key) {
                    Some(name) => {
                        queues.insert(name.to_string());
                    }
                    None => warn!(key = %key, "Skipping key that is not a wait structure"),
                },
                Err(e) => {
                    error!(error = ?e, "Queue discovery scan failed");
                    return (queues, Some(e.to_string()));
                }
            }
        }

        (queues, None)
    }
}
