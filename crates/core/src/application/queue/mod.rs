// Queue Service - Core use cases for the waiting room

pub mod admit;
pub mod register;

use crate::domain::{
    proceed_key, validate_queue_name, validate_user_id, wait_key, EntryDecision, QueueStats,
    TokenBinding, TokenGenerator,
};
use crate::error::Result;
use crate::port::{OrderedStore, TimeProvider};
use std::sync::Arc;
use tracing::debug;

/// Queue Service
///
/// Stateless facade over the ordered store: every answer comes from current
/// store state, so one instance is shared by all requests and the scheduler.
pub struct QueueService {
    store: Arc<dyn OrderedStore>,
    time_provider: Arc<dyn TimeProvider>,
    tokens: TokenGenerator,
}

impl QueueService {
    pub fn new(store: Arc<dyn OrderedStore>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            store,
            time_provider,
            tokens: TokenGenerator::new(),
        }
    }

    /// Register a user, returning the 1-based rank
    pub async fn register(&self, queue: &str, user_id: &str) -> Result<Option<u64>> {
        register::execute(
            self.store.as_ref(),
            self.time_provider.as_ref(),
            queue,
            user_id,
        )
        .await
    }

    /// Move up to `count` waiting users to the admitted set
    pub async fn admit_batch(&self, queue: &str, count: u64) -> Result<u64> {
        admit::execute(
            self.store.as_ref(),
            self.time_provider.as_ref(),
            queue,
            count,
        )
        .await
    }

    /// True if the user is in the admitted set
    pub async fn is_admitted(&self, queue: &str, user_id: &str) -> Result<bool> {
        validate_queue_name(queue)?;
        validate_user_id(user_id)?;

        let rank = self.store.rank_of(&proceed_key(queue), user_id).await?;
        Ok(rank.is_some())
    }

    /// 1-based rank in the wait structure, `None` if not waiting
    pub async fn rank(&self, queue: &str, user_id: &str) -> Result<Option<u64>> {
        validate_queue_name(queue)?;
        validate_user_id(user_id)?;

        let rank = self.store.rank_of(&wait_key(queue), user_id).await?;
        Ok(rank.map(|r| r + 1))
    }

    /// Mint the admission token for `(queue, user_id)`
    pub fn issue_token(&self, queue: &str, user_id: &str) -> TokenBinding {
        self.tokens.bind(queue, user_id)
    }

    /// True if `token` is what [`issue_token`](Self::issue_token) returns for the pair.
    ///
    /// Does not consult the admitted set.
    pub fn verify_token(&self, queue: &str, user_id: &str, token: &str) -> bool {
        self.tokens.verify(queue, user_id, token)
    }

    /// Waiting-room visit: pass a verified token through, otherwise register
    /// the user (or look up the rank if already waiting).
    pub async fn enter(
        &self,
        queue: &str,
        user_id: &str,
        token: Option<&str>,
    ) -> Result<EntryDecision> {
        validate_queue_name(queue)?;
        validate_user_id(user_id)?;

        if token.is_some_and(|t| self.verify_token(queue, user_id, t)) {
            debug!(queue = %queue, user_id = %user_id, "Token accepted");
            return Ok(EntryDecision::Admitted);
        }

        let rank = match self.register(queue, user_id).await {
            Ok(rank) => rank,
            Err(e) if e.is_already_registered() => self.rank(queue, user_id).await?,
            Err(e) => return Err(e),
        };

        Ok(EntryDecision::Waiting { rank })
    }

    /// Member counts of the wait and admitted structures
    pub async fn stats(&self, queue: &str) -> Result<QueueStats> {
        validate_queue_name(queue)?;

        let waiting = self.store.cardinality(&wait_key(queue)).await?;
        let admitted = self.store.cardinality(&proceed_key(queue)).await?;

        Ok(QueueStats { waiting, admitted })
    }
}
