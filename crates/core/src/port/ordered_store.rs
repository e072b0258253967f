// Ordered Store Port (Interface)

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Score-ordered sets addressed by key, provided by an external store.
///
/// Members are unique per key and ordered ascending by score; members with
/// equal scores keep insertion order. A key exists only while it has members.
/// Implementations do not retry: transport failures surface as
/// `AppError::StoreUnavailable`.
#[async_trait]
pub trait OrderedStore: Send + Sync {
    /// Add `member` with `score` unless already present.
    ///
    /// Returns true if inserted, false if the member was already there
    /// (its score is left untouched).
    async fn insert_if_absent(&self, key: &str, member: &str, score: i64) -> Result<bool>;

    /// Add `member`, or overwrite its score if already present.
    ///
    /// An overwritten member counts as newly inserted for tie-breaking.
    async fn upsert(&self, key: &str, member: &str, score: i64) -> Result<()>;

    /// 0-based ascending rank of `member`, `None` if absent
    async fn rank_of(&self, key: &str, member: &str) -> Result<Option<u64>>;

    /// Atomically remove and return up to `count` lowest-scored members, lowest first
    async fn pop_lowest(&self, key: &str, count: u64) -> Result<Vec<String>>;

    /// Number of members under `key` (0 if the key does not exist)
    async fn cardinality(&self, key: &str) -> Result<u64>;

    /// Lazily enumerate keys matching a glob pattern (`*`, `?`, `[...]`).
    ///
    /// No ordering guarantee. Each call starts a fresh enumeration.
    fn scan_keys<'a>(&'a self, pattern: &'a str) -> BoxStream<'a, Result<String>>;
}
