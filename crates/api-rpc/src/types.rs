//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results. Params are JSON
//! objects; `queue` defaults to `"default"` and `user_id` may be sent as a
//! number or a string.

use serde::{Deserialize, Deserializer, Serialize};
use waitroom_core::domain::{EntryDecision, DEFAULT_QUEUE};

/// Wire value for "not in the wait structure"
pub const RANK_NOT_PRESENT: i64 = -1;

/// 1-based rank on the wire, [`RANK_NOT_PRESENT`] when absent
pub fn wire_rank(rank: Option<u64>) -> i64 {
    rank.map_or(RANK_NOT_PRESENT, |r| r as i64)
}

fn default_queue() -> String {
    DEFAULT_QUEUE.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserIdRepr {
    Number(i64),
    Text(String),
}

fn deserialize_user_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match UserIdRepr::deserialize(deserializer)? {
        UserIdRepr::Number(n) => n.to_string(),
        UserIdRepr::Text(s) => s,
    })
}

/// queue.register.v1 - Join the wait structure
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default = "default_queue")]
    pub queue: String,
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub rank: i64,
}

/// queue.allow.v1 - Admit a batch
#[derive(Debug, Deserialize)]
pub struct AllowRequest {
    #[serde(default = "default_queue")]
    pub queue: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllowResponse {
    pub requested_count: u64,
    pub allowed_count: u64,
}

/// queue.admitted.v1 - Is the user in the admitted set
#[derive(Debug, Deserialize)]
pub struct AdmittedRequest {
    #[serde(default = "default_queue")]
    pub queue: String,
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdmittedResponse {
    pub admitted: bool,
}

/// queue.allowed.v1 - Verify an admission token
#[derive(Debug, Deserialize)]
pub struct AllowedRequest {
    #[serde(default = "default_queue")]
    pub queue: String,
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllowedResponse {
    pub allowed: bool,
}

/// queue.rank.v1 - Current rank
#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(default = "default_queue")]
    pub queue: String,
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankResponse {
    pub rank: i64,
}

/// queue.touch.v1 - Issue the admission token
#[derive(Debug, Deserialize)]
pub struct TouchRequest {
    #[serde(default = "default_queue")]
    pub queue: String,
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TouchResponse {
    pub token: String,
    pub cookie_name: String,
    pub max_age_secs: u64,
    pub path: String,
}

/// queue.enter.v1 - Waiting-room visit
#[derive(Debug, Deserialize)]
pub struct EnterRequest {
    #[serde(default = "default_queue")]
    pub queue: String,
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnterResponse {
    pub queue: String,
    pub user_id: String,
    #[serde(flatten)]
    pub decision: EntryDecision,
}

/// admin.stats.v1 - Queue sizes
#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    #[serde(default = "default_queue")]
    pub queue: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub queue: String,
    pub waiting: u64,
    pub admitted: u64,
    pub uptime_seconds: i64,
}
