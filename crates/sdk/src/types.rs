//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from api-rpc crate.

use serde::{Deserialize, Serialize};

/// Rank value meaning "not in the wait structure"
pub const RANK_NOT_PRESENT: i64 = -1;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UserRequest<'a> {
    pub queue: &'a str,
    pub user_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AllowRequest<'a> {
    pub queue: &'a str,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub queue: &'a str,
    pub user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatsRequest<'a> {
    pub queue: &'a str,
}

/// Response from register
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub rank: i64,
}

/// Response from a manual batch admission
#[derive(Debug, Clone, Deserialize)]
pub struct AllowResponse {
    pub requested_count: u64,
    pub allowed_count: u64,
}

/// Response from the admitted-set check
#[derive(Debug, Clone, Deserialize)]
pub struct AdmittedResponse {
    pub admitted: bool,
}

/// Response from token verification
#[derive(Debug, Clone, Deserialize)]
pub struct AllowedResponse {
    pub allowed: bool,
}

/// Response from rank lookup
#[derive(Debug, Clone, Deserialize)]
pub struct RankResponse {
    /// 1-based rank, [`RANK_NOT_PRESENT`] if not waiting
    pub rank: i64,
}

impl RankResponse {
    pub fn position(&self) -> Option<u64> {
        u64::try_from(self.rank).ok().filter(|r| *r > 0)
    }
}

/// Issued token and its credential binding
#[derive(Debug, Clone, Deserialize)]
pub struct TouchResponse {
    pub token: String,
    pub cookie_name: String,
    pub max_age_secs: u64,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Admitted,
    Waiting,
}

/// Response from a waiting-room visit
#[derive(Debug, Clone, Deserialize)]
pub struct EnterResponse {
    pub queue: String,
    pub user_id: String,
    pub status: EntryStatus,
    #[serde(default)]
    pub rank: Option<u64>,
}

/// Queue sizes
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub queue: String,
    pub waiting: u64,
    pub admitted: u64,
    pub uptime_seconds: i64,
}
