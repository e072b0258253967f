//! RPC Method Handlers
//!
//! Thin adapters from wire types to `QueueService` calls.

use crate::error::to_rpc_error;
use crate::types::{
    wire_rank, AdmittedRequest, AdmittedResponse, AllowRequest, AllowResponse, AllowedRequest,
    AllowedResponse, EnterRequest, EnterResponse, RankRequest, RankResponse, RegisterRequest,
    RegisterResponse, StatsRequest, StatsResponse, TouchRequest, TouchResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use waitroom_core::application::QueueService;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    queues: Arc<QueueService>,
    start_time: Instant,
}

impl RpcHandler {
    pub fn new(queues: Arc<QueueService>) -> Self {
        Self {
            queues,
            start_time: Instant::now(),
        }
    }

    /// queue.register.v1
    ///
    /// A second registration fails with `ALREADY_REGISTERED`; callers fall
    /// back to `queue.rank.v1`.
    pub async fn register(
        &self,
        params: RegisterRequest,
    ) -> Result<RegisterResponse, ErrorObjectOwned> {
        let rank = self
            .queues
            .register(&params.queue, &params.user_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(RegisterResponse {
            rank: wire_rank(rank),
        })
    }

    /// queue.allow.v1
    pub async fn allow(&self, params: AllowRequest) -> Result<AllowResponse, ErrorObjectOwned> {
        let allowed = self
            .queues
            .admit_batch(&params.queue, params.count)
            .await
            .map_err(to_rpc_error)?;

        info!(
            queue = %params.queue,
            requested = params.count,
            allowed = allowed,
            "Manual admission"
        );

        Ok(AllowResponse {
            requested_count: params.count,
            allowed_count: allowed,
        })
    }

    /// queue.admitted.v1
    pub async fn admitted(
        &self,
        params: AdmittedRequest,
    ) -> Result<AdmittedResponse, ErrorObjectOwned> {
        let admitted = self
            .queues
            .is_admitted(&params.queue, &params.user_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(AdmittedResponse { admitted })
    }

    /// queue.allowed.v1
    pub async fn allowed(
        &self,
        params: AllowedRequest,
    ) -> Result<AllowedResponse, ErrorObjectOwned> {
        let allowed = self.queues.verify_token(&params.queue, &params.user_id, &params.token);

        debug!(queue = %params.queue, user_id = %params.user_id, allowed, "Token checked");

        Ok(AllowedResponse { allowed })
    }

    /// queue.rank.v1
    pub async fn rank(&self, params: RankRequest) -> Result<RankResponse, ErrorObjectOwned> {
        let rank = self
            .queues
            .rank(&params.queue, &params.user_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(RankResponse {
            rank: wire_rank(rank),
        })
    }

    /// queue.touch.v1
    pub async fn touch(&self, params: TouchRequest) -> Result<TouchResponse, ErrorObjectOwned> {
        let binding = self.queues.issue_token(&params.queue, &params.user_id);

        Ok(TouchResponse {
            token: binding.token,
            cookie_name: binding.cookie_name,
            max_age_secs: binding.max_age_secs,
            path: binding.path,
        })
    }

    /// queue.enter.v1
    pub async fn enter(&self, params: EnterRequest) -> Result<EnterResponse, ErrorObjectOwned> {
        let decision = self
            .queues
            .enter(&params.queue, &params.user_id, params.token.as_deref())
            .await
            .map_err(to_rpc_error)?;

        Ok(EnterResponse {
            queue: params.queue,
            user_id: params.user_id,
            decision,
        })
    }

    /// admin.stats.v1
    pub async fn stats(&self, params: StatsRequest) -> Result<StatsResponse, ErrorObjectOwned> {
        let stats = self
            .queues
            .stats(&params.queue)
            .await
            .map_err(to_rpc_error)?;

        Ok(StatsResponse {
            queue: params.queue,
            waiting: stats.waiting,
            admitted: stats.admitted,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }
}
