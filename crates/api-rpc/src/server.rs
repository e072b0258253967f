//! JSON-RPC Server
//!
//! Serves the queue API as JSON-RPC 2.0 over HTTP/TCP.

use crate::handler::RpcHandler;
use crate::types::{
    AdmittedRequest, AllowRequest, AllowedRequest, EnterRequest, RankRequest, RegisterRequest,
    StatsRequest, TouchRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use waitroom_core::application::QueueService;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9010;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks an ephemeral port
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// Running server: bound address plus the handle used to stop it
pub struct RunningServer {
    pub local_addr: SocketAddr,
    pub handle: ServerHandle,
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

// Registers `$method`, parsing params as `$req` and dispatching to `RpcHandler::$call`
macro_rules! register_method {
    ($module:expr, $handler:expr, $method:literal, $req:ty, $call:ident) => {{
        let handler = $handler.clone();
        $module
            .register_async_method($method, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: $req = params.parse()?;
                    handler.$call(req).await
                }
            })
            .map_err(|e| e.to_string())?;
    }};
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, queues: Arc<QueueService>) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(queues)),
        }
    }

    /// Build the method table
    pub fn module(&self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());

        // Queue API
        register_method!(module, self.handler, "queue.register.v1", RegisterRequest, register);
        register_method!(module, self.handler, "queue.allow.v1", AllowRequest, allow);
        register_method!(module, self.handler, "queue.admitted.v1", AdmittedRequest, admitted);
        register_method!(module, self.handler, "queue.allowed.v1", AllowedRequest, allowed);
        register_method!(module, self.handler, "queue.rank.v1", RankRequest, rank);
        register_method!(module, self.handler, "queue.touch.v1", TouchRequest, touch);
        register_method!(module, self.handler, "queue.enter.v1", EnterRequest, enter);

        // Admin API
        register_method!(module, self.handler, "admin.stats.v1", StatsRequest, stats);

        Ok(module)
    }

    /// Start the JSON-RPC server
    pub async fn start(self) -> Result<RunningServer, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.module()?;

        info!(addr = %local_addr, "JSON-RPC server started");

        let handle = server.start(module);
        Ok(RunningServer { local_addr, handle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::core::params::ObjectParams;
    use std::sync::atomic::{AtomicI64, Ordering};
    use waitroom_core::error::Result as CoreResult;
    use waitroom_core::port::{OrderedStore, TimeProvider};

    // Minimal single-key store double; enough for dispatch tests
    #[derive(Default)]
    struct VecStore {
        members: std::sync::Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl OrderedStore for VecStore {
        async fn insert_if_absent(&self, key: &str, member: &str, _score: i64) -> CoreResult<bool> {
            let mut members = self.members.lock().unwrap();
            if members.iter().any(|(k, m)| k == key && m == member) {
                return Ok(false);
            }
            members.push((key.to_string(), member.to_string()));
            Ok(true)
        }

        async fn upsert(&self, key: &str, member: &str, score: i64) -> CoreResult<()> {
            self.insert_if_absent(key, member, score).await.map(|_| ())
        }

        async fn rank_of(&self, key: &str, member: &str) -> CoreResult<Option<u64>> {
            let members = self.members.lock().unwrap();
            Ok(members
                .iter()
                .filter(|(k, _)| k == key)
                .position(|(_, m)| m == member)
                .map(|p| p as u64))
        }

        async fn pop_lowest(&self, _key: &str, _count: u64) -> CoreResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn cardinality(&self, key: &str) -> CoreResult<u64> {
            let members = self.members.lock().unwrap();
            Ok(members.iter().filter(|(k, _)| k == key).count() as u64)
        }

        fn scan_keys<'a>(
            &'a self,
            _pattern: &'a str,
        ) -> futures::stream::BoxStream<'a, CoreResult<String>> {
            Box::pin(futures::stream::empty())
        }
    }

    struct Clock(AtomicI64);

    impl TimeProvider for Clock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn module() -> RpcModule<()> {
        let queues = Arc::new(QueueService::new(
            Arc::new(VecStore::default()),
            Arc::new(Clock(AtomicI64::new(1_700_000_000_000))),
        ));
        RpcServer::new(RpcServerConfig::default(), queues)
            .module()
            .unwrap()
    }

    fn params(pairs: &[(&str, serde_json::Value)]) -> ObjectParams {
        let mut params = ObjectParams::new();
        for (name, value) in pairs {
            params.insert(name, value).unwrap();
        }
        params
    }

    #[tokio::test]
    async fn test_register_and_rank_dispatch() {
        let module = module();

        let response: serde_json::Value = module
            .call(
                "queue.register.v1",
                params(&[("user_id", serde_json::json!(42))]),
            )
            .await
            .unwrap();
        assert_eq!(response["rank"], 1);

        let response: serde_json::Value = module
            .call("queue.rank.v1", params(&[("user_id", serde_json::json!("nobody"))]))
            .await
            .unwrap();
        assert_eq!(response["rank"], -1);
    }

    #[tokio::test]
    async fn test_duplicate_register_is_rejected() {
        let module = module();
        let args = [("user_id", serde_json::json!(42))];

        let _: serde_json::Value = module.call("queue.register.v1", params(&args)).await.unwrap();
        let err = module
            .call::<_, serde_json::Value>("queue.register.v1", params(&args))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("already registered"));
    }

    #[tokio::test]
    async fn test_touch_then_allowed() {
        let module = module();

        let touched: serde_json::Value = module
            .call("queue.touch.v1", params(&[("user_id", serde_json::json!(7))]))
            .await
            .unwrap();
        assert_eq!(touched["cookie_name"], "user-queue-default-token");
        assert_eq!(touched["max_age_secs"], 300);

        let allowed: serde_json::Value = module
            .call(
                "queue.allowed.v1",
                params(&[
                    ("user_id", serde_json::json!(7)),
                    ("token", touched["token"].clone()),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(allowed["allowed"], true);
    }
}
