//! End-to-end: JSON-RPC server on an ephemeral port driven through the SDK

use std::sync::Arc;
use waitroom_api_rpc::server::RunningServer;
use waitroom_api_rpc::{RpcServer, RpcServerConfig};
use waitroom_core::application::QueueService;
use waitroom_core::port::time_provider::SystemTimeProvider;
use waitroom_infra_sqlite::{create_pool, run_migrations, SqliteOrderedStore};
use waitroom_sdk::{EntryStatus, WaitroomClient};

async fn start() -> (RunningServer, WaitroomClient) {
    let pool = create_pool(":memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let queues = Arc::new(QueueService::new(
        Arc::new(SqliteOrderedStore::new(pool)),
        Arc::new(SystemTimeProvider),
    ));
    let config = RpcServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let running = RpcServer::new(config, queues).start().await.unwrap();

    let client = WaitroomClient::connect(format!("http://{}", running.local_addr))
        .await
        .unwrap();
    (running, client)
}

#[tokio::test]
async fn test_register_allow_rank_over_rpc() {
    let (running, client) = start().await;

    for (user, expected) in [("A", 1), ("B", 2), ("C", 3)] {
        assert_eq!(client.register("default", user).await.unwrap().rank, expected);
    }

    let allowed = client.allow("default", 2).await.unwrap();
    assert_eq!(allowed.requested_count, 2);
    assert_eq!(allowed.allowed_count, 2);

    assert_eq!(client.rank("default", "A").await.unwrap().position(), None);
    assert_eq!(client.rank("default", "A").await.unwrap().rank, -1);
    assert_eq!(client.rank("default", "C").await.unwrap().position(), Some(1));
    assert!(client.is_admitted("default", "B").await.unwrap());
    assert!(!client.is_admitted("default", "C").await.unwrap());

    running.handle.stop().unwrap();
}

#[tokio::test]
async fn test_duplicate_register_surfaces_conflict() {
    let (running, client) = start().await;

    client.register("default", "42").await.unwrap();
    let err = client.register("default", "42").await.unwrap_err();

    assert!(err.is_already_registered(), "unexpected error: {err}");
    assert_eq!(client.rank("default", "42").await.unwrap().rank, 1);

    running.handle.stop().unwrap();
}

#[tokio::test]
async fn test_touch_verify_and_enter() {
    let (running, client) = start().await;

    let waiting = client.enter("default", "7", None).await.unwrap();
    assert_eq!(waiting.status, EntryStatus::Waiting);
    assert_eq!(waiting.rank, Some(1));

    client.allow("default", 1).await.unwrap();
    assert!(client.is_admitted("default", "7").await.unwrap());

    let binding = client.touch("default", "7").await.unwrap();
    assert_eq!(binding.cookie_name, "user-queue-default-token");
    assert_eq!(binding.max_age_secs, 300);
    assert_eq!(binding.path, "/");
    assert_eq!(binding.token.len(), 64);

    assert!(client.verify_token("default", "7", &binding.token).await.unwrap());
    assert!(!client.verify_token("default", "8", &binding.token).await.unwrap());

    let entered = client
        .enter("default", "7", Some(&binding.token))
        .await
        .unwrap();
    assert_eq!(entered.status, EntryStatus::Admitted);
    assert_eq!(entered.user_id, "7");

    running.handle.stop().unwrap();
}

#[tokio::test]
async fn test_stats_and_validation_over_rpc() {
    let (running, client) = start().await;

    client.register("vip", "1").await.unwrap();
    client.register("vip", "2").await.unwrap();
    client.allow("vip", 1).await.unwrap();

    let stats = client.stats("vip").await.unwrap();
    assert_eq!(stats.queue, "vip");
    assert_eq!(stats.waiting, 1);
    assert_eq!(stats.admitted, 1);

    let err = client.register("no spaces", "1").await.unwrap_err();
    assert!(matches!(err, waitroom_sdk::SdkError::Rpc { code: 4000, .. }));

    running.handle.stop().unwrap();
}
