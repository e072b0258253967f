//! Concurrent access to one queue

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use waitroom_core::application::QueueService;
use waitroom_core::port::time_provider::SystemTimeProvider;
use waitroom_core::port::OrderedStore;
use waitroom_core::AppError;
use waitroom_infra_sqlite::{create_pool, run_migrations, SqliteOrderedStore};

async fn setup() -> (Arc<QueueService>, Arc<SqliteOrderedStore>) {
    let pool = create_pool(":memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let store = Arc::new(SqliteOrderedStore::new(pool));
    let queues = Arc::new(QueueService::new(store.clone(), Arc::new(SystemTimeProvider)));
    (queues, store)
}

/// Concurrent registrations all land in the wait structure
#[tokio::test]
async fn test_concurrent_register_all_waiting() {
    let (queues, _) = setup().await;

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let queues = queues.clone();
            tokio::spawn(async move { queues.register("default", &i.to_string()).await })
        })
        .collect();

    for handle in handles {
        let rank = handle.await.unwrap().unwrap().expect("still waiting");
        assert!((1..=20).contains(&rank));
    }

    assert_eq!(queues.stats("default").await.unwrap().waiting, 20);
}

/// Only one of several racing registrations for the same user succeeds
#[tokio::test]
async fn test_concurrent_duplicate_register() {
    let (queues, _) = setup().await;

    let results = join_all((0..5).map(|_| queues.register("default", "42"))).await;

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::AlreadyRegistered { .. })))
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(conflicts, 4);
}

/// Racing admissions never hand the same user out twice
#[tokio::test]
async fn test_concurrent_pop_no_duplicates() {
    let (queues, store) = setup().await;

    for i in 0..10 {
        queues.register("default", &format!("u{i}")).await.unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.pop_lowest("users:queue:default:wait", 3).await })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for member in handle.await.unwrap().unwrap() {
            assert!(seen.insert(member.clone()), "{member} popped twice");
        }
    }

    assert_eq!(seen.len(), 10);
    assert_eq!(queues.stats("default").await.unwrap().waiting, 0);
}

#[tokio::test]
async fn test_concurrent_admit_batches_account_for_everyone() {
    let (queues, _) = setup().await;

    for i in 0..7 {
        queues.register("default", &format!("u{i}")).await.unwrap();
    }

    let admitted: u64 = join_all((0..3).map(|_| queues.admit_batch("default", 3)))
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .sum();

    assert_eq!(admitted, 7);
    let stats = queues.stats("default").await.unwrap();
    assert_eq!(stats.waiting, 0);
    assert_eq!(stats.admitted, 7);
}
