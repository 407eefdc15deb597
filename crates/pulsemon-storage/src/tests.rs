use crate::{MetricStore, SampleWindow, StoreError};
use chrono::{Duration, Utc};
use pulsemon_common::types::SamplePayload;
use std::sync::Arc;
use tempfile::TempDir;

const LIMIT: u64 = 10;

async fn setup() -> (TempDir, MetricStore) {
    pulsemon_common::id::init(1, 1);
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("pulsemon.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    let store = MetricStore::connect(&url).await.unwrap();
    (dir, store)
}

fn payload(cpu: f64, mem: f64, total: i64, used: i64) -> SamplePayload {
    SamplePayload {
        cpu_usage: cpu,
        memory_usage: mem,
        memory_total: total,
        memory_used: used,
        timestamp: None,
    }
}

#[tokio::test]
async fn register_mints_unique_api_keys() {
    let (_dir, store) = setup().await;

    let (a, key_a) = store.register_target("acct-1", "web-01", LIMIT).await.unwrap();
    let (b, key_b) = store.register_target("acct-1", "web-02", LIMIT).await.unwrap();

    assert_ne!(key_a, key_b);
    assert_ne!(a.id, b.id);
    assert!(a.last_seen.is_none());

    let resolved = store.resolve_api_key(&key_a).await.unwrap();
    assert_eq!(resolved.id, a.id);
}

#[tokio::test]
async fn resolve_unknown_key_fails() {
    let (_dir, store) = setup().await;
    let err = store.resolve_api_key("no-such-key").await.unwrap_err();
    assert!(matches!(err, StoreError::CredentialUnknown));
}

#[tokio::test]
async fn ingest_reflects_in_latest_and_updates_liveness() {
    let (_dir, store) = setup().await;
    let (target, _key) = store.register_target("acct-1", "web-01", LIMIT).await.unwrap();

    let stored = store
        .ingest_sample(
            &target.id,
            &payload(45.2, 60.1, 8_000_000_000, 4_808_000_000),
            Some("10.0.0.7"),
        )
        .await
        .unwrap();
    assert!(!stored.id.is_empty());
    assert_eq!(stored.cpu_usage, 45.2);

    let latest = store.latest_sample(&target.id).await.unwrap().unwrap();
    assert_eq!(latest.id, stored.id);

    let refreshed = store.get_target(&target.id).await.unwrap();
    assert!(refreshed.last_seen.is_some());
    assert_eq!(refreshed.source_address.as_deref(), Some("10.0.0.7"));
}

#[tokio::test]
async fn latest_is_absent_before_first_sample() {
    let (_dir, store) = setup().await;
    let (target, _key) = store.register_target("acct-1", "web-01", LIMIT).await.unwrap();
    assert!(store.latest_sample(&target.id).await.unwrap().is_none());
}

#[tokio::test]
async fn second_sample_becomes_latest() {
    let (_dir, store) = setup().await;
    let (target, _key) = store.register_target("acct-1", "web-01", LIMIT).await.unwrap();

    let t0 = Utc::now() - Duration::seconds(60);
    let mut first = payload(45.2, 60.1, 8_000_000_000, 4_808_000_000);
    first.timestamp = Some(t0);
    store.ingest_sample(&target.id, &first, None).await.unwrap();

    let mut second = payload(90.0, 60.1, 8_000_000_000, 4_808_000_000);
    second.timestamp = Some(t0 + Duration::seconds(60));
    store.ingest_sample(&target.id, &second, None).await.unwrap();

    let latest = store.latest_sample(&target.id).await.unwrap().unwrap();
    assert_eq!(latest.cpu_usage, 90.0);

    // Window covering both, newest first
    let window = SampleWindow {
        from: Some(t0),
        to: Some(t0 + Duration::seconds(60)),
    };
    let samples = store.query_samples(&target.id, &window).await.unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].cpu_usage, 90.0);
    assert_eq!(samples[1].cpu_usage, 45.2);
}

#[tokio::test]
async fn window_bounds_are_inclusive() {
    let (_dir, store) = setup().await;
    let (target, _key) = store.register_target("acct-1", "web-01", LIMIT).await.unwrap();

    let base = Utc::now() - Duration::minutes(10);
    for offset in [0, 60, 120, 180] {
        let mut p = payload(offset as f64 / 2.0, 50.0, 100, 50);
        p.timestamp = Some(base + Duration::seconds(offset));
        store.ingest_sample(&target.id, &p, None).await.unwrap();
    }

    let window = SampleWindow {
        from: Some(base + Duration::seconds(60)),
        to: Some(base + Duration::seconds(120)),
    };
    let samples = store.query_samples(&target.id, &window).await.unwrap();
    assert_eq!(samples.len(), 2);
    assert!(samples[0].timestamp >= samples[1].timestamp);

    // Missing bounds leave that side open
    let from_only = SampleWindow {
        from: Some(base + Duration::seconds(120)),
        to: None,
    };
    assert_eq!(store.query_samples(&target.id, &from_only).await.unwrap().len(), 2);
    let unbounded = SampleWindow::default();
    assert_eq!(store.query_samples(&target.id, &unbounded).await.unwrap().len(), 4);
}

#[tokio::test]
async fn inverted_window_is_empty_not_an_error() {
    let (_dir, store) = setup().await;
    let (target, _key) = store.register_target("acct-1", "web-01", LIMIT).await.unwrap();
    store
        .ingest_sample(&target.id, &payload(10.0, 10.0, 100, 10), None)
        .await
        .unwrap();

    let now = Utc::now();
    let window = SampleWindow {
        from: Some(now),
        to: Some(now - Duration::hours(1)),
    };
    assert!(store.query_samples(&target.id, &window).await.unwrap().is_empty());
}

#[tokio::test]
async fn query_on_unknown_target_is_empty() {
    let (_dir, store) = setup().await;
    let samples = store
        .query_samples("missing", &SampleWindow::default())
        .await
        .unwrap();
    assert!(samples.is_empty());
}

#[tokio::test]
async fn stale_sample_does_not_move_last_seen_backward() {
    let (_dir, store) = setup().await;
    let (target, _key) = store.register_target("acct-1", "web-01", LIMIT).await.unwrap();

    let now = Utc::now();
    let mut fresh = payload(50.0, 50.0, 100, 50);
    fresh.timestamp = Some(now);
    store.ingest_sample(&target.id, &fresh, None).await.unwrap();

    let mut stale = payload(60.0, 50.0, 100, 50);
    stale.timestamp = Some(now - Duration::minutes(5));
    store.ingest_sample(&target.id, &stale, None).await.unwrap();

    // Both samples stored, but liveness stays at the newer timestamp
    assert_eq!(store.count_samples(&target.id).await.unwrap(), 2);
    let refreshed = store.get_target(&target.id).await.unwrap();
    let seen = refreshed.last_seen.unwrap().with_timezone(&Utc);
    assert_eq!(seen.timestamp_millis(), now.timestamp_millis());
}

#[tokio::test]
async fn ingest_for_missing_target_writes_nothing() {
    let (_dir, store) = setup().await;
    let err = store
        .ingest_sample("missing", &payload(10.0, 10.0, 100, 10), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::TargetNotFound(_)));
    assert_eq!(store.count_samples("missing").await.unwrap(), 0);
}

#[tokio::test]
async fn registration_limit_is_enforced() {
    let (_dir, store) = setup().await;

    for i in 0..LIMIT {
        store
            .register_target("acct-1", &format!("srv-{i}"), LIMIT)
            .await
            .unwrap();
    }

    let err = store
        .register_target("acct-1", "one-too-many", LIMIT)
        .await
        .unwrap_err();
    match err {
        StoreError::TargetLimitExceeded { current, limit } => {
            assert_eq!(current, LIMIT);
            assert_eq!(limit, LIMIT);
        }
        other => panic!("expected TargetLimitExceeded, got {other:?}"),
    }

    // A different owner is unaffected
    store.register_target("acct-2", "srv-0", LIMIT).await.unwrap();
}

#[tokio::test]
async fn concurrent_registration_never_overshoots_limit() {
    let (_dir, store) = setup().await;
    let store = Arc::new(store);

    let attempts: Vec<_> = (0..(LIMIT + 5))
        .map(|i| {
            let store = Arc::clone(&store);
            async move {
                store
                    .register_target("acct-1", &format!("racer-{i}"), LIMIT)
                    .await
            }
        })
        .collect();
    let results = futures::future::join_all(attempts).await;

    let successes = results.iter().filter(|r| r.is_ok()).count() as u64;
    assert!(successes <= LIMIT, "created {successes} targets, limit {LIMIT}");
    assert!(store.count_targets_for_owner("acct-1").await.unwrap() <= LIMIT);
}

#[tokio::test]
async fn remove_target_cascades_to_samples() {
    let (_dir, store) = setup().await;
    let (target, _key) = store.register_target("acct-1", "web-01", LIMIT).await.unwrap();
    store
        .ingest_sample(&target.id, &payload(10.0, 10.0, 100, 10), None)
        .await
        .unwrap();

    store.remove_target(&target.id).await.unwrap();

    assert!(matches!(
        store.get_target(&target.id).await.unwrap_err(),
        StoreError::TargetNotFound(_)
    ));
    assert!(store
        .query_samples(&target.id, &SampleWindow::default())
        .await
        .unwrap()
        .is_empty());

    // Removing twice reports not-found
    assert!(matches!(
        store.remove_target(&target.id).await.unwrap_err(),
        StoreError::TargetNotFound(_)
    ));
}

#[tokio::test]
async fn prune_deletes_only_old_samples() {
    let (_dir, store) = setup().await;
    let (target, _key) = store.register_target("acct-1", "web-01", LIMIT).await.unwrap();

    let now = Utc::now();
    for minutes_ago in [120, 90, 10, 0] {
        let mut p = payload(20.0, 20.0, 100, 20);
        p.timestamp = Some(now - Duration::minutes(minutes_ago));
        store.ingest_sample(&target.id, &p, None).await.unwrap();
    }

    let removed = store
        .prune_samples_before(now - Duration::minutes(60))
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(store.count_samples(&target.id).await.unwrap(), 2);
}

#[tokio::test]
async fn rename_target_keeps_key_and_samples() {
    let (_dir, store) = setup().await;
    let (target, key) = store.register_target("acct-1", "web-01", LIMIT).await.unwrap();
    store
        .ingest_sample(&target.id, &payload(10.0, 10.0, 100, 10), None)
        .await
        .unwrap();

    let renamed = store.rename_target(&target.id, "web-east-01").await.unwrap();
    assert_eq!(renamed.name, "web-east-01");
    assert_eq!(renamed.api_key, key);
    assert_eq!(store.count_samples(&target.id).await.unwrap(), 1);
}
