//! Integration Tests for the cache and its collaborators
//!
//! Drives the mock database repository through the public API: cached
//! static lookups, invalidating updates, manual dynamic caching and TTL.

use std::sync::Arc;
use std::time::{Duration, Instant};

use memo_cache::mock_db::{dynamic_data_key, MockDatabase, Repository, STATIC_DATA_KEY};
use memo_cache::{Config, ManualClock, TtlCache};

const LATENCY: Duration = Duration::from_millis(300);

// == Helper Functions ==

fn create_repo() -> Repository {
    let db = Arc::new(MockDatabase::new(LATENCY));
    Repository::new(db, TtlCache::new())
}

fn create_repo_with_clock() -> (Repository, ManualClock) {
    let clock = ManualClock::starting_now();
    let cache = TtlCache::with_clock(&Config::default(), Arc::new(clock.clone()));
    let db = Arc::new(MockDatabase::new(LATENCY));
    (Repository::new(db, cache), clock)
}

// == Static Data ==

#[tokio::test]
async fn test_get_static_data() {
    let repo = create_repo();

    let result = repo.get_static_data().await.unwrap();
    assert_eq!(result, "static_data");
    assert_eq!(
        repo.cache().get(STATIC_DATA_KEY).as_deref(),
        Some("static_data")
    );

    let start = Instant::now();
    let result = repo.get_static_data().await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result, "static_data");
    assert!(elapsed < LATENCY, "cached read took {:?}", elapsed);
    assert_eq!(repo.db().reads(), 1);
}

#[tokio::test]
async fn test_update_static_data() {
    let repo = create_repo();

    repo.get_static_data().await.unwrap();
    repo.update_static_data().await.unwrap();

    assert_eq!(repo.cache().get(STATIC_DATA_KEY), None);

    let start = Instant::now();
    let result = repo.get_static_data().await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result, "static_data");
    assert!(elapsed >= LATENCY, "refetch took only {:?}", elapsed);
    assert_eq!(repo.db().reads(), 2);
    assert_eq!(repo.db().writes(), 1);
}

#[tokio::test]
async fn test_update_static_data_never_populates() {
    let repo = create_repo();

    for _ in 0..2 {
        assert_eq!(
            repo.update_static_data().await.unwrap(),
            "updated static_data"
        );
        assert_eq!(repo.cache().get(STATIC_DATA_KEY), None);
    }

    assert_eq!(repo.db().writes(), 2);
    assert!(!repo.cache().contains_key(STATIC_DATA_KEY));
}

// == Dynamic Data ==

#[tokio::test]
async fn test_get_dynamic_data() {
    let repo = create_repo();
    let id = "17";

    let result = repo.get_dynamic_data(id).await.unwrap();
    assert_eq!(result, "dynamic data 17");
    assert_eq!(
        repo.cache().get(&dynamic_data_key(id)).as_deref(),
        Some("dynamic data 17")
    );

    let start = Instant::now();
    let result = repo.get_dynamic_data(id).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result, "dynamic data 17");
    assert!(elapsed < LATENCY, "cached read took {:?}", elapsed);
    assert_eq!(repo.db().reads(), 1);
}

#[tokio::test]
async fn test_update_dynamic_data() {
    let repo = create_repo();
    let id = "23";

    repo.get_dynamic_data(id).await.unwrap();
    repo.update_dynamic_data(id).await.unwrap();

    assert_eq!(repo.cache().get(&dynamic_data_key(id)), None);

    let start = Instant::now();
    let result = repo.get_dynamic_data(id).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result, "dynamic data 23");
    assert!(elapsed >= LATENCY, "refetch took only {:?}", elapsed);
    assert_eq!(repo.db().reads(), 2);
}

#[tokio::test]
async fn test_dynamic_data_ttl() {
    let (repo, clock) = create_repo_with_clock();
    let id = "5";

    repo.get_dynamic_data(id).await.unwrap();
    assert!(repo.cache().get(&dynamic_data_key(id)).is_some());

    clock.advance(Duration::from_secs(10));
    assert_eq!(repo.cache().get(&dynamic_data_key(id)), None);
    // Lazy expiry: the slot is still there
    assert!(repo.cache().contains_key(&dynamic_data_key(id)));

    let start = Instant::now();
    let result = repo.get_dynamic_data(id).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result, "dynamic data 5");
    assert!(elapsed >= LATENCY, "refetch took only {:?}", elapsed);
    assert_eq!(repo.db().reads(), 2);
}

#[tokio::test]
async fn test_dynamic_ids_are_independent() {
    let repo = create_repo();

    repo.get_dynamic_data("1").await.unwrap();
    repo.get_dynamic_data("2").await.unwrap();
    repo.update_dynamic_data("1").await.unwrap();

    assert_eq!(repo.cache().get(&dynamic_data_key("1")), None);
    assert_eq!(
        repo.cache().get(&dynamic_data_key("2")).as_deref(),
        Some("dynamic data 2")
    );
}

// == Clear ==

#[tokio::test]
async fn test_clear_forces_refetch() {
    let repo = create_repo();

    repo.get_static_data().await.unwrap();
    repo.get_dynamic_data("9").await.unwrap();
    repo.cache().clear();

    assert!(repo.cache().is_empty());
    repo.get_static_data().await.unwrap();
    repo.get_dynamic_data("9").await.unwrap();
    assert_eq!(repo.db().reads(), 4);
}

// == Concurrency ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_share_cache() {
    let repo = create_repo();
    repo.get_static_data().await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.get_static_data().await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "static_data");
    }

    assert_eq!(repo.db().reads(), 1);
    assert_eq!(repo.cache().stats().hits, 16);
}
