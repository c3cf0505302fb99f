//! Mock Database Module
//!
//! A stand-in for a slow backing store, plus a repository that fronts it
//! with the cache. Used by the demo binary and the integration tests.
//!
//! Static data lives under one fixed key and is cached with a wrapped
//! producer; dynamic data is keyed by id and cached by hand with `get`,
//! `add` and `invalidate`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::cache::{TtlCache, WrapOptions};

// == Constants ==
/// Cache key of the static dataset
pub const STATIC_DATA_KEY: &str = "static_data";

/// TTL for dynamic entries
pub const DYNAMIC_DATA_TTL: Duration = Duration::from_secs(10);

/// Cache key of the dynamic dataset with the given id.
pub fn dynamic_data_key(id: &str) -> String {
    format!("dynamic_data_{}", id)
}

// == Database Error ==
/// Failures reported by the mock database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// The database was switched off
    #[error("Database unavailable")]
    Unavailable,
}

// == Mock Database ==
/// In-memory "database" that answers after a fixed latency.
#[derive(Debug)]
pub struct MockDatabase {
    latency: Duration,
    reads: AtomicUsize,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl MockDatabase {
    /// Creates a database that takes `latency` to answer each query.
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulated round-trip latency.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Number of read queries served.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write queries served.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes every following query fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    async fn round_trip(&self, counter: &AtomicUsize) -> Result<(), DbError> {
        tokio::time::sleep(self.latency).await;
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable);
        }
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub async fn fetch_static(&self) -> Result<String, DbError> {
        self.round_trip(&self.reads).await?;
        Ok("static_data".to_string())
    }

    pub async fn store_static(&self) -> Result<String, DbError> {
        self.round_trip(&self.writes).await?;
        Ok("updated static_data".to_string())
    }

    pub async fn fetch_dynamic(&self, id: &str) -> Result<String, DbError> {
        self.round_trip(&self.reads).await?;
        Ok(format!("dynamic data {}", id))
    }

    pub async fn store_dynamic(&self, id: &str) -> Result<String, DbError> {
        self.round_trip(&self.writes).await?;
        Ok(format!("updated dynamic data {}", id))
    }
}

// == Repository ==
/// Data access layer that memoizes database lookups in a [`TtlCache`].
#[derive(Debug, Clone)]
pub struct Repository {
    db: Arc<MockDatabase>,
    cache: TtlCache<String>,
}

impl Repository {
    pub fn new(db: Arc<MockDatabase>, cache: TtlCache<String>) -> Self {
        Self { db, cache }
    }

    pub fn cache(&self) -> &TtlCache<String> {
        &self.cache
    }

    pub fn db(&self) -> &MockDatabase {
        &self.db
    }

    /// Reads the static dataset, cached for the default TTL.
    pub async fn get_static_data(&self) -> Result<String, DbError> {
        let db = Arc::clone(&self.db);
        self.cache
            .wrap(STATIC_DATA_KEY, WrapOptions::default(), move || {
                let db = Arc::clone(&db);
                async move { db.fetch_static().await }
            })
            .call()
            .await
    }

    /// Writes the static dataset and invalidates its cache entry.
    ///
    /// The written value is returned but not cached; the next
    /// `get_static_data` goes to the database.
    pub async fn update_static_data(&self) -> Result<String, DbError> {
        let db = Arc::clone(&self.db);
        self.cache
            .wrap(
                STATIC_DATA_KEY,
                WrapOptions::default().invalidate(true),
                move || {
                    let db = Arc::clone(&db);
                    async move { db.store_static().await }
                },
            )
            .call()
            .await
    }

    /// Reads the dynamic dataset `id`, cached for [`DYNAMIC_DATA_TTL`].
    pub async fn get_dynamic_data(&self, id: &str) -> Result<String, DbError> {
        let key = dynamic_data_key(id);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let data = self.db.fetch_dynamic(id).await?;
        self.cache.add(key, data.clone(), DYNAMIC_DATA_TTL);
        Ok(data)
    }

    /// Writes the dynamic dataset `id` and invalidates its cache entry.
    pub async fn update_dynamic_data(&self, id: &str) -> Result<(), DbError> {
        let data = self.db.store_dynamic(id).await?;
        debug!("Stored {:?}", data);
        self.cache.invalidate(&dynamic_data_key(id));
        Ok(())
    }
}
