//! Wrap Module
//!
//! Turns a zero-argument async producer into one that consults and
//! populates a [`TtlCache`] under a fixed key.
//!
//! # Example
//! ```
//! use std::convert::Infallible;
//! use memo_cache::{TtlCache, WrapOptions};
//!
//! # tokio_test::block_on(async {
//! let cache: TtlCache<String> = TtlCache::new();
//! let fetch = cache.wrap("static_data", WrapOptions::default(), || async {
//!     Ok::<_, Infallible>("static_data".to_string())
//! });
//!
//! assert_eq!(fetch.call().await, Ok("static_data".to_string()));
//! assert_eq!(cache.get("static_data").as_deref(), Some("static_data"));
//! # });
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::info;

use crate::cache::{TtlCache, DEFAULT_TTL};

// == Wrap Options ==
/// Behaviour modifiers for a wrapped producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions {
    /// Lifetime of entries written on a miss
    pub ttl: Duration,
    /// Skip the cache lookup and always run the producer (the result is still stored)
    pub ignore: bool,
    /// Expire the key, run the producer and return its result without caching it
    pub invalidate: bool,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            ignore: false,
            invalidate: false,
        }
    }
}

impl WrapOptions {
    /// Sets the TTL for entries written on a miss.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets whether the cache lookup is skipped.
    pub fn ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    /// Sets whether each call invalidates the key instead of using it.
    pub fn invalidate(mut self, invalidate: bool) -> Self {
        self.invalidate = invalidate;
        self
    }
}

// == Cached Producer ==
/// A producer bound to a cache key. Created by [`TtlCache::wrap`].
#[derive(Debug, Clone)]
pub struct CachedProducer<V, F> {
    cache: TtlCache<V>,
    key: String,
    options: WrapOptions,
    producer: F,
}

impl<V, F> CachedProducer<V, F> {
    /// Key this producer reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Options this producer was wrapped with.
    pub fn options(&self) -> WrapOptions {
        self.options
    }
}

impl<V, F, Fut, E> CachedProducer<V, F>
where
    V: Clone,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    /// Runs one invocation of the wrapped producer.
    ///
    /// 1. With `invalidate` set, the key is expired if present and the
    ///    producer's result is returned without being cached.
    /// 2. Otherwise, unless `ignore` is set, a valid cached value is returned
    ///    and the producer is not run.
    /// 3. Otherwise the producer runs and a successful result is stored for
    ///    `ttl`.
    ///
    /// Producer errors are returned unchanged and never cached. If the
    /// returned future is dropped while the producer is pending, nothing is
    /// written.
    pub async fn call(&self) -> Result<V, E> {
        if self.options.invalidate {
            self.cache.invalidate_entry(&self.key);
            return (self.producer)().await;
        }

        if !self.options.ignore {
            if let Some(value) = self.cache.get(&self.key) {
                return Ok(value);
            }
        }

        info!("Cache miss for {}", self.key);
        let value = (self.producer)().await?;
        self.cache.add(self.key.clone(), value.clone(), self.options.ttl);
        Ok(value)
    }
}

impl<V: Clone> TtlCache<V> {
    // == Wrap ==
    /// Wraps `producer` so that its results are cached under `key`.
    ///
    /// The producer only runs when [`CachedProducer::call`] is awaited.
    pub fn wrap<F, Fut, E>(
        &self,
        key: impl Into<String>,
        options: WrapOptions,
        producer: F,
    ) -> CachedProducer<V, F>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        CachedProducer {
            cache: self.clone(),
            key: key.into(),
            options,
            producer,
        }
    }

    // == Cached ==
    /// Returns the cached value for `key`, or runs `producer` and caches
    /// its successful result for `ttl`.
    pub async fn cached<F, Fut, E>(&self, key: &str, ttl: Duration, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = producer().await?;
        self.add(key, value.clone(), ttl);
        Ok(value)
    }
}
