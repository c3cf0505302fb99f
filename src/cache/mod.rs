//! Cache Module
//!
//! Provides an in-process key/value cache with lazy TTL expiry and a
//! wrapper that memoizes async producers.

mod clock;
mod entry;
mod shared;
mod stats;
mod store;
mod wrap;


use std::time::Duration;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use shared::TtlCache;
pub use stats::CacheStats;
pub use store::CacheStore;
pub use wrap::{CachedProducer, WrapOptions};

// == Public Constants ==
/// TTL used when the caller does not specify one (one hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// How far into the past `invalidate` moves an entry's expiry
pub const INVALIDATION_OFFSET: Duration = Duration::from_secs(60);
