//! Memo Cache - A process-local TTL cache
//!
//! Memoizes the results of expensive async lookups behind a simple wrapping
//! combinator, with lazy expiry and explicit invalidation.

pub mod cache;
pub mod config;
pub mod error;
pub mod mock_db;

pub use cache::{
    CacheStats, CachedProducer, Clock, ManualClock, SystemClock, TtlCache, WrapOptions,
    DEFAULT_TTL,
};
pub use config::Config;
pub use error::{CacheError, Result};
