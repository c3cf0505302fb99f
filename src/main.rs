//! Memo Cache demo
//!
//! Runs the static and dynamic lookup scenarios against a slow mock database
//! and reports how long each call took.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memo_cache::mock_db::{MockDatabase, Repository};
use memo_cache::{Config, TtlCache};

/// Entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and the mock database
/// 4. Run the static data scenario (wrapped producers)
/// 5. Run the dynamic data scenario (manual get/add/invalidate)
/// 6. Print cache statistics as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memo_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: default_ttl={}s, invalidation_offset={}s, demo_latency={}ms",
        config.default_ttl.as_secs(),
        config.invalidation_offset.as_secs(),
        config.demo_latency.as_millis()
    );

    let cache = TtlCache::with_config(&config);
    let db = Arc::new(MockDatabase::new(config.demo_latency));
    let repo = Repository::new(db, cache.clone());

    // Static data: wrapped producer, then invalidating wrapper
    timed("get static data (cold)", repo.get_static_data()).await?;
    timed("get static data (cached)", repo.get_static_data()).await?;
    timed("update static data", repo.update_static_data()).await?;
    timed("get static data (after update)", repo.get_static_data()).await?;

    // Dynamic data: manual get/add/invalidate
    let id = "42";
    timed("get dynamic data (cold)", repo.get_dynamic_data(id)).await?;
    timed("get dynamic data (cached)", repo.get_dynamic_data(id)).await?;
    timed("update dynamic data", repo.update_dynamic_data(id)).await?;
    timed("get dynamic data (after update)", repo.get_dynamic_data(id)).await?;

    let stats = serde_json::to_string_pretty(&cache.stats()).context("Failed to encode stats")?;
    println!("{}", stats);

    Ok(())
}

/// Awaits `fut` and logs how long it took.
async fn timed<T, E, Fut>(label: &str, fut: Fut) -> anyhow::Result<T>
where
    T: std::fmt::Debug,
    E: std::error::Error + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let value = fut.await.with_context(|| format!("{} failed", label))?;
    info!("{}: {:?} in {:.2?}", label, value, start.elapsed());
    Ok(value)
}
