//! Concurrent harvester for the modpack catalog.
//!
//! A run discovers the highest page id from the listing page, then fans
//! `1..max_id` out to a fixed pool of workers. Each worker fetches a page with a
//! rotated user agent, extracts one [`ModPack`] from it and pushes the outcome
//! to a single collector. Per-page failures are logged and skipped; only
//! discovery can abort a run.

pub mod client;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod pool;
pub mod random;

use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub use client::{HttpClient, PageClient, PageResponse};
pub use error::{ClientError, DiscoveryError, ExtractError, FetchError, Zone};
pub use fetcher::{Fetcher, USER_AGENTS};
pub use modpack_core::{ModPack, PageId};
pub use pool::{FetchJob, FetchOutcome, Harvest, RunClock, RunPhase};
pub use random::{RandomSource, SeededRandom, ThreadRandom};

pub const DEFAULT_BASE_URL: &str = "https://www.mcmod.cn/";
pub const DEFAULT_WORKERS: usize = 25;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub base_url: Url,
    pub worker_count: usize,
    pub timeout: Duration,
    /// Shortest pause a worker takes after a successful fetch.
    pub delay_min: Duration,
    /// Width of the random window added on top of `delay_min`.
    pub delay_span: Duration,
}

impl CrawlConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            worker_count: DEFAULT_WORKERS,
            timeout: REQUEST_TIMEOUT,
            delay_min: Duration::from_millis(50),
            delay_span: Duration::from_secs(1),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_BASE_URL).expect("valid default base url"))
    }
}

/// Resolve `path` below `base`, treating the base as a directory even without a trailing slash.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    if base.path().ends_with('/') {
        base.join(path)
    } else {
        let mut dir = base.clone();
        dir.set_path(&format!("{}/", base.path()));
        dir.join(path)
    }
}

/// Run the full pipeline once: discovery, fan-out, collection.
pub async fn harvest<C, R>(client: C, rng: R, config: &CrawlConfig) -> Result<Harvest, DiscoveryError>
where
    C: PageClient + 'static,
    R: RandomSource + 'static,
{
    let clock = RunClock::start();
    tracing::info!(base_url = %config.base_url, workers = config.worker_count, "starting harvest");
    let max_id = discovery::discover_max_identifier(&client, &config.base_url, fetcher::random_user_agent(&rng)).await?;
    let fetcher = Arc::new(Fetcher::new(client, rng, config));
    Ok(pool::run_pool(fetcher, max_id, config.worker_count, clock).await)
}
