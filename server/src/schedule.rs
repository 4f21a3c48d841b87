use anyhow::Result;
use modpack_core::persist::{load_dataset, save_dataset, DatasetPath};
use modpack_core::ModPack;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Dataset served by the query endpoint; replaced wholesale by each refresh.
pub type SharedDataset = Arc<RwLock<Vec<ModPack>>>;

pub const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Reuse the dataset file when present, otherwise crawl once and persist the result.
pub async fn load_or_fetch<F, Fut>(paths: &DatasetPath, crawl: F) -> Result<Vec<ModPack>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<ModPack>>>,
{
    if paths.exists() {
        tracing::info!(path = %paths.path.display(), "dataset found, skipping crawl (delete it to re-crawl)");
        return load_dataset(paths);
    }
    tracing::info!(path = %paths.path.display(), "no dataset, crawling");
    let packs = crawl().await?;
    save_dataset(paths, &packs)?;
    Ok(packs)
}

/// Crawl, persist, then swap the new dataset in. On error the served dataset is left untouched.
pub async fn refresh_once<F, Fut>(paths: &DatasetPath, dataset: &SharedDataset, crawl: &F) -> Result<usize>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<ModPack>>>,
{
    let packs = crawl().await?;
    save_dataset(paths, &packs)?;
    let count = packs.len();
    *dataset.write() = packs;
    Ok(count)
}

/// Re-run the crawl every `every`, starting one period from now.
pub fn spawn_refresh<F, Fut>(every: Duration, paths: DatasetPath, dataset: SharedDataset, crawl: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<ModPack>>> + Send,
{
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            tracing::info!("scheduled refresh");
            match refresh_once(&paths, &dataset, &crawl).await {
                Ok(records) => tracing::info!(records, "dataset refreshed"),
                Err(err) => tracing::error!(error = %format!("{err:#}"), "refresh failed, keeping previous dataset"),
            }
        }
    })
}
