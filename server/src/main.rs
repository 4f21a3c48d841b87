use anyhow::Result;
use clap::Parser;
use crawler::{harvest, CrawlConfig, HttpClient, ThreadRandom, DEFAULT_BASE_URL};
use modpack_core::persist::DatasetPath;
use parking_lot::RwLock;
use server::build_app;
use server::schedule::{load_or_fetch, spawn_refresh, SharedDataset};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser)]
struct Args {
    /// Number of concurrent crawl workers
    #[arg(long = "thread", default_value_t = crawler::DEFAULT_WORKERS)]
    workers: usize,
    /// Dataset file; crawled on startup when missing
    #[arg(long, default_value = "modpacks.json")]
    data: String,
    /// Catalog site root
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: Url,
    /// Seconds between scheduled re-crawls
    #[arg(long, default_value_t = 7 * 24 * 60 * 60)]
    refresh_secs: u64,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut config = CrawlConfig::new(args.base_url.clone());
    config.worker_count = args.workers;
    let crawl = move || {
        let config = config.clone();
        async move {
            let client = HttpClient::new(config.timeout)?;
            let result = harvest(client, ThreadRandom, &config).await?;
            Ok::<_, anyhow::Error>(result.records)
        }
    };

    let paths = DatasetPath::new(&args.data);
    let packs = load_or_fetch(&paths, &crawl).await?;
    tracing::info!(records = packs.len(), "dataset ready");
    let dataset: SharedDataset = Arc::new(RwLock::new(packs));

    spawn_refresh(Duration::from_secs(args.refresh_secs.max(1)), paths, Arc::clone(&dataset), crawl);

    let app = build_app(dataset);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
