use anyhow::Result;
use clap::Parser;
use crawler::{harvest, CrawlConfig, Harvest, HttpClient, SeededRandom, ThreadRandom, DEFAULT_BASE_URL};
use modpack_core::persist::{save_dataset, DatasetPath};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Harvest the modpack catalog once and write it as JSON")]
struct Cli {
    /// Number of concurrent workers
    #[arg(long = "thread", default_value_t = crawler::DEFAULT_WORKERS)]
    workers: usize,
    /// Output dataset path
    #[arg(long, default_value = "modpacks.json")]
    output: String,
    /// Catalog site root
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: Url,
    /// Seed for user-agent rotation and pauses (reproducible runs)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Cli::parse();

    let mut config = CrawlConfig::new(args.base_url);
    config.worker_count = args.workers;
    let client = HttpClient::new(config.timeout)?;

    let result: Harvest = match args.seed {
        Some(seed) => harvest(client, SeededRandom::new(seed), &config).await?,
        None => harvest(client, ThreadRandom, &config).await?,
    };

    save_dataset(&DatasetPath::new(&args.output), &result.records)?;
    eprintln!(
        "done: succeeded={} failed={} elapsed={:.1}s -> {}",
        result.succeeded(),
        result.failed(),
        result.elapsed.as_secs_f64(),
        &args.output
    );
    Ok(())
}
