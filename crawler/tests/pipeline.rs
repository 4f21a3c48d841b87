use async_trait::async_trait;
use crawler::{
    harvest, ClientError, CrawlConfig, DiscoveryError, FetchError, Fetcher, PageClient, PageResponse,
    RandomSource, USER_AGENTS,
};
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use url::Url;

const BASE: &str = "http://catalog.test/";

fn listing(max_id: u32) -> String {
    format!(r#"<html><body><div class="modlist-block"><a href="/modpack/{max_id}.html">newest</a></div></body></html>"#)
}

fn page(id: u32) -> String {
    format!(
        r#"<html><body>
        <div class="class-title"><h3>pack-{id}</h3></div>
        <div class="class-category"><a>tech</a><a>magic</a></div>
        <div class="block-right"><div>stats</div><div>index: {id}.5</div></div>
        <div class="star"><p>{id}</p></div>
        <div class="infos"><p>{id}万</p></div>
        </body></html>"#
    )
}

/// In-memory catalog that records what was asked of it.
#[derive(Default)]
struct FakeSite {
    max_id: u32,
    listing_status: Option<StatusCode>,
    missing: HashSet<u32>,
    unparsable: HashSet<u32>,
    refused: HashSet<u32>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    requested: Mutex<Vec<u32>>,
    agents: Mutex<Vec<String>>,
}

impl FakeSite {
    fn new(max_id: u32) -> Self {
        Self { max_id, ..Default::default() }
    }

    fn respond(&self, url: &Url) -> Result<PageResponse, ClientError> {
        let ok = |body: String| Ok(PageResponse { status: StatusCode::OK, body });
        if url.path() == "/modpack.html" {
            return match self.listing_status {
                Some(status) => Ok(PageResponse { status, body: String::new() }),
                None => ok(listing(self.max_id)),
            };
        }
        let id: u32 = url
            .path()
            .trim_start_matches("/modpack/")
            .trim_end_matches(".html")
            .parse()
            .expect("page url");
        self.requested.lock().push(id);
        if self.refused.contains(&id) {
            Err(ClientError::Connection("connection reset".into()))
        } else if self.missing.contains(&id) {
            Ok(PageResponse { status: StatusCode::NOT_FOUND, body: String::new() })
        } else if self.unparsable.contains(&id) {
            ok("<html><body>maintenance</body></html>".into())
        } else {
            ok(page(id))
        }
    }
}

#[async_trait]
impl PageClient for FakeSite {
    async fn get(&self, url: &Url, user_agent: &str) -> Result<PageResponse, ClientError> {
        self.agents.lock().push(user_agent.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.respond(url)
    }
}

/// Always picks the first agent and the same point of the delay window.
struct FixedRandom(f64);

impl RandomSource for FixedRandom {
    fn index(&self, _len: usize) -> usize { 0 }
    fn unit(&self) -> f64 { self.0 }
}

fn config(workers: usize) -> CrawlConfig {
    let mut cfg = CrawlConfig::new(Url::parse(BASE).unwrap());
    cfg.worker_count = workers;
    cfg
}

#[tokio::test(start_paused = true)]
async fn failed_page_is_skipped_and_counted() {
    let mut site = FakeSite::new(5);
    site.missing.insert(3);
    let site = Arc::new(site);

    let result = harvest(Arc::clone(&site), FixedRandom(0.3), &config(2)).await.unwrap();

    let mut titles: Vec<_> = result.records.iter().map(|p| p.title.clone()).collect();
    titles.sort();
    assert_eq!(titles, vec!["pack-1", "pack-2", "pack-4"]);
    assert_eq!(result.succeeded(), 3);
    assert_eq!(result.failed(), 1);
    assert_eq!(result.failures[0].0, 3);
    assert!(result.failures[0].1.contains("404"), "{}", result.failures[0].1);
    assert!(OffsetDateTime::parse(&result.started_at, &Rfc3339).is_ok(), "{}", result.started_at);
}

#[tokio::test(start_paused = true)]
async fn records_are_fully_populated() {
    let site = Arc::new(FakeSite::new(3));
    let result = harvest(Arc::clone(&site), FixedRandom(0.0), &config(4)).await.unwrap();
    assert_eq!(result.records.len(), 2);
    for pack in &result.records {
        let id: u32 = pack.title.trim_start_matches("pack-").parse().unwrap();
        assert_eq!(pack.url, format!("{BASE}modpack/{id}.html"));
        assert_eq!(pack.category, vec!["tech", "magic"]);
        assert_eq!(pack.points, id as f32 + 0.5);
        assert_eq!(pack.scores, id as f32);
        assert_eq!(pack.views, format!("{id}万"));
    }
}

#[tokio::test(start_paused = true)]
async fn every_id_is_requested_exactly_once() {
    let site = Arc::new(FakeSite::new(30));
    let result = harvest(Arc::clone(&site), FixedRandom(0.9), &config(7)).await.unwrap();
    let mut requested = site.requested.lock().clone();
    requested.sort_unstable();
    assert_eq!(requested, (1..30).collect::<Vec<u32>>());
    assert_eq!(result.succeeded(), 29);
}

#[tokio::test(start_paused = true)]
async fn empty_catalog_yields_empty_dataset() {
    let site = Arc::new(FakeSite::new(1));
    let result = harvest(Arc::clone(&site), FixedRandom(0.0), &config(25)).await.unwrap();
    assert!(result.records.is_empty());
    assert!(result.failures.is_empty());
    assert!(site.requested.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn concurrency_never_exceeds_worker_count() {
    let mut site = FakeSite::new(41);
    site.latency = Duration::from_millis(20);
    let site = Arc::new(site);
    let result = harvest(Arc::clone(&site), FixedRandom(0.5), &config(4)).await.unwrap();
    assert_eq!(result.succeeded(), 40);
    let peak = site.peak.load(Ordering::SeqCst);
    assert!(peak <= 4, "peak {peak}");
    assert!(peak >= 2, "workers never overlapped");
}

#[tokio::test(start_paused = true)]
async fn parse_and_transport_failures_do_not_stop_the_run() {
    let mut site = FakeSite::new(6);
    site.unparsable.insert(2);
    site.refused.insert(4);
    let site = Arc::new(site);
    let result = harvest(Arc::clone(&site), FixedRandom(0.0), &config(3)).await.unwrap();
    assert_eq!(result.succeeded(), 3);
    let mut failed: Vec<u32> = result.failures.iter().map(|(id, _)| *id).collect();
    failed.sort_unstable();
    assert_eq!(failed, vec![2, 4]);
    let cause = &result.failures.iter().find(|(id, _)| *id == 2).unwrap().1;
    assert!(cause.contains("zone not found"), "{cause}");
}

#[tokio::test(start_paused = true)]
async fn discovery_failure_aborts_before_any_job() {
    let mut site = FakeSite::new(10);
    site.listing_status = Some(StatusCode::SERVICE_UNAVAILABLE);
    let site = Arc::new(site);
    let err = harvest(Arc::clone(&site), FixedRandom(0.0), &config(3)).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Status(_)));
    assert!(site.requested.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn agents_come_from_the_pool() {
    let site = Arc::new(FakeSite::new(12));
    harvest(Arc::clone(&site), crawler::ThreadRandom, &config(3)).await.unwrap();
    let agents = site.agents.lock();
    assert_eq!(agents.len(), 12);
    assert!(agents.iter().all(|ua| USER_AGENTS.contains(&ua.as_str())));
}

#[tokio::test(start_paused = true)]
async fn pause_follows_success_only() {
    let mut site = FakeSite::new(3);
    site.missing.insert(2);
    let fetcher = Fetcher::new(site, FixedRandom(0.5), &config(1));

    let started = tokio::time::Instant::now();
    let url = fetcher.page_url(1).unwrap();
    fetcher.fetch(1, &url).await.unwrap();
    let paused = started.elapsed();
    assert!(paused >= Duration::from_millis(550) && paused < Duration::from_millis(560), "{paused:?}");

    let started = tokio::time::Instant::now();
    let url = fetcher.page_url(2).unwrap();
    let err = fetcher.fetch(2, &url).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { id: 2, .. }));
    assert_eq!(err.id(), 2);
    assert!(started.elapsed() < Duration::from_millis(50));
}
