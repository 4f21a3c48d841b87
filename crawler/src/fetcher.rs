use modpack_core::{ModPack, PageId};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use crate::client::PageClient;
use crate::error::FetchError;
use crate::extract::extract;
use crate::pool::FetchOutcome;
use crate::random::RandomSource;
use crate::{endpoint, CrawlConfig};

/// Browser identities rotated across requests.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.5845.97 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.5845.97 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.5845.97 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:116.0) Gecko/20100101 Firefox/116.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13.5; rv:116.0) Gecko/20100101 Firefox/116.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:116.0) Gecko/20100101 Firefox/116.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.5 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.5845.97 Safari/537.36 Edg/116.0.1938.81",
    "Mozilla/5.0 (Linux; Android 13; Pixel 7 Pro) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.5845.98 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 12; SM-G991U) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.5845.98 Mobile Safari/537.36",
];

pub fn random_user_agent<R: RandomSource + ?Sized>(rng: &R) -> &'static str {
    USER_AGENTS[rng.index(USER_AGENTS.len())]
}

/// Fetches and parses single catalog pages. Shared by all workers of a run.
pub struct Fetcher<C, R> {
    client: C,
    rng: R,
    base_url: Url,
    delay_min: Duration,
    delay_span: Duration,
}

impl<C: PageClient, R: RandomSource> Fetcher<C, R> {
    pub fn new(client: C, rng: R, config: &CrawlConfig) -> Self {
        Self {
            client,
            rng,
            base_url: config.base_url.clone(),
            delay_min: config.delay_min,
            delay_span: config.delay_span,
        }
    }

    pub fn page_url(&self, id: PageId) -> Result<Url, FetchError> {
        endpoint(&self.base_url, &format!("modpack/{id}.html")).map_err(|source| FetchError::Url { id, source })
    }

    /// GET one page and return its body. A successful fetch is followed by a random
    /// pause in `[delay_min, delay_min + delay_span)` that holds back this caller only.
    pub async fn fetch(&self, id: PageId, url: &Url) -> Result<String, FetchError> {
        let ua = random_user_agent(&self.rng);
        let resp = self
            .client
            .get(url, ua)
            .await
            .map_err(|source| FetchError::Transport { id, source })?;
        if resp.status != StatusCode::OK {
            return Err(FetchError::Status { id, status: resp.status.to_string() });
        }
        sleep(self.pause()).await;
        Ok(resp.body)
    }

    fn pause(&self) -> Duration {
        self.delay_min + self.delay_span.mul_f64(self.rng.unit())
    }

    async fn harvest_page(&self, id: PageId) -> Result<ModPack, FetchError> {
        let url = self.page_url(id)?;
        let html = self.fetch(id, &url).await?;
        let page = extract(&html).map_err(|source| FetchError::Extract { id, source })?;
        Ok(page.into_pack(url.to_string()))
    }

    /// Fetch, extract and stamp the source address for one identifier.
    pub async fn process(&self, id: PageId) -> FetchOutcome {
        FetchOutcome { id, result: self.harvest_page(id).await }
    }
}
