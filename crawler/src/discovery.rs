use lazy_static::lazy_static;
use modpack_core::PageId;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use url::Url;

use crate::client::PageClient;
use crate::endpoint;
use crate::error::DiscoveryError;

pub const LISTING_PATH: &str = "modpack.html?sort=createtime";

lazy_static! {
    static ref LISTING_BLOCK: Selector = Selector::parse("div.modlist-block").expect("valid selector");
    static ref ENTRY_LINK: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Fetch the newest-first listing and read the highest page id from its first entry.
pub async fn discover_max_identifier<C: PageClient + ?Sized>(
    client: &C,
    base_url: &Url,
    user_agent: &str,
) -> Result<PageId, DiscoveryError> {
    let url = endpoint(base_url, LISTING_PATH)?;
    let resp = client.get(&url, user_agent).await?;
    if resp.status != StatusCode::OK {
        return Err(DiscoveryError::Status(resp.status.to_string()));
    }
    let max = parse_max_identifier(&resp.body)?;
    tracing::info!(%url, max_id = max, "discovered identifier range");
    Ok(max)
}

/// `<div class="modlist-block"><a href="/modpack/1234.html">` yields 1234.
pub fn parse_max_identifier(html: &str) -> Result<PageId, DiscoveryError> {
    let doc = Html::parse_document(html);
    let href = doc
        .select(&LISTING_BLOCK)
        .next()
        .and_then(|block| block.select(&ENTRY_LINK).next())
        .and_then(|a| a.value().attr("href"))
        .ok_or(DiscoveryError::MissingEntry)?;
    let filename = href.rsplit('/').next().unwrap_or(href);
    filename
        .trim_end_matches(".html")
        .parse::<PageId>()
        .map_err(|_| DiscoveryError::InvalidId(href.to_string()))
}
