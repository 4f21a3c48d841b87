use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use url::Url;

use crate::error::ClientError;

/// Status and body of one GET. `body` is only read for `200 OK`.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: StatusCode,
    pub body: String,
}

#[async_trait]
pub trait PageClient: Send + Sync {
    async fn get(&self, url: &Url, user_agent: &str) -> Result<PageResponse, ClientError>;
}

/// reqwest-backed client. Cloning shares the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let inner = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl PageClient for HttpClient {
    async fn get(&self, url: &Url, user_agent: &str) -> Result<PageResponse, ClientError> {
        let resp = self
            .inner
            .get(url.clone())
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() {
                    ClientError::Connection(err.to_string())
                } else {
                    ClientError::Http(err)
                }
            })?;
        let status = resp.status();
        if status != StatusCode::OK {
            // dropping the response releases the connection without reading the body
            return Ok(PageResponse { status, body: String::new() });
        }
        let body = resp.text().await?;
        Ok(PageResponse { status, body })
    }
}

#[async_trait]
impl<T: PageClient + ?Sized> PageClient for std::sync::Arc<T> {
    async fn get(&self, url: &Url, user_agent: &str) -> Result<PageResponse, ClientError> {
        (**self).get(url, user_agent).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refused_connection_maps_to_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/modpack/1.html")).unwrap();
        let err = client.get(&url, "test-agent").await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)), "{err:?}");
    }
}
