/// HTTP collaborator that fetches search-result pages
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Browser user agent; the search page serves a different layout to unknown clients
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Source of raw page text for a search URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<String>;
}

/// reqwest-backed page fetcher with browser-like headers
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    timeout: Duration,
}

impl YouTubeClient {
    /// Create a client with the default user agent and language
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        Self::with_headers(timeout_seconds, DEFAULT_USER_AGENT, DEFAULT_ACCEPT_LANGUAGE)
    }

    pub fn with_headers(timeout_seconds: u64, user_agent: &str, accept_language: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(accept_language)?);

        let timeout = Duration::from_secs(timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl PageFetcher for YouTubeClient {
    async fn fetch_page(&self, url: &Url) -> Result<String> {
        debug!("Fetching {}", url);

        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Search page returned HTTP {}", response.status()));
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes", body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = YouTubeClient::new(15).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_language_header() {
        assert!(YouTubeClient::with_headers(5, DEFAULT_USER_AGENT, "bad\nvalue").is_err());
    }
}
