use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::header::{
    ACCEPT, CACHE_CONTROL, EXPIRES, IF_MODIFIED_SINCE, IF_NONE_MATCH, PRAGMA, USER_AGENT,
};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use crate::error::FetchError;
use crate::traits::FeedFetcher;

pub const DEFAULT_BASE_URL: &str = "https://letterboxd.com";

/// Token appended to feed requests so no cache between us and Letterboxd can
/// answer with a stale copy.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheBuster {
    pub timestamp_ms: i64,
    pub token: String,
    pub variant: u32,
}

impl CacheBuster {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(13)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        Self {
            timestamp_ms: Utc::now().timestamp_millis(),
            token,
            variant: rng.gen_range(0..10_000),
        }
    }

    pub fn query(&self) -> String {
        format!("t={}&r={}&v={}", self.timestamp_ms, self.token, self.variant)
    }

    /// Entity tag that matches nothing upstream, forcing a full response
    pub fn etag(&self) -> String {
        format!("\"{}-{}\"", self.timestamp_ms, self.token)
    }
}

#[derive(Clone)]
pub struct LetterboxdClient {
    client: Client,
    base_url: String,
}

impl LetterboxdClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn feed_url(&self, username: &str, buster: &CacheBuster) -> String {
        format!(
            "{}/{}/rss/?{}",
            self.base_url,
            urlencoding::encode(username),
            buster.query()
        )
    }

    pub fn profile_url(&self, username: &str) -> String {
        format!("{}/{}/", self.base_url, urlencoding::encode(username))
    }

    async fn get_text(&self, url: &str, request: reqwest::RequestBuilder) -> Result<String, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "Letterboxd responded with an error status");
            return Err(FetchError::status_error(url, status));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}

#[async_trait]
impl FeedFetcher for LetterboxdClient {
    fn source_name(&self) -> &str {
        "letterboxd"
    }

    async fn fetch_feed(&self, username: &str) -> Result<String, FetchError> {
        let buster = CacheBuster::generate();
        let url = self.feed_url(username, &buster);
        debug!(username = %username, cache_buster = %buster.query(), "Fetching Letterboxd RSS feed");

        let request = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache, no-store, must-revalidate, max-age=0")
            .header(PRAGMA, "no-cache")
            .header(EXPIRES, "0")
            .header(IF_MODIFIED_SINCE, "Thu, 01 Jan 1970 00:00:00 GMT")
            .header(IF_NONE_MATCH, buster.etag())
            .header(
                USER_AGENT,
                format!("Mozilla/5.0 (compatible; WatchfeedBot/1.0; {})", buster.timestamp_ms),
            )
            .header(ACCEPT, "application/rss+xml, application/xml, text/xml, */*");

        let body = self.get_text(&url, request).await?;
        debug!(username = %username, length = body.len(), "Fetched Letterboxd RSS feed");
        Ok(body)
    }

    async fn fetch_profile(&self, username: &str) -> Result<String, FetchError> {
        let url = self.profile_url(username);
        debug!(username = %username, "Fetching Letterboxd profile page");

        let request = self
            .client
            .get(&url)
            .header(USER_AGENT, "Mozilla/5.0 (compatible; WatchfeedBot/1.0)")
            .header(CACHE_CONTROL, "no-cache");

        self.get_text(&url, request).await
    }
}
