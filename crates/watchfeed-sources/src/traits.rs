use async_trait::async_trait;
use crate::error::FetchError;

/// Retrieves raw documents for a member of a film-logging site.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    fn source_name(&self) -> &str;

    /// Raw RSS/XML activity feed for `username`. Single attempt, no retry.
    async fn fetch_feed(&self, username: &str) -> Result<String, FetchError>;

    /// Raw HTML of the member's public profile page
    async fn fetch_profile(&self, username: &str) -> Result<String, FetchError>;
}

/// Best-effort poster image search by title and release year.
#[async_trait]
pub trait PosterLookup: Send + Sync {
    /// `Ok(None)` when the catalog has no match or the match has no poster
    async fn find_poster(&self, title: &str, year: i32) -> Result<Option<String>, FetchError>;
}

/// Lookup used when enrichment is disabled
pub struct NoPosterLookup;

#[async_trait]
impl PosterLookup for NoPosterLookup {
    async fn find_poster(&self, _title: &str, _year: i32) -> Result<Option<String>, FetchError> {
        Ok(None)
    }
}
