use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use watchfeed_models::{AnalyticsSummary, ProfileStats, WatchRecord};
use watchfeed_sources::letterboxd::{parse_feed, parse_profile_stats};
use watchfeed_sources::{FeedFetcher, FetchError, ParseContext, PosterLookup, DEFAULT_FEED_LIMIT};
use crate::analytics::{summarize, AnalyticsOptions, RECENT_PREVIEW_LIMIT};
use crate::enrichment::enrich_posters;

#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    /// Records kept for the recent-watches listing
    pub feed_limit: usize,
    /// Records fed to analytics; `None` aggregates the whole feed
    pub analytics_feed_limit: Option<usize>,
    pub recent_limit: usize,
    pub enrichment_concurrency: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            feed_limit: DEFAULT_FEED_LIMIT,
            analytics_feed_limit: None,
            recent_limit: RECENT_PREVIEW_LIMIT,
            enrichment_concurrency: 4,
        }
    }
}

/// Fetch → parse → enrich pipeline. Holds no per-request state; every call
/// starts from a fresh fetch.
pub struct WatchFeedService {
    fetcher: Arc<dyn FeedFetcher>,
    posters: Arc<dyn PosterLookup>,
    options: ServiceOptions,
}

impl WatchFeedService {
    pub fn new(fetcher: Arc<dyn FeedFetcher>, posters: Arc<dyn PosterLookup>, options: ServiceOptions) -> Self {
        Self { fetcher, posters, options }
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Most recent film watches with posters attached where a lookup succeeds.
    pub async fn recent_watches(&self, username: &str, now: DateTime<Utc>) -> Result<Vec<WatchRecord>, FetchError> {
        let xml = self.fetcher.fetch_feed(username).await?;
        let context = ParseContext::new(now).with_limit(Some(self.options.feed_limit));
        let records = parse_feed(&xml, context);
        info!(
            source = self.fetcher.source_name(),
            username = %username,
            count = records.len(),
            "Parsed recent watches"
        );

        Ok(enrich_posters(records, self.posters.as_ref(), self.options.enrichment_concurrency).await)
    }

    /// Summary statistics over the member's feed. No poster enrichment.
    pub async fn analytics(&self, username: &str, now: DateTime<Utc>) -> Result<AnalyticsSummary, FetchError> {
        let xml = self.fetcher.fetch_feed(username).await?;
        let context = ParseContext::new(now).with_limit(self.options.analytics_feed_limit);
        let records = parse_feed(&xml, context);
        debug!(username = %username, count = records.len(), "Aggregating watch records");

        let options = AnalyticsOptions {
            recent_limit: self.options.recent_limit,
        };
        Ok(summarize(&records, now, &options))
    }

    pub async fn profile_stats(&self, username: &str) -> Result<ProfileStats, FetchError> {
        let html = self.fetcher.fetch_profile(username).await?;
        let stats = parse_profile_stats(&html);
        debug!(username = %username, movie_count = stats.movie_count, "Parsed profile stats");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use watchfeed_sources::NoPosterLookup;

    struct StaticFeed {
        xml: String,
    }

    #[async_trait]
    impl FeedFetcher for StaticFeed {
        fn source_name(&self) -> &str {
            "static"
        }

        async fn fetch_feed(&self, _username: &str) -> Result<String, FetchError> {
            Ok(self.xml.clone())
        }

        async fn fetch_profile(&self, _username: &str) -> Result<String, FetchError> {
            Ok("<p>1,234 films</p>".to_string())
        }
    }

    struct DownFeed;

    #[async_trait]
    impl FeedFetcher for DownFeed {
        fn source_name(&self) -> &str {
            "down"
        }

        async fn fetch_feed(&self, _username: &str) -> Result<String, FetchError> {
            Err(FetchError::Status {
                url: "https://letterboxd.com/someone/rss/".to_string(),
                status: 503,
            })
        }

        async fn fetch_profile(&self, _username: &str) -> Result<String, FetchError> {
            Err(FetchError::Timeout {
                url: "https://letterboxd.com/someone/".to_string(),
            })
        }
    }

    struct FixedPoster;

    #[async_trait]
    impl PosterLookup for FixedPoster {
        async fn find_poster(&self, _title: &str, _year: i32) -> Result<Option<String>, FetchError> {
            Ok(Some("https://image.tmdb.org/t/p/w500/p.jpg".to_string()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap()
    }

    fn feed_of(count: usize) -> String {
        let items: String = (0..count)
            .map(|n| {
                format!(
                    "<item><title>Film {n}, 2023 - ★★★★</title><link>https://letterboxd.com/u/film/film-{n}/</link>\
                     <pubDate>Sat, 6 Jan 2024 12:00:00 +0000</pubDate></item>"
                )
            })
            .collect();
        format!("<rss><channel>{}</channel></rss>", items)
    }

    fn service(fetcher: Arc<dyn FeedFetcher>, posters: Arc<dyn PosterLookup>) -> WatchFeedService {
        WatchFeedService::new(fetcher, posters, ServiceOptions::default())
    }

    #[tokio::test]
    async fn test_recent_watches_are_capped_and_enriched() {
        let svc = service(Arc::new(StaticFeed { xml: feed_of(20) }), Arc::new(FixedPoster));

        let records = svc.recent_watches("someone", now()).await.unwrap();
        assert_eq!(records.len(), 12);
        assert_eq!(records[0].title, "Film 0");
        assert!(records.iter().all(|r| r.poster_url.is_some()));
    }

    #[tokio::test]
    async fn test_recent_watches_without_posters() {
        let svc = service(Arc::new(StaticFeed { xml: feed_of(2) }), Arc::new(NoPosterLookup));

        let records = svc.recent_watches("someone", now()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.poster_url.is_none()));
    }

    #[tokio::test]
    async fn test_analytics_covers_whole_feed() {
        let svc = service(Arc::new(StaticFeed { xml: feed_of(30) }), Arc::new(NoPosterLookup));

        let summary = svc.analytics("someone", now()).await.unwrap();
        assert_eq!(summary.total_count, 30);
        assert_eq!(summary.average_rating, 4.0);
        assert_eq!(summary.count_this_year, 30);
        assert_eq!(summary.count_this_month, 30);
        assert_eq!(summary.recent_records.len(), 20);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let svc = service(Arc::new(DownFeed), Arc::new(NoPosterLookup));

        let err = svc.recent_watches("someone", now()).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(svc.analytics("someone", now()).await.is_err());
        assert!(matches!(
            svc.profile_stats("someone").await,
            Err(FetchError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_profile_stats() {
        let svc = service(Arc::new(StaticFeed { xml: String::new() }), Arc::new(NoPosterLookup));
        assert_eq!(svc.profile_stats("someone").await.unwrap().movie_count, 1234);
    }
}
