pub mod analytics;
pub mod enrichment;
pub mod service;

pub use analytics::{summarize, AnalyticsOptions, RECENT_PREVIEW_LIMIT};
pub use enrichment::enrich_posters;
pub use service::{ServiceOptions, WatchFeedService};
