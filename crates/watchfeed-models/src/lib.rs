pub mod analytics;
pub mod media;
pub mod profile;
pub mod rating;
pub mod watch_record;

pub use analytics::{AnalyticsSummary, RatingHistogram};
pub use media::{MediaType, Platform};
pub use profile::ProfileStats;
pub use rating::StarRating;
pub use watch_record::WatchRecord;
