use chrono::{DateTime, Datelike, Utc};
use watchfeed_models::{AnalyticsSummary, RatingHistogram, WatchRecord};

/// Size of the recent-records preview in a summary
pub const RECENT_PREVIEW_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct AnalyticsOptions {
    pub recent_limit: usize,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            recent_limit: RECENT_PREVIEW_LIMIT,
        }
    }
}

/// Computes summary statistics over `records`.
///
/// `now` is captured once by the caller so the year and month buckets of one
/// run agree with each other. Calendar comparisons are made in UTC.
pub fn summarize(records: &[WatchRecord], now: DateTime<Utc>, options: &AnalyticsOptions) -> AnalyticsSummary {
    let count_this_year = records
        .iter()
        .filter(|r| r.watched_date.year() == now.year())
        .count();
    let count_this_month = records
        .iter()
        .filter(|r| r.watched_date.year() == now.year() && r.watched_date.month() == now.month())
        .count();

    let mut rating_histogram = RatingHistogram::new();
    let mut rating_sum = 0.0;
    let mut rated = 0usize;
    for rating in records.iter().filter_map(|r| r.rating) {
        rating_histogram.record(rating);
        rating_sum += rating.value();
        rated += 1;
    }
    let average_rating = if rated > 0 { rating_sum / rated as f64 } else { 0.0 };

    // Input is newest-first already; the stable sort keeps feed order for ties
    let mut recent_records = records.to_vec();
    recent_records.sort_by(|a, b| b.watched_date.cmp(&a.watched_date));
    recent_records.truncate(options.recent_limit);

    AnalyticsSummary {
        total_count: records.len(),
        average_rating,
        count_this_year,
        count_this_month,
        rating_histogram,
        recent_records,
    }
}
