use futures::stream::{self, StreamExt};
use tracing::{debug, warn};
use watchfeed_models::WatchRecord;
use watchfeed_sources::PosterLookup;

/// Attaches a poster URL to each record, best effort.
///
/// Lookups run concurrently, at most `concurrency` at a time, and the output
/// keeps the input order. A failed lookup leaves that record's poster empty
/// and never fails the batch.
pub async fn enrich_posters(
    records: Vec<WatchRecord>,
    lookup: &dyn PosterLookup,
    concurrency: usize,
) -> Vec<WatchRecord> {
    let total = records.len();
    let enriched: Vec<WatchRecord> = stream::iter(records)
        .map(|mut record| async move {
            match lookup.find_poster(&record.title, record.year).await {
                Ok(poster_url) => record.poster_url = poster_url,
                Err(e) => {
                    warn!(title = %record.title, year = record.year, error = %e, "Poster lookup failed");
                    record.poster_url = None;
                }
            }
            record
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    debug!(
        total = total,
        with_poster = enriched.iter().filter(|r| r.poster_url.is_some()).count(),
        "Poster enrichment finished"
    );
    enriched
}
