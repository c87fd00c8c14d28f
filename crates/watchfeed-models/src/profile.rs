use serde::{Deserialize, Serialize};

/// Counters scraped from a public profile page
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub movie_count: u64,
}
