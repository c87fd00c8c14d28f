use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use crate::rating::StarRating;
use crate::watch_record::WatchRecord;

/// Summary statistics over a set of watch records. Derived per request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_count: usize,
    /// Mean over rated records only; 0 when nothing is rated
    pub average_rating: f64,
    pub count_this_year: usize,
    pub count_this_month: usize,
    pub rating_histogram: RatingHistogram,
    pub recent_records: Vec<WatchRecord>,
}

/// Occurrence count per rating bucket. Always total: every bucket from 0.5 to
/// 5.0 is present, zero or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingHistogram {
    buckets: BTreeMap<StarRating, u32>,
}

impl RatingHistogram {
    pub fn new() -> Self {
        Self {
            buckets: StarRating::all().map(|rating| (rating, 0)).collect(),
        }
    }

    pub fn record(&mut self, rating: StarRating) {
        *self.buckets.entry(rating).or_insert(0) += 1;
    }

    pub fn count(&self, rating: StarRating) -> u32 {
        self.buckets.get(&rating).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.buckets.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StarRating, u32)> + '_ {
        self.buckets.iter().map(|(rating, count)| (*rating, *count))
    }
}

impl Default for RatingHistogram {
    fn default() -> Self {
        Self::new()
    }
}

// Keys are written the way a JSON object keyed by number reads ("0.5", "1", ...)
impl Serialize for RatingHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (rating, count) in &self.buckets {
            map.serialize_entry(&rating.to_string(), count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RatingHistogram {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HistogramVisitor;

        impl<'de> Visitor<'de> for HistogramVisitor {
            type Value = RatingHistogram;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from rating to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut histogram = RatingHistogram::new();
                while let Some((key, count)) = access.next_entry::<String, u32>()? {
                    let rating = key
                        .parse::<f64>()
                        .ok()
                        .and_then(StarRating::from_value)
                        .ok_or_else(|| serde::de::Error::custom(format!("invalid rating key: {}", key)))?;
                    histogram.buckets.insert(rating, count);
                }
                Ok(histogram)
            }
        }

        deserializer.deserialize_map(HistogramVisitor)
    }
}
