use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::media::{MediaType, Platform};
use crate::rating::StarRating;

/// One logged film watch, normalized from a feed entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchRecord {
    /// Generated per record, unique within a response (the feed has no stable id)
    pub id: String,
    pub title: String,
    pub year: i32,
    pub media_type: MediaType,
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<StarRating>,
    /// Log date from the entry's publish timestamp, not necessarily the viewing date
    pub watched_date: DateTime<Utc>,
    pub permalink: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serializes_camel_case_and_omits_absent_fields() {
        let record = WatchRecord {
            id: "letterboxd-1".to_string(),
            title: "Barbie".to_string(),
            year: 2023,
            media_type: MediaType::Film,
            platform: Platform::Letterboxd,
            rating: StarRating::from_stars(3, true),
            watched_date: Utc.with_ymd_and_hms(2024, 1, 6, 12, 0, 0).unwrap(),
            permalink: "https://letterboxd.com/user/film/barbie-2023/".to_string(),
            poster_url: None,
            review_text: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["mediaType"], "film");
        assert_eq!(json["platform"], "letterboxd");
        assert_eq!(json["rating"], 3.5);
        assert_eq!(json["watchedDate"], "2024-01-06T12:00:00Z");
        assert!(json.get("posterUrl").is_none());
        assert!(json.get("reviewText").is_none());
    }
}
