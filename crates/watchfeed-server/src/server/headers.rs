use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL, ETAG, EXPIRES, LAST_MODIFIED, PRAGMA, VARY,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::time::Duration;

pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate, max-age=0, private";
pub const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

pub const X_CACHE_STATUS: HeaderName = HeaderName::from_static("x-cache-status");
pub const X_RESPONSE_TIME: HeaderName = HeaderName::from_static("x-response-time");
pub const X_TIMESTAMP: HeaderName = HeaderName::from_static("x-timestamp");

/// Response middleware for the API routes: nothing they return may be cached.
pub async fn no_cache(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static(EPOCH_HTTP_DATE));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, POST"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Cache-Control, Pragma"),
    );
    response
}

/// `"<millis>-<random>"`, different for every response
pub fn unique_etag(now: DateTime<Utc>) -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("\"{}-{}\"", now.timestamp_millis(), token)
}

pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Headers of a freshly fetched feed response.
pub fn fresh_feed_headers(now: DateTime<Utc>, elapsed: Duration) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, LAST_MODIFIED, http_date(now));
    insert(&mut headers, ETAG, unique_etag(now));
    headers.insert(VARY, HeaderValue::from_static("Accept-Encoding, User-Agent"));
    headers.insert(X_CACHE_STATUS, HeaderValue::from_static("MISS"));
    insert(&mut headers, X_RESPONSE_TIME, format!("{}ms", elapsed.as_millis()));
    headers.insert(X_TIMESTAMP, HeaderValue::from(now.timestamp_millis()));
    headers
}

pub fn failed_feed_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_CACHE_STATUS, HeaderValue::from_static("ERROR"));
    headers
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: String) {
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(name, value);
    }
}
