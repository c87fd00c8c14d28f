use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use watchfeed_config::is_valid_username;
use watchfeed_core::WatchFeedService;
use watchfeed_models::{AnalyticsSummary, WatchRecord};

use super::error::ApiError;
use super::headers::{failed_feed_headers, fresh_feed_headers};
use super::state::ServerState;

#[derive(Serialize)]
pub struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    uptime: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    items: Vec<WatchRecord>,
    timestamp: i64,
    fetched_at: String,
}

#[derive(Serialize)]
pub struct FeedErrorResponse {
    error: &'static str,
    items: Vec<WatchRecord>,
    timestamp: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    movie_count: u64,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// Picks the requested member, falling back to the configured one.
fn resolve_username(requested: Option<&str>, default: &str) -> Result<String, ApiError> {
    let username = requested
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(default);
    if username.is_empty() {
        return Err(ApiError::Validation {
            error: "Username is required",
            details: "Pass ?username= or configure letterboxd.username".to_string(),
        });
    }
    if !is_valid_username(username) {
        return Err(ApiError::invalid_username(username));
    }
    Ok(username.to_string())
}

pub async fn home(State(state): State<ServerState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

pub async fn get_letterboxd(State(state): State<ServerState>, Query(query): Query<UsernameQuery>) -> Response {
    let started = Instant::now();
    let now = Utc::now();

    let username = match resolve_username(query.username.as_deref(), &state.default_username) {
        Ok(username) => username,
        Err(e) => return feed_failure(e.status_code(), "Invalid Letterboxd username", now),
    };

    match state.service.recent_watches(&username, now).await {
        Ok(items) => {
            info!(username = %username, count = items.len(), "Served recent watches");
            let body = FeedResponse {
                items,
                timestamp: now.timestamp_millis(),
                fetched_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            };
            (fresh_feed_headers(now, started.elapsed()), Json(body)).into_response()
        }
        Err(e) => {
            error!(username = %username, error = %e, "Error fetching Letterboxd data");
            feed_failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch Letterboxd data", now)
        }
    }
}

fn feed_failure(status: StatusCode, error: &'static str, now: DateTime<Utc>) -> Response {
    let body = FeedErrorResponse {
        error,
        items: Vec::new(),
        timestamp: now.timestamp_millis(),
    };
    (status, failed_feed_headers(), Json(body)).into_response()
}

pub async fn post_analytics(
    State(service): State<Arc<WatchFeedService>>,
    body: Bytes,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    let request: Value = serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;

    let username = request
        .get("username")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(ApiError::username_required)?;
    if !is_valid_username(username) {
        return Err(ApiError::invalid_username(username));
    }

    let summary = service.analytics(username, Utc::now()).await?;
    info!(
        username = %username,
        total = summary.total_count,
        average = summary.average_rating,
        "Served analytics summary"
    );
    Ok(Json(summary))
}

/// Never fails at the HTTP level; a missing count reads as zero.
pub async fn get_stats(State(state): State<ServerState>, Query(query): Query<UsernameQuery>) -> Json<StatsResponse> {
    let username = match resolve_username(query.username.as_deref(), &state.default_username) {
        Ok(username) => username,
        Err(e) => {
            warn!(error = %e, "Rejected stats request");
            return Json(StatsResponse {
                movie_count: 0,
                success: false,
                error: Some("Invalid Letterboxd username"),
            });
        }
    };

    match state.service.profile_stats(&username).await {
        Ok(stats) => Json(StatsResponse {
            movie_count: stats.movie_count,
            success: true,
            error: None,
        }),
        Err(e) => {
            error!(username = %username, error = %e, "Letterboxd stats error");
            Json(StatsResponse {
                movie_count: 0,
                success: false,
                error: Some("Failed to fetch movie count"),
            })
        }
    }
}
