mod error;
mod headers;
mod routes;
mod state;

pub use state::ServerState;

use anyhow::Result;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tracing::{info, warn};

pub fn make_app(state: ServerState) -> Router {
    let api_routes: Router = Router::new()
        .route("/letterboxd", get(routes::get_letterboxd))
        .route("/letterboxd-analytics", post(routes::post_analytics))
        .route("/letterboxd-stats", get(routes::get_stats))
        .layer(middleware::map_response(headers::no_cache))
        .with_state(state.clone());

    Router::new()
        .route("/", get(routes::home))
        .with_state(state)
        .nest("/api", api_routes)
}

pub async fn run_server(state: ServerState, host: &str, port: u16) -> Result<()> {
    let app = make_app(state);

    let address = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %address, "watchfeed server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => warn!(error = %e, "Could not listen for Ctrl-C"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use watchfeed_core::{ServiceOptions, WatchFeedService};
    use watchfeed_sources::{FeedFetcher, FetchError, NoPosterLookup};

    const FEED: &str = r#"<rss><channel>
        <item>
            <title>Barbie, 2023 - ★★★½</title>
            <link>https://letterboxd.com/user/film/barbie-2023/</link>
            <pubDate>Sat, 20 Jan 2024 18:05:09 +0000</pubDate>
        </item>
        <item>
            <title>Best of 2023</title>
            <link>https://letterboxd.com/user/list/best-of-2023/</link>
        </item>
    </channel></rss>"#;

    /// Serves FEED for "sattiyans" and 404s everyone else.
    struct OneMemberFeed;

    #[async_trait]
    impl FeedFetcher for OneMemberFeed {
        fn source_name(&self) -> &str {
            "fake"
        }

        async fn fetch_feed(&self, username: &str) -> Result<String, FetchError> {
            match username {
                "sattiyans" => Ok(FEED.to_string()),
                _ => Err(FetchError::Status {
                    url: format!("https://letterboxd.com/{}/rss/", username),
                    status: 404,
                }),
            }
        }

        async fn fetch_profile(&self, username: &str) -> Result<String, FetchError> {
            match username {
                "sattiyans" => Ok("<p>1,024 films</p>".to_string()),
                _ => Err(FetchError::Timeout {
                    url: format!("https://letterboxd.com/{}/", username),
                }),
            }
        }
    }

    fn app_with_default(default_username: &str) -> Router {
        let service = WatchFeedService::new(
            Arc::new(OneMemberFeed),
            Arc::new(NoPosterLookup),
            ServiceOptions::default(),
        );
        make_app(ServerState::new(service, default_username))
    }

    fn app() -> Router {
        app_with_default("sattiyans")
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_analytics(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/letterboxd-analytics")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn assert_no_cache(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers[header::CACHE_CONTROL], headers::NO_CACHE);
        assert_eq!(headers[header::PRAGMA], "no-cache");
        assert_eq!(headers[header::EXPIRES], headers::EPOCH_HTTP_DATE);
    }

    #[tokio::test]
    async fn test_home_reports_service_info() {
        let response = app().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["name"], "watchfeed-server");
        assert!(json["uptime"].as_str().unwrap().starts_with("0d"));
    }

    #[tokio::test]
    async fn test_feed_success() {
        let response = app().oneshot(get("/api/letterboxd")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_no_cache(&response);
        assert_eq!(response.headers()[headers::X_CACHE_STATUS], "MISS");
        assert!(response.headers().contains_key(header::ETAG));
        assert!(response.headers().contains_key(header::LAST_MODIFIED));
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let json = body_json(response).await;
        let items = json["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Barbie");
        assert_eq!(items[0]["year"], 2023);
        assert_eq!(items[0]["rating"], 3.5);
        assert!(json["timestamp"].is_i64());
        assert!(json["fetchedAt"].is_string());
    }

    #[tokio::test]
    async fn test_feed_etags_differ_between_responses() {
        let app = app();
        let first = app.clone().oneshot(get("/api/letterboxd")).await.unwrap();
        let second = app.oneshot(get("/api/letterboxd")).await.unwrap();
        assert_ne!(first.headers()[header::ETAG], second.headers()[header::ETAG]);
    }

    #[tokio::test]
    async fn test_feed_upstream_failure() {
        let response = app().oneshot(get("/api/letterboxd?username=nobody")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_no_cache(&response);
        assert_eq!(response.headers()[headers::X_CACHE_STATUS], "ERROR");

        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to fetch Letterboxd data");
        assert_eq!(json["items"], serde_json::json!([]));
        assert!(json["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn test_feed_rejects_bad_username() {
        let response = app().oneshot(get("/api/letterboxd?username=..%2Fadmin")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_feed_without_any_username() {
        let response = app_with_default("").oneshot(get("/api/letterboxd")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analytics_success() {
        let response = app()
            .oneshot(post_analytics(r#"{"username":"sattiyans"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_no_cache(&response);

        let json = body_json(response).await;
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["averageRating"], 3.5);
        assert_eq!(json["ratingHistogram"]["3.5"], 1);
        assert_eq!(json["ratingHistogram"]["0.5"], 0);
        assert_eq!(json["recentRecords"][0]["title"], "Barbie");
    }

    #[tokio::test]
    async fn test_analytics_invalid_json() {
        let response = app().oneshot(post_analytics("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid JSON in request body");
        assert!(json["details"].is_string());
    }

    #[tokio::test]
    async fn test_analytics_requires_username() {
        for body in [r#"{}"#, r#"{"username":"   "}"#, r#"{"username":42}"#, "[]"] {
            let response = app().oneshot(post_analytics(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(body_json(response).await["error"], "Username is required");
        }
    }

    #[tokio::test]
    async fn test_analytics_rejects_bad_username() {
        let response = app()
            .oneshot(post_analytics(r#"{"username":"a/b"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid username");
    }

    #[tokio::test]
    async fn test_analytics_upstream_failure() {
        let response = app()
            .oneshot(post_analytics(r#"{"username":"nobody"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to fetch Letterboxd data");
        assert!(json["details"].as_str().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_stats_success() {
        let response = app().oneshot(get("/api/letterboxd-stats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["movieCount"], 1024);
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_stats_failure_is_still_ok() {
        let response = app().oneshot(get("/api/letterboxd-stats?username=nobody")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["movieCount"], 0);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Failed to fetch movie count");
    }
}
