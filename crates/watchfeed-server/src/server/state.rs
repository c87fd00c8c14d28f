use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;
use watchfeed_core::WatchFeedService;

#[derive(Clone)]
pub struct ServerState {
    pub service: Arc<WatchFeedService>,
    /// Used when a request names no member
    pub default_username: String,
    pub start_time: Instant,
}

impl ServerState {
    pub fn new(service: WatchFeedService, default_username: impl Into<String>) -> Self {
        Self {
            service: Arc::new(service),
            default_username: default_username.into(),
            start_time: Instant::now(),
        }
    }
}

impl FromRef<ServerState> for Arc<WatchFeedService> {
    fn from_ref(input: &ServerState) -> Self {
        input.service.clone()
    }
}
