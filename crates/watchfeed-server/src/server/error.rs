use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use watchfeed_sources::FetchError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{error}: {details}")]
    Validation { error: &'static str, details: String },

    #[error("Invalid JSON in request body: {0}")]
    InvalidBody(String),

    #[error("Failed to fetch Letterboxd data: {0}")]
    Upstream(#[from] FetchError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    details: String,
}

impl ApiError {
    pub fn username_required() -> Self {
        ApiError::Validation {
            error: "Username is required",
            details: "Request body must contain a non-empty \"username\" string".to_string(),
        }
    }

    pub fn invalid_username(username: &str) -> Self {
        ApiError::Validation {
            error: "Invalid username",
            details: format!(
                "'{}' may only contain letters, digits and underscores",
                username
            ),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Rejected request");
        }

        let body = match self {
            ApiError::Validation { error, details } => ErrorBody { error, details },
            ApiError::InvalidBody(details) => ErrorBody {
                error: "Invalid JSON in request body",
                details,
            },
            ApiError::Upstream(source) => ErrorBody {
                error: "Failed to fetch Letterboxd data",
                details: source.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
