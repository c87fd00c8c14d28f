use thiserror::Error;

/// Failure talking to an upstream service.
///
/// URLs are stored without their query string so cache-busting tokens and API
/// keys never end up in logs or error bodies.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = strip_query(url).to_string();
        // reqwest embeds the full request URL, query string included
        let err = err.without_url();
        if err.is_timeout() {
            FetchError::Timeout { url }
        } else if err.is_decode() {
            FetchError::Decode { url, message: err.to_string() }
        } else {
            FetchError::Network { url, source: err }
        }
    }

    pub fn status_error(url: &str, status: reqwest::StatusCode) -> Self {
        FetchError::Status {
            url: strip_query(url).to_string(),
            status: status.as_u16(),
        }
    }

    /// Upstream HTTP status, when the upstream answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub(crate) fn strip_query(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}
