use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use crate::error::FetchError;
use crate::traits::PosterLookup;

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    #[serde(default)]
    poster_path: Option<String>,
}

/// Poster search against the TMDB movie catalog.
///
/// Matching is by title and release year only, so remakes and re-releases can
/// resolve to the wrong film. Treat the result as decoration.
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_image_base_url(mut self, image_base_url: impl Into<String>) -> Self {
        self.image_base_url = image_base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn search_url(&self, title: &str, year: i32) -> String {
        format!(
            "{}/search/movie?api_key={}&query={}&year={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(title),
            year
        )
    }
}

#[async_trait]
impl PosterLookup for TmdbClient {
    async fn find_poster(&self, title: &str, year: i32) -> Result<Option<String>, FetchError> {
        let url = self.search_url(title, year);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        if !response.status().is_success() {
            return Err(FetchError::status_error(&url, response.status()));
        }

        let search: TmdbSearchResponse = response
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        let poster = search
            .results
            .into_iter()
            .next()
            .and_then(|movie| movie.poster_path)
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", self.image_base_url, path));

        debug!(title = %title, year = year, found = poster.is_some(), "TMDB poster lookup");
        Ok(poster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> TmdbClient {
        TmdbClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.url())
    }

    #[tokio::test]
    async fn test_first_result_poster() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
                Matcher::UrlEncoded("query".into(), "Past Lives".into()),
                Matcher::UrlEncoded("year".into(), "2023".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results":[{"id":1,"poster_path":"/first.jpg"},{"id":2,"poster_path":"/second.jpg"}]}"#)
            .create_async()
            .await;

        let poster = client_for(&server).find_poster("Past Lives", 2023).await.unwrap();
        assert_eq!(poster.as_deref(), Some("https://image.tmdb.org/t/p/w500/first.jpg"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_results_or_no_poster() {
        let mut server = mockito::Server::new_async().await;
        let _empty = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::UrlEncoded("query".into(), "Nothing".into()))
            .with_status(200)
            .with_body(r#"{"page":1,"results":[]}"#)
            .create_async()
            .await;
        let _null_poster = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::UrlEncoded("query".into(), "Obscure".into()))
            .with_status(200)
            .with_body(r#"{"results":[{"id":3,"poster_path":null}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.find_poster("Nothing", 2020).await.unwrap(), None);
        assert_eq!(client.find_poster("Obscure", 2020).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_status_hides_api_key() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let err = client_for(&server).find_poster("Barbie", 2023).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn test_connection_error_hides_api_key() {
        // Bind then drop to get a port nothing listens on
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let client = TmdbClient::new("SECRET-KEY", Duration::from_secs(5))
            .unwrap()
            .with_base_url(format!("http://{}", closed));

        let err = client.find_poster("Barbie", 2023).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
        assert!(!err.to_string().contains("SECRET-KEY"));
        assert!(!format!("{:?}", err).contains("SECRET-KEY"));
    }

    #[tokio::test]
    async fn test_undecodable_body_hides_api_key() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search/movie")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = client_for(&server).find_poster("Barbie", 2023).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert!(!err.to_string().contains("test-key"));
    }
}
