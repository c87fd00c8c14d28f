use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub letterboxd: LetterboxdConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterboxdConfig {
    /// Member whose feed `GET /api/letterboxd` serves
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_letterboxd_base_url")]
    pub base_url: String,
    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,
    #[serde(default = "default_letterboxd_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Overridden by the TMDB_API_KEY environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_tmdb_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_tmdb_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_tmdb_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// Cap on records aggregated; unset means the whole feed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json_logging")]
    pub json: bool,
    /// Daily-rotated log file; relative paths resolve under the log dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_letterboxd_base_url() -> String {
    "https://letterboxd.com".to_string()
}

fn default_feed_limit() -> usize {
    12
}

fn default_letterboxd_timeout_secs() -> u64 {
    10
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_tmdb_timeout_secs() -> u64 {
    5
}

fn default_tmdb_concurrency() -> usize {
    4
}

fn default_recent_limit() -> usize {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json_logging() -> bool {
    use std::io::IsTerminal;
    !std::io::stdout().is_terminal()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LetterboxdConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            base_url: default_letterboxd_base_url(),
            feed_limit: default_feed_limit(),
            timeout_secs: default_letterboxd_timeout_secs(),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_key: None,
            base_url: default_tmdb_base_url(),
            image_base_url: default_tmdb_image_base_url(),
            timeout_secs: default_tmdb_timeout_secs(),
            concurrency: default_tmdb_concurrency(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            feed_limit: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json_logging(),
            file: None,
        }
    }
}

/// Letterboxd usernames are ASCII letters, digits and underscores
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty() && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise starts from defaults
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            debug!(path = %path.display(), "Loading config file");
            Self::load_from_file(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Applies TMDB_API_KEY, WATCHFEED_LETTERBOXD_USER and WATCHFEED_PORT
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(key) = lookup("TMDB_API_KEY").filter(|k| !k.is_empty()) {
            self.tmdb.api_key = Some(key);
        }
        if let Some(username) = lookup("WATCHFEED_LETTERBOXD_USER").filter(|u| !u.is_empty()) {
            self.letterboxd.username = username;
        }
        if let Some(port) = lookup("WATCHFEED_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid WATCHFEED_PORT '{}': {}", port, e))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.letterboxd.username.is_empty() && !is_valid_username(&self.letterboxd.username) {
            return Err(anyhow::anyhow!(
                "letterboxd.username '{}' may only contain letters, digits and underscores",
                self.letterboxd.username
            ));
        }
        if self.letterboxd.feed_limit == 0 {
            return Err(anyhow::anyhow!("letterboxd.feed_limit must be greater than zero"));
        }
        if self.letterboxd.timeout_secs == 0 {
            return Err(anyhow::anyhow!("letterboxd.timeout_secs must be greater than zero"));
        }
        if self.tmdb.timeout_secs == 0 {
            return Err(anyhow::anyhow!("tmdb.timeout_secs must be greater than zero"));
        }
        if self.tmdb.concurrency == 0 {
            return Err(anyhow::anyhow!("tmdb.concurrency must be greater than zero"));
        }
        if self.analytics.recent_limit == 0 {
            return Err(anyhow::anyhow!("analytics.recent_limit must be greater than zero"));
        }
        if self.analytics.feed_limit == Some(0) {
            return Err(anyhow::anyhow!("analytics.feed_limit must be greater than zero when set"));
        }

        if self.tmdb.enabled && self.tmdb_api_key().is_none() {
            warn!("TMDB is enabled but no api key is configured; posters will be skipped");
        }
        Ok(())
    }

    /// API key to use for poster lookups, if enrichment can run at all
    pub fn tmdb_api_key(&self) -> Option<&str> {
        self.tmdb
            .api_key
            .as_deref()
            .filter(|key| self.tmdb.enabled && !key.is_empty())
    }
}
