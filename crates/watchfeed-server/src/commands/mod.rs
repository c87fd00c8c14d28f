pub mod analytics;
pub mod config;
pub mod feed;
pub mod serve;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use watchfeed_config::{is_valid_username, Config, PathManager};
use watchfeed_core::{ServiceOptions, WatchFeedService};
use watchfeed_models::StarRating;
use watchfeed_sources::{LetterboxdClient, NoPosterLookup, PosterLookup, TmdbClient};

pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathManager::default().config_file())
}

/// File (or defaults) with environment overrides applied. Not yet validated.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(path)
        .map_err(|e| eyre!("Failed to load config from {}: {}", path.display(), e))?;
    config.apply_env_overrides().map_err(|e| eyre!("{}", e))?;
    resolve_log_file(&mut config, &PathManager::default());
    Ok(config)
}

fn resolve_log_file(config: &mut Config, paths: &PathManager) {
    if let Some(file) = config.logging.file.take() {
        config.logging.file = Some(paths.log_file(&file));
    }
}

pub fn build_service(config: &Config, with_posters: bool) -> Result<WatchFeedService> {
    let fetcher = LetterboxdClient::new(
        config.letterboxd.base_url.clone(),
        Duration::from_secs(config.letterboxd.timeout_secs),
    )?;

    let posters: Arc<dyn PosterLookup> = match config.tmdb_api_key() {
        Some(api_key) if with_posters => Arc::new(
            TmdbClient::new(api_key, Duration::from_secs(config.tmdb.timeout_secs))?
                .with_base_url(config.tmdb.base_url.clone())
                .with_image_base_url(config.tmdb.image_base_url.clone()),
        ),
        _ => Arc::new(NoPosterLookup),
    };

    let options = ServiceOptions {
        feed_limit: config.letterboxd.feed_limit,
        analytics_feed_limit: config.analytics.feed_limit,
        recent_limit: config.analytics.recent_limit,
        enrichment_concurrency: config.tmdb.concurrency,
    };
    Ok(WatchFeedService::new(Arc::new(fetcher), posters, options))
}

pub fn resolve_username(argument: Option<String>, config: &Config) -> Result<String> {
    let username = argument.unwrap_or_else(|| config.letterboxd.username.clone());
    if username.is_empty() {
        return Err(eyre!(
            "No username given. Pass one or set letterboxd.username in the config file"
        ));
    }
    if !is_valid_username(&username) {
        return Err(eyre!(
            "'{}' is not a valid Letterboxd username (letters, digits and underscores only)",
            username
        ));
    }
    Ok(username)
}

/// "★★★½" rendering for terminal tables
pub fn star_glyphs(rating: StarRating) -> String {
    let halves = rating.halves() as usize;
    let mut stars = "★".repeat(halves / 2);
    if halves % 2 == 1 {
        stars.push('½');
    }
    stars
}
