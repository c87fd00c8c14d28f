pub mod config;
pub mod paths;

pub use config::{is_valid_username, AnalyticsConfig, Config, LetterboxdConfig, LoggingConfig, ServerConfig, TmdbConfig};
pub use paths::PathManager;
