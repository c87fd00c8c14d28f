use anyhow::Result;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "WATCHFEED_CONFIG";

pub struct PathManager {
    config_dir: PathBuf,
    log_dir: PathBuf,
    config_override: Option<PathBuf>,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("watchfeed");
        Ok(Self::with_base(base_dir))
    }

    pub fn with_base(base_dir: PathBuf) -> Self {
        Self {
            log_dir: base_dir.join("logs"),
            config_dir: base_dir,
            config_override: std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
        }
    }

    /// `$WATCHFEED_CONFIG` when set, otherwise `config.toml` in the config dir
    pub fn config_file(&self) -> PathBuf {
        self.config_override
            .clone()
            .unwrap_or_else(|| self.config_dir.join("config.toml"))
    }

    /// Relative `logging.file` values live under the log dir
    pub fn log_file(&self, configured: &Path) -> PathBuf {
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.log_dir.join(configured)
        }
    }
}

impl Default for PathManager {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_base(PathBuf::from(".watchfeed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_under_base() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = PathManager::with_base(dir.path().join("watchfeed"));
        paths.config_override = None;

        assert_eq!(paths.config_file(), dir.path().join("watchfeed").join("config.toml"));
    }

    #[test]
    fn test_log_file_resolution() {
        let paths = PathManager::with_base(PathBuf::from("/home/u/.config/watchfeed"));
        assert_eq!(
            paths.log_file(Path::new("watchfeed.log")),
            PathBuf::from("/home/u/.config/watchfeed/logs/watchfeed.log")
        );
        assert_eq!(
            paths.log_file(Path::new("/var/log/watchfeed.log")),
            PathBuf::from("/var/log/watchfeed.log")
        );
    }

    #[test]
    fn test_config_override_wins() {
        let mut paths = PathManager::with_base(PathBuf::from("/tmp/watchfeed"));
        paths.config_override = Some(PathBuf::from("/etc/watchfeed.toml"));
        assert_eq!(paths.config_file(), PathBuf::from("/etc/watchfeed.toml"));
    }
}
