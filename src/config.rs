//! Configuration file handling.
//!
//! Settings are read from a TOML file; command-line flags override them.
//!
//! # Configuration Location
//!
//! - Linux: `~/.config/plecost/config.toml`
//! - macOS: `~/Library/Application Support/plecost/config.toml`
//! - Windows: `%APPDATA%\plecost\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! timeout_secs = 10
//! concurrency = 4
//! retry_attempts = 2
//! retry_backoff_ms = 500
//! user_agent = "plecost/0.1.0"
//! data_path = "/usr/share/plecost/plecost.json"
//! wordlist = "/usr/share/plecost/plugin_list.txt"
//! max_plugins = 200
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::{RetryPolicy, ScanOptions, DEFAULT_CONCURRENCY};

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use plecost::Config;
///
/// let config = Config::load().unwrap();
/// println!("Timeout: {}s", config.timeout_secs);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout, in seconds.
    ///
    /// Default: 10
    pub timeout_secs: u64,

    /// Maximum number of plugin probes in flight.
    ///
    /// Kept low so the target is not flooded. Default: 4
    pub concurrency: usize,

    /// Attempts per probe when requests time out. Other failures are never
    /// retried.
    ///
    /// Default: 2
    pub retry_attempts: u32,

    /// Base delay between attempts; grows linearly. Default: 500
    pub retry_backoff_ms: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Vulnerability dataset used when `--data` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    /// Plugin candidate list used when `--wordlist` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wordlist: Option<PathBuf>,

    /// Only the first N wordlist entries are probed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_plugins: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            concurrency: DEFAULT_CONCURRENCY,
            retry_attempts: 2,
            retry_backoff_ms: 500,
            user_agent: default_user_agent(),
            data_path: None,
            wordlist: None,
            max_plugins: None,
        }
    }
}

pub fn default_user_agent() -> String {
    format!("plecost/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Loads configuration from the default location, falling back to
    /// defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration, creating the parent directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plecost")
            .join("config.toml")
    }

    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            timeout: self.timeout(),
            concurrency: self.concurrency,
            retry: self.retry_policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.retry_attempts, 2);
        assert!(config.user_agent.starts_with("plecost/"));
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str("concurrency = 8\nmax_plugins = 50\n").unwrap();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.max_plugins, Some(50));
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_scan_options() {
        let config = Config {
            timeout_secs: 3,
            retry_attempts: 4,
            retry_backoff_ms: 100,
            ..Config::default()
        };
        let options = config.scan_options();
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert_eq!(options.retry, RetryPolicy::new(4, Duration::from_millis(100)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = 30\ndata_path = \"/data/plecost.json\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.data_path, Some(PathBuf::from("/data/plecost.json")));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/plecost/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "concurrency = \"many\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_default_config_round_trips() {
        let rendered = Config::generate_default_config();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
