//! Configuration management.
//!
//! Settings load from a TOML file with sensible defaults for every
//! field, so the tool runs without any config file at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Thresholds and report bounds
    pub finder: FinderConfig,

    /// Official MAL API settings
    pub mal: MalConfig,

    /// Jikan fallback API settings
    pub jikan: JikanConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Thresholds applied by the finder pipeline and report bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Minimum mean score a candidate needs before its detail is fetched
    pub min_score: f64,

    /// Minimum number of scoring users before a detail fetch is spent
    pub min_scored_by: u64,

    /// Minimum number of score-10 votes required to qualify
    pub min_ten_votes: u64,

    /// Number of ranked entries kept in the final report
    pub top_n: usize,

    /// Number of entries printed to the console
    pub display_limit: usize,

    /// Emit a progress milestone every N processed candidates
    pub progress_every: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            min_score: 7.0,
            min_scored_by: 5000,
            min_ten_votes: 35,
            top_n: 100,
            display_limit: 30,
            progress_every: 50,
        }
    }
}

/// Official MAL API v2 settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MalConfig {
    /// API base URL
    pub base_url: String,

    /// Entries per ranking page (service maximum is 500)
    pub page_size: u32,

    /// Ranking pages to walk before stopping
    pub max_pages: u32,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

impl Default for MalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.myanimelist.net/v2".to_string(),
            page_size: 500,
            max_pages: 5,
            rate_limit: RateLimitConfig {
                list_requests_per_second: 2.0,
                detail_requests_per_second: 10.0,
                requests_per_minute: 300,
            },
        }
    }
}

/// Jikan API v4 settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanConfig {
    /// API base URL
    pub base_url: String,

    /// Entries per ranking page (service maximum is 25)
    pub page_size: u32,

    /// Ranking pages to walk before stopping
    pub max_pages: u32,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            page_size: 25,
            max_pages: 10,
            rate_limit: RateLimitConfig {
                list_requests_per_second: 2.0,
                detail_requests_per_second: 3.0,
                requests_per_minute: 60,
            },
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Spacing between ranking-page requests
    pub list_requests_per_second: f64,

    /// Spacing between detail requests
    pub detail_requests_per_second: f64,

    /// Maximum requests per rolling minute
    pub requests_per_minute: u32,
}

impl RateLimitConfig {
    /// Limits that never wait. Used by tests against mock servers.
    pub fn unlimited() -> Self {
        Self {
            list_requests_per_second: f64::INFINITY,
            detail_requests_per_second: f64::INFINITY,
            requests_per_minute: u32::MAX,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the report file is written to
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Directory the report file is written to
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.dir)
    }
}
