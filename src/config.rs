use chrono::FixedOffset;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::aggregator::{WindowZone, ZeroDeathsPolicy, ZeroRoundsPolicy};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Stats API root, without the version segment
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Shard / region, e.g. "na"
    #[serde(default = "default_region")]
    pub region: String,
    /// Value sent in the `Authorization` header
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.henrikdev.xyz/valorant".to_string()
}

fn default_region() -> String {
    "na".to_string()
}

fn default_user_agent() -> String {
    concat!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
        "(KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
    )
    .to_string()
}

fn default_api_timeout() -> u64 {
    15
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            region: default_region(),
            key: None,
            user_agent: default_user_agent(),
            timeout_secs: default_api_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    /// Matches requested per page; a shorter page ends the history
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Length of the competitive window in days
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// Optional hard stop on pages fetched per player
    #[serde(default)]
    pub max_pages: Option<u32>,
    /// IANA zone for midnight truncation and day-of-week checks, e.g.
    /// "America/Chicago". Takes precedence over `utc_offset_minutes`.
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Fixed offset fallback. When neither is set the binary pins the host
    /// offset at startup.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    #[serde(default)]
    pub zero_rounds: ZeroRoundsPolicy,
    #[serde(default)]
    pub zero_deaths: ZeroDeathsPolicy,
}

fn default_page_size() -> u32 {
    70
}

fn default_window_days() -> u32 {
    7
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            window_days: default_window_days(),
            max_pages: None,
            time_zone: None,
            utc_offset_minutes: None,
            zero_rounds: ZeroRoundsPolicy::default(),
            zero_deaths: ZeroDeathsPolicy::default(),
        }
    }
}

impl AggregationConfig {
    /// Configured zone, if any. Unknown zone names and out-of-range offsets
    /// are rejected.
    pub fn zone(&self) -> Result<Option<WindowZone>, ConfigError> {
        if let Some(name) = self.time_zone.as_deref().map(str::trim) {
            let tz: Tz = name.parse().map_err(|e| {
                ConfigError::Message(format!("aggregation.time_zone {:?}: {}", name, e))
            })?;
            return Ok(Some(WindowZone::Named(tz)));
        }
        match self.utc_offset_minutes {
            None => Ok(None),
            Some(minutes) => FixedOffset::east_opt(minutes * 60)
                .map(|offset| Some(WindowZone::Fixed(offset)))
                .ok_or_else(|| {
                    ConfigError::Message(format!(
                        "aggregation.utc_offset_minutes out of range: {}",
                        minutes
                    ))
                }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Endpoint receiving the JSON report; delivery is skipped when unset
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    #[serde(default = "default_report_timeout")]
    pub timeout_secs: u64,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("weeklyStats.json")
}

fn default_report_timeout() -> u64 {
    20
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            snapshot_path: default_snapshot_path(),
            timeout_secs: default_report_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    /// JSON file of `{ "name": "tag" }`
    #[serde(default = "default_roster_path")]
    pub path: PathBuf,
}

fn default_roster_path() -> PathBuf {
    PathBuf::from("players.json")
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: default_roster_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Budget for one player's rank fetch plus match aggregation
    #[serde(default = "default_player_timeout")]
    pub player_timeout_secs: u64,
}

fn default_player_timeout() -> u64 {
    300
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            player_timeout_secs: default_player_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rotated log files
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("aggregation.page_size", 70)?
            .set_default("aggregation.window_days", 7)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("AGENTSTATS_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (AGENTSTATS__API__KEY, etc.)
            .add_source(
                Environment::with_prefix("AGENTSTATS")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aggregation.page_size == 0 {
            return Err(ConfigError::Message(
                "aggregation.page_size must be at least 1".to_string(),
            ));
        }
        if self.aggregation.max_pages == Some(0) {
            return Err(ConfigError::Message(
                "aggregation.max_pages must be at least 1 when set".to_string(),
            ));
        }
        self.aggregation.zone()?;
        Ok(())
    }
}
