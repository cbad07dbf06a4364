//! schedsync configuration.
//!
//! Built once at startup from `~/.config/schedsync/config.toml`, layered with
//! `SCHEDSYNC_*` environment variables (`SCHEDSYNC_NOTION__API_KEY`, ...), and
//! handed to each component. Nothing reads configuration after that.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{SyncError, SyncResult};
use crate::window::{DEFAULT_FUTURE_DAYS, DEFAULT_PAST_DAYS, MAX_WINDOW_DAYS};

const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com/v1";
/// Google's alias for the user's main calendar
const DEFAULT_CALENDAR_ID: &str = "primary";
const DEFAULT_TIME_ZONE: &str = "Asia/Tokyo";
const DEFAULT_INTERVAL: &str = "15m";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub database_id: String,
    /// Page id of the "Schedule" tag that marks records for syncing.
    #[serde(default)]
    pub schedule_tag_id: String,
    #[serde(default = "default_notion_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub properties: PropertyNames,
}

impl Default for NotionConfig {
    fn default() -> Self {
        NotionConfig {
            api_key: String::new(),
            database_id: String::new(),
            schedule_tag_id: String::new(),
            base_url: default_notion_base_url(),
            properties: PropertyNames::default(),
        }
    }
}

/// Names of the database properties schedsync reads and writes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    pub title: String,
    pub action_day: String,
    pub status: String,
    pub event_id: String,
    pub url: String,
    pub tags: String,
    pub updated_at: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        PropertyNames {
            title: "Title".to_string(),
            action_day: "Action Day".to_string(),
            status: "Status".to_string(),
            event_id: "Event ID".to_string(),
            url: "URL".to_string(),
            tags: "Tags".to_string(),
            updated_at: "Update At".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Account email the stored OAuth session belongs to.
    #[serde(default)]
    pub account: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default)]
    pub color_id: Option<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        GoogleConfig {
            account: String::new(),
            calendar_id: default_calendar_id(),
            color_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// IANA zone attached to timed events and used for day comparisons.
    pub time_zone: String,
    /// Delay between runs in watch mode, e.g. "15m".
    pub interval: String,
    pub window_past_days: i64,
    pub window_future_days: i64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            window_past_days: DEFAULT_PAST_DAYS,
            window_future_days: DEFAULT_FUTURE_DAYS,
        }
    }
}

impl SyncSettings {
    pub fn time_zone(&self) -> SyncResult<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|_| SyncError::Config(format!("Unknown time zone '{}'", self.time_zone)))
    }

    pub fn interval(&self) -> SyncResult<Duration> {
        let interval = humantime::parse_duration(&self.interval).map_err(|e| {
            SyncError::Config(format!("Invalid sync interval '{}': {}", self.interval, e))
        })?;

        if interval.is_zero() {
            return Err(SyncError::Config("Sync interval must be greater than zero".into()));
        }

        Ok(interval)
    }
}

fn default_notion_base_url() -> String {
    DEFAULT_NOTION_BASE_URL.to_string()
}

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

impl SyncConfig {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("schedsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load and validate the configuration. `path` overrides the default location.
    pub fn load(path: Option<&Path>) -> SyncResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        let config: SyncConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("SCHEDSYNC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Report every missing or malformed setting at once.
    pub fn validate(&self) -> SyncResult<()> {
        let required = [
            ("notion.api_key", &self.notion.api_key),
            ("notion.database_id", &self.notion.database_id),
            ("notion.schedule_tag_id", &self.notion.schedule_tag_id),
            ("google.account", &self.google.account),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(SyncError::Config(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }

        let window_days = [self.sync.window_past_days, self.sync.window_future_days];
        if window_days.iter().any(|days| !(0..=MAX_WINDOW_DAYS).contains(days)) {
            return Err(SyncError::Config(format!(
                "Sync window days must be between 0 and {}",
                MAX_WINDOW_DAYS
            )));
        }

        self.sync.time_zone()?;
        self.sync.interval()?;

        Ok(())
    }

    /// Create a config file with every option present but empty.
    pub fn create_default_config(path: &Path) -> SyncResult<()> {
        let contents = format!(
            "\
# schedsync configuration

[notion]
api_key = \"\"
database_id = \"\"
# Page id of the tag that marks records for syncing:
schedule_tag_id = \"\"

[google]
# Account you authenticated with `schedsync auth`:
account = \"\"
# calendar_id = \"{DEFAULT_CALENDAR_ID}\"

[sync]
# time_zone = \"{DEFAULT_TIME_ZONE}\"
# interval = \"{DEFAULT_INTERVAL}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
