//! Bot configuration loading.
//!
//! Loads a TOML file (path from `--config` or `SHEETBOT_CONFIG`); every section falls back to
//! built-in defaults matching the live spreadsheets. Secrets are never stored in the file,
//! only the names of the environment variables that hold them.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use time::{Date, UtcOffset};
use tracing::info;

use crate::dates::parse_user_date;
use crate::domain::CatalogEntry;
use crate::error::ConfigError;
use crate::profile::{SheetKind, SheetProfile};
use crate::render::{Messages, Templates};

pub const CONFIG_ENV: &str = "SHEETBOT_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub delivery: DeliveryConfig,
    pub schedule: ScheduleConfig,
    pub profiles: Profiles,
    pub templates: Templates,
    pub messages: Messages,
    pub catalog: Vec<CatalogEntry>,
    /// First day with data, `DD.MM.YYYY`.
    pub data_available_from: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            delivery: DeliveryConfig::default(),
            schedule: ScheduleConfig::default(),
            profiles: Profiles::default(),
            templates: Templates::default(),
            messages: Messages::default(),
            catalog: default_catalog(),
            data_available_from: "14.10.2024".to_string(),
        }
    }
}

fn default_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            tag: "[П1]".to_string(),
            label: "Проект 1".to_string(),
        },
        CatalogEntry {
            tag: "[П37]".to_string(),
            label: "Проект 37".to_string(),
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceBackend {
    GoogleSheets,
    JsonFiles,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub backend: SourceBackend,
    pub primary_spreadsheet_id: String,
    pub secondary_spreadsheet_id: String,
    pub api_base: String,
    /// Environment variable holding a Sheets API key.
    pub api_key_env: String,
    /// Environment variable holding an OAuth bearer token; preferred over the API key.
    pub access_token_env: String,
    pub timeout_secs: u64,
    /// Directory with `primary.json` / `secondary.json` for the `json_files` backend.
    pub json_dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend: SourceBackend::GoogleSheets,
            primary_spreadsheet_id: String::new(),
            secondary_spreadsheet_id: String::new(),
            api_base: "https://sheets.googleapis.com".to_string(),
            api_key_env: "GOOGLE_SHEETS_API_KEY".to_string(),
            access_token_env: "GOOGLE_SHEETS_TOKEN".to_string(),
            timeout_secs: 30,
            json_dir: PathBuf::from("sheets"),
        }
    }
}

impl SourceConfig {
    pub fn spreadsheet_id(&self, kind: SheetKind) -> &str {
        match kind {
            SheetKind::Primary => &self.primary_spreadsheet_id,
            SheetKind::Secondary => &self.secondary_spreadsheet_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryBackend {
    Telegram,
    Stdout,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub backend: DeliveryBackend,
    pub api_base: String,
    /// Environment variable holding the bot token.
    pub token_env: String,
    /// Chat receiving scheduled reports.
    pub group_chat_id: Option<i64>,
    pub admin_chat_id: Option<i64>,
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            backend: DeliveryBackend::Stdout,
            api_base: "https://api.telegram.org".to_string(),
            token_env: "BOT_TOKEN".to_string(),
            group_chat_id: None,
            admin_chat_id: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub hour: u8,
    pub minute: u8,
    /// Fixed offset of the report time zone.
    pub utc_offset_hours: i8,
    /// Display name of the zone; informational only.
    pub timezone: String,
    pub tick_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            hour: 9,
            minute: 0,
            utc_offset_hours: 3,
            timezone: "Europe/Moscow".to_string(),
            tick_seconds: 55,
        }
    }
}

impl ScheduleConfig {
    pub fn utc_offset(&self) -> Result<UtcOffset, ConfigError> {
        UtcOffset::from_hms(self.utc_offset_hours, 0, 0).map_err(|e| ConfigError::Invalid {
            field: "schedule.utc_offset_hours",
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Profiles {
    pub primary: SheetProfile,
    pub secondary: SheetProfile,
}

impl Default for Profiles {
    fn default() -> Self {
        Self {
            primary: SheetProfile::primary(),
            secondary: SheetProfile::secondary(),
        }
    }
}

impl Profiles {
    pub fn get(&self, kind: SheetKind) -> &SheetProfile {
        match kind {
            SheetKind::Primary => &self.primary,
            SheetKind::Secondary => &self.secondary,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Explicit path, then `SHEETBOT_CONFIG`, then built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load(&path),
            None => {
                info!("no config file given, using built-in defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in [SheetKind::Primary, SheetKind::Secondary] {
            self.profiles
                .get(kind)
                .validate(kind)
                .map_err(|reason| ConfigError::Invalid {
                    field: "profiles",
                    reason,
                })?;
        }
        self.templates.validate()?;
        self.messages.validate()?;
        self.schedule.utc_offset()?;
        if self.schedule.hour > 23 || self.schedule.minute > 59 {
            return Err(ConfigError::Invalid {
                field: "schedule",
                reason: format!(
                    "{}:{:02} is not a wall-clock time",
                    self.schedule.hour, self.schedule.minute
                ),
            });
        }
        if self.schedule.tick_seconds == 0 || self.schedule.tick_seconds > 60 {
            return Err(ConfigError::Invalid {
                field: "schedule.tick_seconds",
                reason: "must be between 1 and 60 so every minute is observed".to_string(),
            });
        }
        self.available_from()?;
        Ok(())
    }

    pub fn available_from(&self) -> Result<Date, ConfigError> {
        let text = self.data_available_from.trim();
        let invalid = || ConfigError::Invalid {
            field: "data_available_from",
            reason: format!("{text:?} is not DD.MM.YYYY"),
        };
        // the year is mandatory here
        if text.split('.').count() != 3 {
            return Err(invalid());
        }
        parse_user_date(text, 0).map_err(|_| invalid())
    }
}
