pub mod google_sheets;
pub mod json_file;
pub mod stdout;
pub mod telegram;

use sheetbot_core::config::{DeliveryBackend, DeliveryConfig, SourceBackend, SourceConfig};
use sheetbot_core::error::{BotError, ConfigError, DeliveryError, SourceError};
use sheetbot_core::grid::Grid;
use sheetbot_core::{GridSource, NotificationSink, Rendered, SheetKind, SheetProfile, Target};

use google_sheets::{Credential, GoogleSheetsSource};
use json_file::JsonFileSource;
use stdout::StdoutSink;
use telegram::TelegramSink;

pub enum AnySource {
    GoogleSheets(GoogleSheetsSource),
    JsonFiles(JsonFileSource),
}

impl GridSource for AnySource {
    async fn fetch(&self, kind: SheetKind, profile: &SheetProfile) -> Result<Grid, SourceError> {
        match self {
            AnySource::GoogleSheets(s) => s.fetch(kind, profile).await,
            AnySource::JsonFiles(s) => s.fetch(kind, profile).await,
        }
    }
}

pub enum AnySink {
    Telegram(TelegramSink),
    Stdout(StdoutSink),
}

impl NotificationSink for AnySink {
    async fn deliver(&self, message: &Rendered, target: Target) -> Result<(), DeliveryError> {
        match self {
            AnySink::Telegram(s) => s.deliver(message, target).await,
            AnySink::Stdout(s) => s.deliver(message, target).await,
        }
    }
}

fn secret(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

pub fn open_source(config: &SourceConfig) -> Result<AnySource, BotError> {
    match config.backend {
        SourceBackend::JsonFiles => Ok(AnySource::JsonFiles(JsonFileSource::new(
            config.json_dir.clone(),
        ))),
        SourceBackend::GoogleSheets => {
            let credential = secret(&config.access_token_env)
                .map(Credential::Bearer)
                .or_else(|| secret(&config.api_key_env).map(Credential::ApiKey))
                .ok_or_else(|| ConfigError::Invalid {
                    field: "source",
                    reason: format!(
                        "set {} or {} to read the sheets",
                        config.access_token_env, config.api_key_env
                    ),
                })?;
            Ok(AnySource::GoogleSheets(GoogleSheetsSource::new(config, credential)?))
        }
    }
}

/// Console targets always print, whatever backend is configured.
pub fn open_sink(config: &DeliveryConfig, target: Target) -> Result<AnySink, BotError> {
    if target == Target::Console || config.backend == DeliveryBackend::Stdout {
        return Ok(AnySink::Stdout(StdoutSink));
    }
    let token = secret(&config.token_env).ok_or_else(|| ConfigError::Invalid {
        field: "delivery.token_env",
        reason: format!("{} is not set", config.token_env),
    })?;
    Ok(AnySink::Telegram(TelegramSink::new(
        &config.api_base,
        &token,
        config.timeout_secs,
    )?))
}
