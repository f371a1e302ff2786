use std::path::PathBuf;

use thiserror::Error;
use time::Date;

/// Request-level failure classification. Each variant maps to one localized message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("sheet source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("no column for date {0}")]
    NoDataForDate(Date),

    #[error("invalid date format: {0:?}")]
    InvalidDateFormat(String),

    #[error("invalid range format: {0:?}")]
    InvalidRangeFormat(String),

    #[error("unknown project tag: {0:?}")]
    UnknownProject(String),

    #[error("no active projects in the secondary sheet")]
    NoActiveProjects,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse {raw:?} as a number")]
pub struct ParseError {
    pub raw: String,
}

impl ParseError {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("fetch timed out")]
    Timeout,
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("delivery rejected: {0}")]
    Rejected(String),

    #[error("delivery transport failed: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("template `{template}` uses unknown slot `{slot}`")]
    UnknownSlot {
        template: &'static str,
        slot: String,
    },

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, BotError>;
