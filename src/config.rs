use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::contests::contest_type::parse_timestamp;
use crate::contests::feed::FeedSource;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("set CONTEST_FEED_URL, CONTEST_FEED_FILE or COUNTDOWN_TARGET")]
    NoSource,
    #[error("{key} is not a valid URL: {source}")]
    InvalidUrl { key: &'static str, source: url::ParseError },
    #[error("{key} has an unreadable value: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub feed: Option<FeedSource>,
    pub target: Option<DateTime<Utc>>,
    pub tick: Duration,
    pub refresh: Duration,
    pub show_seconds: bool,
    pub log_level: log::LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let feed = if let Some(raw) = get("CONTEST_FEED_URL") {
            let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
                key: "CONTEST_FEED_URL",
                source,
            })?;
            Some(FeedSource::Http(url))
        } else {
            get("CONTEST_FEED_FILE").map(|path| FeedSource::File(PathBuf::from(path)))
        };

        let target = match get("COUNTDOWN_TARGET") {
            Some(raw) => Some(parse_timestamp(&raw).ok_or(ConfigError::InvalidValue {
                key: "COUNTDOWN_TARGET",
                value: raw,
            })?),
            None => None,
        };
        if feed.is_none() && target.is_none() {
            return Err(ConfigError::NoSource);
        }

        let seconds = |key: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match get(key) {
                None => Ok(Duration::from_secs(default)),
                Some(raw) => match raw.trim().parse::<u64>() {
                    Ok(n) if n > 0 => Ok(Duration::from_secs(n)),
                    _ => Err(ConfigError::InvalidValue { key, value: raw }),
                },
            }
        };

        let show_seconds = match get("COUNTDOWN_SHOW_SECONDS") {
            None => true,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "COUNTDOWN_SHOW_SECONDS",
                        value: raw,
                    })
                }
            },
        };

        let log_level = match get("COUNTDOWN_LOG_LEVEL") {
            None => log::LevelFilter::Info,
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "COUNTDOWN_LOG_LEVEL",
                value: raw.clone(),
            })?,
        };

        Ok(Config {
            feed,
            target,
            tick: seconds("COUNTDOWN_TICK_SECONDS", 1)?,
            refresh: seconds("CONTEST_REFRESH_SECONDS", 3600)?,
            show_seconds,
            log_level,
            log_file: get("COUNTDOWN_LOG_FILE").map(PathBuf::from),
        })
    }
}
