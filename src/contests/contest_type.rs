use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContestError {
    #[error("contest \"{0}\" has no start time")]
    MissingStart(String),
    #[error("contest \"{name}\" has an unreadable start time: {raw}")]
    InvalidStart { name: String, raw: String },
    #[error("contest \"{0}\" ends before it starts")]
    EndsBeforeStart(String),
}

/// Informational length as delivered by the feed.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum FeedDuration {
    Text(String),
    Seconds(f64),
}

/// A start or end time as delivered by the feed. Any JSON value is accepted so
/// that one odd record never fails the whole list.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum FeedTime {
    Text(String),
    /// Unix seconds.
    Epoch(f64),
    Unreadable(serde_json::Value),
}

impl FeedTime {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            FeedTime::Text(text) => parse_timestamp(text),
            FeedTime::Epoch(seconds) if seconds.is_finite() => {
                DateTime::from_timestamp(*seconds as i64, 0)
            }
            _ => None,
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, FeedTime::Text(text) if text.trim().is_empty())
    }
}

impl From<&str> for FeedTime {
    fn from(text: &str) -> Self {
        FeedTime::Text(text.to_string())
    }
}

impl fmt::Display for FeedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedTime::Text(text) => f.write_str(text),
            FeedTime::Epoch(seconds) => write!(f, "{}", seconds),
            FeedTime::Unreadable(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Deserialize, Serialize, Default, Clone, Debug, PartialEq)]
pub struct Contest {
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Platform", alias = "site", default)]
    pub platform: String,
    #[serde(alias = "StartTime", default)]
    pub start_time: Option<FeedTime>,
    #[serde(alias = "EndTime", default)]
    pub end_time: Option<FeedTime>,
    #[serde(alias = "Duration", default)]
    pub duration: Option<FeedDuration>,
    #[serde(default)]
    pub url: String,
}

impl Contest {
    pub fn starts_at(&self) -> Result<DateTime<Utc>, ContestError> {
        let raw = self
            .start_time
            .as_ref()
            .filter(|time| !time.is_blank())
            .ok_or_else(|| ContestError::MissingStart(self.name.clone()))?;
        raw.instant().ok_or_else(|| ContestError::InvalidStart {
            name: self.name.clone(),
            raw: raw.to_string(),
        })
    }

    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.end_time.as_ref().and_then(FeedTime::instant)
    }

    /// `end - start` when both ends of the contest are readable.
    pub fn length(&self) -> Option<TimeDelta> {
        let start = self.starts_at().ok()?;
        self.ends_at().map(|end| end - start)
    }

    /// Start time of a record that may take part in scheduling.
    pub fn validate(&self) -> Result<DateTime<Utc>, ContestError> {
        let start = self.starts_at()?;
        match self.ends_at() {
            Some(end) if end < start => Err(ContestError::EndsBeforeStart(self.name.clone())),
            _ => Ok(start),
        }
    }

    pub fn duration_text(&self) -> String {
        let seconds = match &self.duration {
            // aggregator feeds send seconds as a string ("10800.0")
            Some(FeedDuration::Text(text)) => match text.trim().parse::<f64>() {
                Ok(seconds) => seconds,
                Err(_) => return text.clone(),
            },
            Some(FeedDuration::Seconds(seconds)) => *seconds,
            None => {
                return self.length().map(format_length).unwrap_or_else(|| "-".to_string());
            }
        };
        seconds_to_delta(seconds)
            .map(format_length)
            .unwrap_or_else(|| "-".to_string())
    }
}

fn seconds_to_delta(seconds: f64) -> Option<TimeDelta> {
    if !seconds.is_finite() {
        return None;
    }
    TimeDelta::try_seconds(seconds as i64)
}

fn format_length(length: TimeDelta) -> String {
    let minutes = length.num_minutes();
    let days = minutes / (60 * 24);
    let hours = (minutes % (60 * 24)) / 60;
    let minutes = minutes % 60;
    if days > 0 {
        format!("{} days {}h {}m", days, hours, minutes)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S UTC",
    "%Y-%m-%d %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%b %d, %Y %H:%M",
];
const DATE_FORMATS: [&str; 2] = ["%b %d, %Y", "%Y-%m-%d"];

/// Reads the timestamp shapes contest feeds are known to use. Forms without an
/// offset are taken as UTC, dates without a time as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(raw, format) {
            return Some(time.with_timezone(&Utc));
        }
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn contest(start: Option<&str>, end: Option<&str>) -> Contest {
        Contest {
            name: "Weekly Round".to_string(),
            platform: "CODEFORCES".to_string(),
            start_time: start.map(FeedTime::from),
            end_time: end.map(FeedTime::from),
            duration: None,
            url: "https://example.com/round".to_string(),
        }
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2021, 10, 15, 18, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2021-10-15T18:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2021-10-15T18:00:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2021-10-16 03:00:00+0900"), Some(expected));
        assert_eq!(parse_timestamp("2021-10-15 18:00:00 UTC"), Some(expected));
        assert_eq!(parse_timestamp("Fri, 15 Oct 2021 18:00"), Some(expected));
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn test_parse_date_only_as_midnight() {
        let midnight = Utc.with_ymd_and_hms(2021, 11, 4, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("Nov 4, 2021"), Some(midnight));
        assert_eq!(parse_timestamp("2021-11-04"), Some(midnight));
        assert_eq!(parse_timestamp("Nov 31, 2021"), None);
    }

    #[test]
    fn test_deserialize_panel_shape() {
        let raw = r#"{
            "Name": "Data Story Telling",
            "Platform": "HACKEREARTH",
            "StartTime": "Fri, 15 Oct 2021 18:00",
            "EndTime": "Sun, 24 Oct 2021 23:55",
            "Duration": "9 days 5h 55m",
            "challenge_type": "contest",
            "url": "https://www.hackerearth.com/challenges/hiring/data-story-telling/"
        }"#;
        let contest: Contest = serde_json::from_str(raw).unwrap();
        assert_eq!(contest.name, "Data Story Telling");
        assert_eq!(contest.platform, "HACKEREARTH");
        assert_eq!(contest.duration_text(), "9 days 5h 55m");
        assert_eq!(
            contest.length(),
            Some(TimeDelta::days(9) + TimeDelta::hours(5) + TimeDelta::minutes(55))
        );
    }

    #[test]
    fn test_deserialize_aggregator_shape() {
        let raw = r#"{
            "name": "Starters 10",
            "site": "CodeChef",
            "start_time": "2021-10-04T12:30:00.000Z",
            "end_time": "2021-10-04T15:30:00.000Z",
            "duration": "10800.0",
            "url": "https://www.codechef.com/START10"
        }"#;
        let contest: Contest = serde_json::from_str(raw).unwrap();
        assert_eq!(contest.platform, "CodeChef");
        assert_eq!(
            contest.validate(),
            Ok(Utc.with_ymd_and_hms(2021, 10, 4, 12, 30, 0).unwrap())
        );
        assert_eq!(contest.duration_text(), "3h 0m");

        let numeric: Contest = serde_json::from_str(r#"{"name": "x", "duration": 5400}"#).unwrap();
        assert_eq!(numeric.duration_text(), "1h 30m");
        assert_eq!(numeric.start_time, None);
    }

    #[test]
    fn test_out_of_range_duration_is_unknown() {
        let huge: Contest = serde_json::from_str(
            r#"{"name": "x", "start_time": "2021-10-04T12:30:00Z", "duration": 1e300}"#,
        )
        .unwrap();
        assert_eq!(huge.duration_text(), "-");

        let text = Contest {
            duration: Some(FeedDuration::Text("inf".to_string())),
            ..Default::default()
        };
        assert_eq!(text.duration_text(), "-");
    }

    #[test]
    fn test_non_string_times() {
        let epoch: Contest =
            serde_json::from_str(r#"{"name": "epoch", "start_time": 1633350600}"#).unwrap();
        assert_eq!(
            epoch.validate(),
            Ok(Utc.with_ymd_and_hms(2021, 10, 4, 12, 30, 0).unwrap())
        );

        let object: Contest =
            serde_json::from_str(r#"{"name": "odd", "start_time": {"at": 1}, "end_time": [1]}"#)
                .unwrap();
        assert!(matches!(object.validate(), Err(ContestError::InvalidStart { .. })));
        assert_eq!(object.ends_at(), None);

        let null: Contest =
            serde_json::from_str(r#"{"name": "null", "start_time": null}"#).unwrap();
        assert_eq!(
            null.validate(),
            Err(ContestError::MissingStart("null".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        assert_eq!(
            contest(None, None).validate(),
            Err(ContestError::MissingStart("Weekly Round".to_string()))
        );
        assert_eq!(
            contest(Some("  "), None).validate(),
            Err(ContestError::MissingStart("Weekly Round".to_string()))
        );
        assert!(matches!(
            contest(Some("soon"), None).validate(),
            Err(ContestError::InvalidStart { .. })
        ));
        assert_eq!(
            contest(Some("2021-10-04T12:30:00Z"), Some("2021-10-04T10:00:00Z")).validate(),
            Err(ContestError::EndsBeforeStart("Weekly Round".to_string()))
        );
        // an unreadable end does not invalidate the start
        assert!(contest(Some("2021-10-04T12:30:00Z"), Some("later")).validate().is_ok());
    }
}
