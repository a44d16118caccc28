//! Issuance-time keys and the archive's year/month/day/hour directory convention.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};

use crate::errors::{ErrorInfo, LagError};

/// Calendar key of a forecast run: a UTC instant on the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunKey(DateTime<Utc>);

impl RunKey {
    /// Builds a key when the components form a real calendar date and hour.
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Option<Self> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, 0, 0)?;
        Some(Self(Utc.from_utc_datetime(&naive)))
    }

    /// Parses four directory names (year, month, day, hour) into a key.
    ///
    /// Returns `None` for anything that is not four integers forming a valid date and hour.
    pub fn from_segments(segments: [&str; 4]) -> Option<Self> {
        let year = segments[0].parse::<i32>().ok()?;
        let month = segments[1].parse::<u32>().ok()?;
        let day = segments[2].parse::<u32>().ok()?;
        let hour = segments[3].parse::<u32>().ok()?;
        Self::new(year, month, day, hour)
    }

    /// Key of the run issued at `instant`, truncated to the hour.
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        let truncated = instant
            .with_nanosecond(0)
            .and_then(|value| value.with_second(0))
            .and_then(|value| value.with_minute(0))
            .unwrap_or(instant);
        Self(truncated)
    }

    /// UTC issuance instant of the run.
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// Archive-relative directory of the run: `<year>/<month2>/<day2>/<hour2>`.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.0.year().to_string())
            .join(format!("{:02}", self.0.month()))
            .join(format!("{:02}", self.0.day()))
            .join(format!("{:02}", self.0.hour()))
    }

    /// Compact `YYYYMMDDTHHZ` token used in artifact names.
    pub fn compact(&self) -> String {
        format!(
            "{:04}{:02}{:02}T{:02}Z",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour()
        )
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

/// Compact `YYYYMMDDTHHZ` token for an instant.
pub fn compact_token(instant: DateTime<Utc>) -> String {
    RunKey::from_instant(instant).compact()
}

/// Parses a target issuance time given either as `YYYYMMDDTHHZ` or as RFC 3339.
pub fn parse_issuance(text: &str) -> Result<DateTime<Utc>, LagError> {
    let trimmed = text.trim();
    if let Some(key) = parse_compact(trimmed) {
        return Ok(key.instant());
    }
    let parsed = DateTime::parse_from_rfc3339(trimmed).map_err(|err| {
        LagError::Config(
            ErrorInfo::new("issuance_parse", format!("unrecognised issuance time: {err}"))
                .with_context("input", trimmed)
                .with_hint("use YYYYMMDDTHHZ or an RFC 3339 timestamp"),
        )
    })?;
    let instant = parsed.with_timezone(&Utc);
    if instant.minute() != 0 || instant.second() != 0 || instant.nanosecond() != 0 {
        return Err(LagError::Config(
            ErrorInfo::new("issuance_not_hourly", "issuance times fall on the hour")
                .with_context("input", trimmed),
        ));
    }
    Ok(instant)
}

fn parse_compact(text: &str) -> Option<RunKey> {
    let body = text.strip_suffix('Z')?;
    let (date, hour) = body.split_once('T')?;
    if date.len() != 8 || hour.len() != 2 || !date.is_ascii() {
        return None;
    }
    RunKey::from_segments([&date[0..4], &date[4..6], &date[6..8], hour])
}

/// Seconds since the Unix epoch, the unit used by time-valued dataset variables.
pub fn epoch_seconds(instant: DateTime<Utc>) -> f64 {
    instant.timestamp() as f64
}

/// Converts epoch seconds back into an instant, rejecting non-finite or fractional values.
pub fn from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() || seconds.fract() != 0.0 {
        return None;
    }
    DateTime::from_timestamp(seconds as i64, 0)
}
