//! `HH:MM:SS,mmm` timestamps as used by SRT transcripts.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp '{0}' is not in HH:MM:SS,mmm form")]
    Malformed(String),
    #[error("timestamp '{value}' has an out-of-range {field} component")]
    OutOfRange { value: String, field: &'static str },
}

/// Parse `HH:MM:SS,mmm` (a `.` before the milliseconds is accepted too).
pub fn parse_timestamp(value: &str) -> Result<Duration, TimestampError> {
    let malformed = || TimestampError::Malformed(value.to_string());

    let cleaned = value.trim().replace('.', ",");
    let (time_part, fractional_part) = cleaned.split_once(',').unwrap_or((&cleaned, "0"));

    let mut hms = time_part.split(':');
    let mut component = || -> Result<u64, TimestampError> {
        hms.next()
            .filter(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
            .and_then(|part| part.parse::<u64>().ok())
            .ok_or_else(malformed)
    };
    let hours = component()?;
    let minutes = component()?;
    let seconds = component()?;
    if hms.next().is_some() {
        return Err(malformed());
    }
    if minutes >= 60 {
        return Err(TimestampError::OutOfRange {
            value: value.to_string(),
            field: "minutes",
        });
    }
    if seconds >= 60 {
        return Err(TimestampError::OutOfRange {
            value: value.to_string(),
            field: "seconds",
        });
    }

    if fractional_part.is_empty() || !fractional_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    // "5" means 500ms, "05" means 50ms; anything past milliseconds is dropped
    let mut millis_str: String = fractional_part.chars().take(3).collect();
    while millis_str.len() < 3 {
        millis_str.push('0');
    }
    let millis = millis_str.parse::<u64>().map_err(|_| malformed())?;

    let out_of_range = || TimestampError::OutOfRange {
        value: value.to_string(),
        field: "hours",
    };
    let total_seconds = hours
        .checked_mul(3600)
        .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
        .ok_or_else(out_of_range)?;
    Duration::from_secs(total_seconds)
        .checked_add(Duration::from_millis(millis))
        .ok_or_else(out_of_range)
}

pub fn format_timestamp(value: Duration) -> String {
    let total_millis = value.as_millis();
    let millis = total_millis % 1000;
    let total_seconds = total_millis / 1000;
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let hours = total_seconds / 3600;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

pub fn timestamp_to_seconds(value: &str) -> Result<f64, TimestampError> {
    parse_timestamp(value).map(|d| d.as_millis() as f64 / 1000.0)
}

/// Inverse of [`timestamp_to_seconds`]; rounds to the nearest millisecond.
pub fn seconds_to_timestamp(seconds: f64) -> String {
    format_timestamp(duration_from_secs(seconds))
}

pub fn duration_from_secs(seconds: f64) -> Duration {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_millis((seconds * 1000.0).round() as u64)
}

/// Serialize a `Duration` field as an SRT timestamp string.
pub mod as_srt {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(*value))
    }
}
