//! Timed-text input: SRT parsing, markup stripping and timestamps.

mod markup;
mod srt;
mod timestamp;

use serde::Serialize;
use std::time::Duration;

pub use markup::strip_markup;
pub use srt::{parse_srt, write_srt};
pub use timestamp::{seconds_to_timestamp, timestamp_to_seconds};

/// One subtitle cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub index: u32,
    #[serde(with = "timestamp::as_srt")]
    pub start: Duration,
    #[serde(with = "timestamp::as_srt")]
    pub end: Duration,
    pub text: String,
}

impl Record {
    pub fn start_secs(&self) -> f64 {
        self.start.as_secs_f64()
    }

    pub fn end_secs(&self) -> f64 {
        self.end.as_secs_f64()
    }
}

/// Strip markup, then parse. This is the form the finder consumes.
pub fn prepare_transcript(raw: &str) -> Vec<Record> {
    parse_srt(&strip_markup(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_strips_before_parsing() {
        let raw = "1\n00:00:01,000 --> 00:00:02,500\n<i>Hello</i>\n";
        let records = prepare_transcript(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Hello");
        assert!((records[0].end_secs() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn record_serializes_timestamps_as_srt() {
        let record = Record {
            index: 3,
            start: Duration::from_millis(1_250),
            end: Duration::from_millis(62_000),
            text: "Hi".to_string(),
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["start"], "00:00:01,250");
        assert_eq!(json["end"], "00:01:02,000");
    }
}
