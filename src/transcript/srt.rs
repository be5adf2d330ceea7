use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use super::Record;
use super::timestamp::{format_timestamp, parse_timestamp};

static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+:\d{1,2}:\d{1,2}[,.]\d{1,3})\s*-->\s*(\d+:\d{1,2}:\d{1,2}[,.]\d{1,3})")
        .expect("timing line regex")
});

/// Parse an SRT transcript into records.
///
/// A block starts after a blank line with an index line followed by a
/// `start --> end` line. Blocks with a bad index or timing line, or without
/// text, are skipped. Cue text keeps its line breaks, blank lines included.
pub fn parse_srt(input: &str) -> Vec<Record> {
    let normalized = normalize_line_endings(input);
    let normalized = normalized.trim_start_matches('\u{feff}');
    let lines: Vec<&str> = normalized.lines().collect();

    let mut records = Vec::new();
    let mut current: Option<OpenBlock> = None;
    let mut pos = 0;
    while pos < lines.len() {
        let line = lines[pos];
        let starts_chunk = pos == 0 || is_blank(lines[pos - 1]);
        if starts_chunk && !is_blank(line) {
            match read_header(&lines, pos) {
                Header::Valid(block) => {
                    records.extend(current.replace(block).and_then(OpenBlock::finish));
                    pos += 2;
                    continue;
                }
                Header::Malformed => {
                    // drop the block along with any paragraphs that follow it
                    records.extend(current.take().and_then(OpenBlock::finish));
                }
                Header::Text => {}
            }
        }
        if let Some(block) = current.as_mut() {
            block.lines.push(line);
        }
        pos += 1;
    }
    records.extend(current.and_then(OpenBlock::finish));
    records
}

fn normalize_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

struct OpenBlock<'a> {
    index: u32,
    start: Duration,
    end: Duration,
    lines: Vec<&'a str>,
}

impl OpenBlock<'_> {
    fn finish(mut self) -> Option<Record> {
        while self.lines.last().is_some_and(|line| is_blank(line)) {
            self.lines.pop();
        }
        // text has to follow the timing line directly
        if self.lines.first().is_none_or(|line| is_blank(line)) {
            return None;
        }
        let text = self
            .lines
            .iter()
            .map(|line| line.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        Some(Record {
            index: self.index,
            start: self.start,
            end: self.end,
            text,
        })
    }
}

enum Header<'a> {
    Valid(OpenBlock<'a>),
    /// Looks like the start of a block but cannot be read as one.
    Malformed,
    /// An ordinary line of cue text.
    Text,
}

fn read_header<'a>(lines: &[&'a str], pos: usize) -> Header<'a> {
    let first = lines[pos].trim();
    let second = lines.get(pos + 1).copied().unwrap_or_default();
    let index_like = first.chars().all(|c| c.is_ascii_digit());

    if !index_like {
        return if first.contains("-->") || second.contains("-->") {
            Header::Malformed
        } else {
            Header::Text
        };
    }

    let parsed = first.parse::<u32>().ok().zip(TIMING_LINE.captures(second));
    let Some((index, timing)) = parsed else {
        return Header::Malformed;
    };
    match (parse_timestamp(&timing[1]), parse_timestamp(&timing[2])) {
        (Ok(start), Ok(end)) if start <= end => Header::Valid(OpenBlock {
            index,
            start,
            end,
            lines: Vec::new(),
        }),
        _ => Header::Malformed,
    }
}

/// Render records as a standalone SRT document, renumbered from 1 and
/// shifted so that `origin` becomes 00:00:00,000.
pub fn write_srt(records: &[Record], origin: Duration) -> String {
    let mut out = String::new();
    for (number, record) in (1..).zip(records) {
        let start = record.start.saturating_sub(origin);
        let end = record.end.saturating_sub(origin);
        out.push_str(&format!(
            "{number}\n{} --> {}\n{}\n\n",
            format_timestamp(start),
            format_timestamp(end),
            record.text
        ));
    }
    out
}
