use serde::Serialize;

use crate::transcript::Record;

/// Positions (into the record slice) of a triplet's frames. `frame3` always
/// directly follows `frame2`; fillers sit between `start` and `frame2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameSlots {
    pub start: usize,
    pub frame2: usize,
    pub frame3: usize,
}

impl FrameSlots {
    pub fn new(start: usize, fillers: usize) -> Self {
        let frame2 = start + 1 + fillers;
        Self {
            start,
            frame2,
            frame3: frame2 + 1,
        }
    }

    pub fn time_range(&self, records: &[Record]) -> TimeRange {
        TimeRange::new(records[self.start].start_secs(), records[self.frame3].end_secs())
    }

    pub fn materialize(&self, records: &[Record], keyword: &str) -> Triplet {
        Triplet {
            frame1: records[self.start].clone(),
            frame2: records[self.frame2].clone(),
            frame3: records[self.frame3].clone(),
            span: records[self.start..=self.frame3].to_vec(),
            keyword: keyword.to_string(),
        }
    }
}

/// An opening triplet candidate whose answer line is a single keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstTriplet {
    pub slots: FrameSlots,
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triplet {
    pub frame1: Record,
    pub frame2: Record,
    pub frame3: Record,
    /// `frame1..=frame3`, fillers included.
    pub span: Vec<Record>,
    pub keyword: String,
}

impl Triplet {
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.frame1.start_secs(), self.frame3.end_secs())
    }

    pub fn fillers(&self) -> usize {
        self.span.len().saturating_sub(3)
    }
}

/// T1, T2, T3 in increasing time order, all sharing one keyword.
pub type Sequence = [Triplet; 3];

pub fn sequence_keyword(sequence: &Sequence) -> &str {
    &sequence[0].keyword
}

pub fn sequence_range(sequence: &Sequence) -> TimeRange {
    TimeRange::new(sequence[0].frame1.start_secs(), sequence[2].frame3.end_secs())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            duration: end - start,
        }
    }

    /// Seconds shared by both ranges; touching ranges share none.
    pub fn overlap_secs(&self, other: &TimeRange) -> f64 {
        (self.end.min(other.end) - self.start.max(other.start)).max(0.0)
    }

    /// `other` starts no earlier than this range ends.
    pub fn precedes(&self, other: &TimeRange) -> bool {
        self.end <= other.start
    }
}

#[derive(Debug, Clone)]
pub struct SelectionCandidate {
    pub sequence: Sequence,
    pub range: TimeRange,
    /// Alphabetic characters across every record of the sequence.
    pub content_weight: u32,
    pub keyword: String,
}

impl SelectionCandidate {
    pub fn new(sequence: Sequence) -> Self {
        let range = sequence_range(&sequence);
        let content_weight = sequence
            .iter()
            .flat_map(|triplet| triplet.span.iter())
            .map(|record| record.text.chars().filter(|c| c.is_alphabetic()).count() as u32)
            .sum();
        let keyword = sequence_keyword(&sequence).to_string();
        Self {
            sequence,
            range,
            content_weight,
            keyword,
        }
    }
}
