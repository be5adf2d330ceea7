use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use super::pipeline::{PipelineOutcome, PipelineStats};
use super::types::{Sequence, Triplet, sequence_range};
use crate::transcript::{Record, seconds_to_timestamp, write_srt};

#[derive(Debug, Clone, Serialize)]
pub struct TripletEntry {
    pub start: String,
    pub end: String,
    pub duration_secs: f64,
    pub fillers: usize,
    pub frame1: Record,
    pub frame2: Record,
    pub frame3: Record,
    pub span: Vec<Record>,
}

impl From<&Triplet> for TripletEntry {
    fn from(triplet: &Triplet) -> Self {
        let range = triplet.time_range();
        Self {
            start: seconds_to_timestamp(range.start),
            end: seconds_to_timestamp(range.end),
            duration_secs: range.duration,
            fillers: triplet.fillers(),
            frame1: triplet.frame1.clone(),
            frame2: triplet.frame2.clone(),
            frame3: triplet.frame3.clone(),
            span: triplet.span.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SequenceEntry {
    pub rank: usize,
    pub keyword: String,
    pub commonness: Option<f64>,
    pub start: String,
    pub end: String,
    pub triplets: Vec<TripletEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SequenceReport {
    pub transcript: String,
    pub oracle: String,
    pub stats: PipelineStats,
    pub sequences: Vec<SequenceEntry>,
}

impl SequenceReport {
    pub fn new(transcript: &Path, oracle: &str, outcome: &PipelineOutcome) -> Self {
        Self {
            transcript: transcript.display().to_string(),
            oracle: oracle.to_string(),
            stats: outcome.stats.clone(),
            sequences: entries(&outcome.sequences, &outcome.scores),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing sequence report")
    }

    /// Single-line form, so the report sits in the JSON-lines event stream.
    pub fn to_json_line(&self) -> Result<String> {
        serde_json::to_string(self).context("serializing sequence report")
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let stats = &self.stats;
        let _ = writeln!(
            out,
            "{} {} ({} records, {} opening triplets, {} qualified, {} kept, {} raw)",
            "Sequences for".bold(),
            self.transcript,
            stats.records,
            stats.first_triplets,
            stats.qualified_keywords,
            stats.kept_keywords,
            stats.raw_sequences
        );

        if self.sequences.is_empty() {
            let _ = writeln!(out, "{}", "No sequences found".yellow());
            return out;
        }

        for entry in &self.sequences {
            let score = entry
                .commonness
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "\n{:>2}. {}  {} → {}  {}",
                entry.rank,
                entry.keyword.cyan().bold(),
                entry.start,
                entry.end,
                format!("commonness {score}").dimmed()
            );
            for (k, triplet) in entry.triplets.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "    T{} [{} → {}] #{}-#{}",
                    k + 1,
                    triplet.start,
                    triplet.end,
                    triplet.frame1.index,
                    triplet.frame3.index
                );
                for record in &triplet.span {
                    let marker = if record.index == triplet.frame3.index { "»" } else { " " };
                    let _ = writeln!(out, "      {marker} {}", record.text.replace('\n', " / "));
                }
            }
        }
        out
    }
}

fn entries(sequences: &[Sequence], scores: &HashMap<String, f64>) -> Vec<SequenceEntry> {
    sequences
        .iter()
        .enumerate()
        .map(|(i, sequence)| {
            let range = sequence_range(sequence);
            let keyword = sequence[0].keyword.clone();
            SequenceEntry {
                rank: i + 1,
                commonness: scores.get(&keyword).copied(),
                keyword,
                start: seconds_to_timestamp(range.start),
                end: seconds_to_timestamp(range.end),
                triplets: sequence.iter().map(TripletEntry::from).collect(),
            }
        })
        .collect()
}

/// File name for one exported triplet, e.g. `03_treasure_t2.srt`.
pub fn export_file_name(rank: usize, keyword: &str, triplet: usize) -> String {
    format!("{rank:02}_{keyword}_t{triplet}.srt")
}

/// Write every triplet span as its own SRT file, renumbered from 1 and
/// retimed to start at zero.
pub fn export_srt(sequences: &[Sequence], dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating export directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(sequences.len() * 3);
    for (i, sequence) in sequences.iter().enumerate() {
        for (k, triplet) in sequence.iter().enumerate() {
            let path = dir.join(export_file_name(i + 1, &triplet.keyword, k + 1));
            let contents = write_srt(&triplet.span, triplet.frame1.start);
            fs::write(&path, contents)
                .with_context(|| format!("writing {}", path.display()))?;
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::types::FrameSlots;
    use std::time::Duration;

    fn sample_sequence() -> Sequence {
        let records: Vec<Record> = (0..9u64)
            .map(|i| Record {
                index: i as u32 + 10,
                start: Duration::from_secs(30 + i * 2),
                end: Duration::from_secs(32 + i * 2),
                text: format!("line {i}"),
            })
            .collect();
        [
            FrameSlots::new(0, 0).materialize(&records, "anchor"),
            FrameSlots::new(3, 0).materialize(&records, "anchor"),
            FrameSlots::new(6, 0).materialize(&records, "anchor"),
        ]
    }

    fn outcome() -> PipelineOutcome {
        PipelineOutcome {
            sequences: vec![sample_sequence()],
            scores: [("anchor".to_string(), 12.5)].into_iter().collect(),
            stats: PipelineStats {
                records: 9,
                selected: 1,
                ..PipelineStats::default()
            },
        }
    }

    #[test]
    fn report_carries_ranges_and_scores() {
        let report = SequenceReport::new(Path::new("show.srt"), "frequency-table", &outcome());
        let entry = &report.sequences[0];
        assert_eq!(entry.rank, 1);
        assert_eq!(entry.commonness, Some(12.5));
        assert_eq!(entry.start, "00:00:30,000");
        assert_eq!(entry.end, "00:00:48,000");
        assert_eq!(entry.triplets.len(), 3);
        assert_eq!(entry.triplets[1].frame1.index, 13);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["sequences"][0]["keyword"], "anchor");
        assert_eq!(json["sequences"][0]["triplets"][2]["frame3"]["end"], "00:00:48,000");
        assert_eq!(json["stats"]["selected"], 1);
    }

    #[test]
    fn text_report_lists_every_frame() {
        colored::control::set_override(false);
        let text = SequenceReport::new(Path::new("show.srt"), "table", &outcome()).render_text();
        assert!(text.contains(" 1. anchor  00:00:30,000 → 00:00:48,000"));
        assert!(text.contains("T3 [00:00:42,000 → 00:00:48,000] #16-#18"));
        assert!(text.contains("» line 8"));
    }

    #[test]
    fn export_writes_retimed_files() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_srt(&[sample_sequence()], dir.path()).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written[1].ends_with("01_anchor_t2.srt"));

        let second = fs::read_to_string(&written[1]).unwrap();
        assert!(second.starts_with("1\n00:00:00,000 --> 00:00:02,000\nline 3\n"));
        assert!(second.contains("3\n00:00:04,000 --> 00:00:06,000\nline 5"));
    }
}
