//! Bounded forward search for follow-up triplets, and the chain
//! pre-qualifier built on it.

use std::collections::HashSet;
use std::ops::ControlFlow;

use super::boundary::{closes_segment, count_words, opens_segment, punctuation_or_next_capital};
use super::config::FinderConfig;
use super::keyword_index::{KeywordEntry, KeywordIndex};
use super::types::{FirstTriplet, FrameSlots, TimeRange};
use crate::transcript::Record;

/// Accepted word counts for a triplet's answer line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordRange {
    pub min: usize,
    pub max: Option<usize>,
}

impl WordRange {
    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub fn contains(&self, words: usize) -> bool {
        words >= self.min && self.max.is_none_or(|max| words <= max)
    }
}

/// A follow-up triplet found by the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Found {
    pub slots: FrameSlots,
    pub range: TimeRange,
    /// Words in the answer line (frame3).
    pub words: usize,
}

pub struct TripletSearch<'a> {
    records: &'a [Record],
    config: &'a FinderConfig,
}

impl<'a> TripletSearch<'a> {
    pub fn new(records: &'a [Record], config: &'a FinderConfig) -> Self {
        Self { records, config }
    }

    /// Check one candidate against the follow-up triplet rules and return the
    /// answer line's word count when it passes.
    pub fn validate(
        &self,
        entry: &KeywordEntry,
        slots: FrameSlots,
        words: WordRange,
    ) -> Option<usize> {
        let records = self.records;
        let frame2 = records.get(slots.frame2)?;
        let frame3 = records.get(slots.frame3)?;

        let count = count_words(&frame3.text);
        if !words.contains(count) {
            return None;
        }
        if !entry.contains_in_range(slots.start, slots.frame3) {
            return None;
        }
        if !opens_segment(records, slots.start) {
            return None;
        }
        if !punctuation_or_next_capital(&frame2.text, Some(&frame3.text)) {
            return None;
        }
        if !closes_segment(records, slots.frame3) {
            return None;
        }
        let span = frame3.end.saturating_sub(records[slots.start].start);
        if !self.config.span_in_bounds(span) {
            return None;
        }
        Some(count)
    }

    /// Visit every valid follow-up triplet whose first frame lies in the
    /// window starting at `from`, in order. The visitor can stop the search
    /// by returning `Break`, which is passed back to the caller.
    pub fn for_each_after<F>(
        &self,
        entry: &KeywordEntry,
        from: usize,
        words: WordRange,
        mut visit: F,
    ) -> ControlFlow<()>
    where
        F: FnMut(Found) -> ControlFlow<()>,
    {
        let len = self.records.len();
        let window_end = from.saturating_add(self.config.window_size).min(len);
        // frame3 sits at most this far after the first frame
        let reach = self.config.max_fillers + 2;

        let mut start = from;
        while start < window_end {
            // No mention of the keyword within reach: jump to the first start
            // that could still include the next one.
            let Some(next) = entry.next_occurrence(start) else {
                break;
            };
            if next > start + reach {
                start = next - reach;
                continue;
            }

            for fillers in 0..=self.config.max_fillers {
                let slots = FrameSlots::new(start, fillers);
                if slots.frame3 >= len {
                    break;
                }
                if let Some(count) = self.validate(entry, slots, words) {
                    let found = Found {
                        slots,
                        range: slots.time_range(self.records),
                        words: count,
                    };
                    visit(found)?;
                }
            }
            start += 1;
        }
        ControlFlow::Continue(())
    }

    /// Whether at least one complete T1 → T2 → T3 chain exists for `first`.
    pub fn has_complete_chain(&self, first: &FirstTriplet, entry: &KeywordEntry) -> bool {
        let t1_range = first.slots.time_range(self.records);
        let second_words = WordRange::between(1, self.config.t2_max_words);
        let third_words = WordRange::at_least(2);

        self.for_each_after(entry, first.slots.frame3 + 1, second_words, |t2| {
            if !t1_range.precedes(&t2.range) {
                return ControlFlow::Continue(());
            }
            self.for_each_after(entry, t2.slots.frame3 + 1, third_words, |t3| {
                if t2.range.precedes(&t3.range) {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
        })
        .is_break()
    }
}

/// Keywords with at least one complete chain. Each keyword is proven once;
/// later openings with an already-proven keyword are skipped.
pub fn prequalify(
    records: &[Record],
    first_triplets: &[FirstTriplet],
    index: &KeywordIndex,
    config: &FinderConfig,
) -> HashSet<String> {
    let search = TripletSearch::new(records, config);
    let mut qualified = HashSet::new();

    for first in first_triplets {
        if qualified.contains(&first.keyword) {
            continue;
        }
        let Some(entry) = index.get(&first.keyword) else {
            continue;
        };
        if search.has_complete_chain(first, entry) {
            qualified.insert(first.keyword.clone());
        }
    }
    qualified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::boundary::StopWords;
    use crate::finder::first_index::build_first_triplet_index;
    use std::time::Duration;

    /// Records laid out back to back, each `secs` long.
    fn timeline(lines: &[(&str, u64)]) -> Vec<Record> {
        let mut at = 0;
        lines
            .iter()
            .enumerate()
            .map(|(i, (text, secs))| {
                let record = Record {
                    index: i as u32 + 1,
                    start: Duration::from_secs(at),
                    end: Duration::from_secs(at + secs),
                    text: text.to_string(),
                };
                at += secs;
                record
            })
            .collect()
    }

    fn chain_transcript() -> Vec<Record> {
        timeline(&[
            ("Welcome back to the show.", 2),
            ("Tonight we hunt for", 2),
            ("Treasure!", 2),
            ("Everyone loves treasure", 2),
            ("and I mean real", 2),
            ("Buried gold.", 2),
            ("The treasure was gone", 2),
            ("and all that was left", 2),
            ("Was a tiny map.", 2),
            ("Goodbye.", 2),
        ])
    }

    #[test]
    fn word_range_bounds() {
        assert!(WordRange::between(1, 6).contains(6));
        assert!(!WordRange::between(1, 6).contains(7));
        assert!(!WordRange::at_least(2).contains(1));
        assert!(WordRange::at_least(2).contains(200));
    }

    fn off_grid_records(last_end_ms: u64) -> Vec<Record> {
        [
            ("Intro line.", 0, 1_100),
            ("We looked for treasure", 1_100, 3_000),
            ("and found", 3_000, 4_000),
            ("Gold coins.", 4_000, last_end_ms),
        ]
        .iter()
        .enumerate()
        .map(|(i, (text, start, end))| Record {
            index: i as u32 + 1,
            start: Duration::from_millis(*start),
            end: Duration::from_millis(*end),
            text: text.to_string(),
        })
        .collect()
    }

    #[test]
    fn span_bounds_are_inclusive_to_the_millisecond() {
        let config = FinderConfig::default();
        let slots = FrameSlots::new(1, 0);

        let exact = off_grid_records(5_100);
        let index = KeywordIndex::build(&exact, ["treasure"]).unwrap();
        let search = TripletSearch::new(&exact, &config);
        let entry = index.get("treasure").unwrap();
        assert_eq!(search.validate(entry, slots, WordRange::between(1, 6)), Some(2));

        let short = off_grid_records(5_099);
        let index = KeywordIndex::build(&short, ["treasure"]).unwrap();
        let search = TripletSearch::new(&short, &config);
        let entry = index.get("treasure").unwrap();
        assert_eq!(search.validate(entry, slots, WordRange::between(1, 6)), None);
    }

    #[test]
    fn finds_follow_up_triplets_after_the_opening() {
        let records = chain_transcript();
        let config = FinderConfig::default();
        let index = KeywordIndex::build(&records, ["treasure"]).unwrap();
        let entry = index.get("treasure").unwrap();
        let search = TripletSearch::new(&records, &config);

        let mut found = Vec::new();
        let _ = search.for_each_after(entry, 3, WordRange::between(1, 6), |hit| {
            found.push(hit);
            ControlFlow::Continue(())
        });

        assert!(found.iter().any(|f| f.slots == FrameSlots::new(3, 0)));
        for hit in &found {
            assert!(hit.slots.start >= 3);
            assert!(entry.contains_in_range(hit.slots.start, hit.slots.frame3));
            assert!(hit.range.duration >= 4.0 && hit.range.duration <= 20.0);
        }
    }

    #[test]
    fn break_stops_the_search() {
        let records = chain_transcript();
        let config = FinderConfig::default();
        let index = KeywordIndex::build(&records, ["treasure"]).unwrap();
        let search = TripletSearch::new(&records, &config);

        let mut visits = 0;
        let flow = search.for_each_after(
            index.get("treasure").unwrap(),
            3,
            WordRange::at_least(1),
            |_| {
                visits += 1;
                ControlFlow::Break(())
            },
        );
        assert!(flow.is_break());
        assert_eq!(visits, 1);
    }

    #[test]
    fn window_limits_the_first_frame() {
        let records = chain_transcript();
        let config = FinderConfig {
            window_size: 1,
            ..FinderConfig::default()
        };
        let index = KeywordIndex::build(&records, ["treasure"]).unwrap();
        let search = TripletSearch::new(&records, &config);
        let mut starts = Vec::new();
        let _ = search.for_each_after(
            index.get("treasure").unwrap(),
            3,
            WordRange::at_least(1),
            |hit| {
                starts.push(hit.slots.start);
                ControlFlow::Continue(())
            },
        );
        assert!(starts.iter().all(|&s| s == 3));
    }

    #[test]
    fn complete_chain_qualifies_keyword() {
        let records = chain_transcript();
        let config = FinderConfig::default();
        let first = build_first_triplet_index(&records, &StopWords::default(), &config);
        assert!(first.iter().any(|t| t.keyword == "treasure"));

        let index = KeywordIndex::build(&records, first.iter().map(|t| t.keyword.as_str())).unwrap();
        let qualified = prequalify(&records, &first, &index, &config);
        assert!(qualified.contains("treasure"));
    }

    #[test]
    fn keyword_only_in_its_own_answer_line_is_dropped() {
        let records = timeline(&[
            ("Welcome back to the show.", 2),
            ("Tonight we hunt for", 2),
            ("Pirates!", 2),
            ("Everyone loves a story", 2),
            ("and I mean a real one", 2),
            ("Buried gold.", 2),
            ("The map was gone", 2),
            ("and all that was left", 2),
            ("Was a tiny key.", 2),
        ]);
        let config = FinderConfig::default();
        let first = build_first_triplet_index(&records, &StopWords::default(), &config);
        assert!(first.iter().any(|t| t.keyword == "pirates"));

        let index = KeywordIndex::build(&records, first.iter().map(|t| t.keyword.as_str())).unwrap();
        let qualified = prequalify(&records, &first, &index, &config);
        assert!(!qualified.contains("pirates"));
    }
}
