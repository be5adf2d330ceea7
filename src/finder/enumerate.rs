use std::collections::HashMap;
use std::ops::ControlFlow;

use super::config::FinderConfig;
use super::keyword_index::{KeywordEntry, KeywordIndex};
use super::search::{Found, TripletSearch, WordRange};
use super::types::{FirstTriplet, Sequence};
use crate::transcript::Record;

/// Raw sequences plus the commonness score of every keyword that was
/// enumerated.
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    pub sequences: Vec<Sequence>,
    pub scores: HashMap<String, f64>,
}

/// The keyword must show up before the answer line of T2 or T3, not only in
/// the answer lines themselves.
fn reuses_keyword(entry: &KeywordEntry, second: &Found, third: &Found) -> bool {
    entry.contains_in_range(second.slots.start, second.slots.frame2)
        || entry.contains_in_range(third.slots.start, third.slots.frame2)
}

/// Every complete T1 → T2 → T3 chain for the kept keywords, capped per
/// keyword.
pub fn enumerate_sequences(
    records: &[Record],
    first_triplets: &[FirstTriplet],
    index: &KeywordIndex,
    kept: &[(String, f64)],
    config: &FinderConfig,
) -> Enumeration {
    let scores: HashMap<String, f64> = kept.iter().cloned().collect();
    let search = TripletSearch::new(records, config);
    let mut per_keyword: HashMap<String, usize> = HashMap::new();
    let mut sequences = Vec::new();

    for first in first_triplets {
        if !scores.contains_key(&first.keyword) {
            continue;
        }
        let Some(entry) = index.get(&first.keyword) else {
            continue;
        };
        let count = per_keyword.entry(first.keyword.clone()).or_insert(0);
        chains_from(
            &search,
            records,
            first,
            entry,
            config,
            count,
            &mut sequences,
        );
    }

    Enumeration { sequences, scores }
}

fn chains_from(
    search: &TripletSearch<'_>,
    records: &[Record],
    first: &FirstTriplet,
    entry: &KeywordEntry,
    config: &FinderConfig,
    count: &mut usize,
    out: &mut Vec<Sequence>,
) {
    let cap = config.per_keyword_cap;
    if *count >= cap {
        return;
    }
    let t1_range = first.slots.time_range(records);
    let second_words = WordRange::between(1, config.t2_max_words);

    let _ = search.for_each_after(entry, first.slots.frame3 + 1, second_words, |t2| {
        if !t1_range.precedes(&t2.range) {
            return ControlFlow::Continue(());
        }
        let third_words = WordRange::at_least(t2.words);
        search.for_each_after(entry, t2.slots.frame3 + 1, third_words, |t3| {
            if !t2.range.precedes(&t3.range) || !reuses_keyword(entry, &t2, &t3) {
                return ControlFlow::Continue(());
            }
            out.push([
                first.slots.materialize(records, &first.keyword),
                t2.slots.materialize(records, &first.keyword),
                t3.slots.materialize(records, &first.keyword),
            ]);
            *count += 1;
            if *count >= cap {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
    });
}
