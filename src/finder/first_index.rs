use super::boundary::{StopWords, closes_segment, extract_last_word, opens_segment};
use super::config::FinderConfig;
use super::types::{FirstTriplet, FrameSlots};
use crate::transcript::Record;

/// Every opening triplet whose answer line is a single keyword.
///
/// One forward pass; each first frame tries `0..=max_fillers` fillers before
/// frame2, with frame3 directly after frame2.
pub fn build_first_triplet_index(
    records: &[Record],
    stop_words: &StopWords,
    config: &FinderConfig,
) -> Vec<FirstTriplet> {
    let mut candidates = Vec::new();

    for start in 0..records.len() {
        if !opens_segment(records, start) {
            continue;
        }
        for fillers in 0..=config.max_fillers {
            let slots = FrameSlots::new(start, fillers);
            let Some(frame3) = records.get(slots.frame3) else {
                break;
            };
            if !stop_words.is_valid_t1_frame3(&frame3.text) {
                continue;
            }
            if !closes_segment(records, slots.frame3) {
                continue;
            }
            let span = frame3.end.saturating_sub(records[start].start);
            if !config.span_in_bounds(span) {
                continue;
            }
            let Some(keyword) = extract_last_word(&frame3.text) else {
                continue;
            };
            candidates.push(FirstTriplet { slots, keyword });
        }
    }

    candidates
}
