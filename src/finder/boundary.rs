//! Sentence-boundary heuristics and keyword extraction over cue text.
//!
//! Transcripts are unreliable about terminal punctuation, so most predicates
//! also accept a following cue that opens with a capital letter.

use std::collections::HashSet;

use crate::transcript::Record;

const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '…'];
const STRONG_PUNCTUATION: &[char] = &['.', '!', '?', '…'];
const CLOSING_QUOTES: &[char] = &['"', '\'', '”', '’', '»'];
const BRACKETS: &[char] = &[')', ']', '}'];
const DASHES: &[char] = &['-', '–', '—'];

/// Words that recur constantly and carry no content.
const EXCLUDED_WORDS: &[&str] = &[
    "i", "me", "my", "mine", "you", "your", "yours", "he", "him", "his", "she", "her", "hers",
    "it", "its", "we", "us", "our", "ours", "they", "them", "their", "theirs", "yes", "no",
    "yeah", "yep", "nope", "ok", "okay", "oh", "ah", "uh", "um", "hmm", "huh", "hey", "hi",
    "what", "that", "this", "there", "here", "so", "too", "right", "well", "please", "sir",
];

/// Last visible character, looking through closing quotes (`"Stop!"` ends in `!`).
fn final_char(text: &str) -> Option<char> {
    text.trim_end()
        .trim_end_matches(CLOSING_QUOTES)
        .chars()
        .next_back()
}

fn last_char(text: &str) -> Option<char> {
    text.trim_end().chars().next_back()
}

pub fn ends_with_punctuation(text: &str) -> bool {
    final_char(text).is_some_and(|c| PUNCTUATION.contains(&c))
}

pub fn ends_with_strong_punctuation(text: &str) -> bool {
    final_char(text).is_some_and(|c| STRONG_PUNCTUATION.contains(&c))
}

pub fn ends_with_bracket(text: &str) -> bool {
    last_char(text).is_some_and(|c| BRACKETS.contains(&c))
}

pub fn ends_with_dash(text: &str) -> bool {
    last_char(text).is_some_and(|c| DASHES.contains(&c))
}

/// First alphanumeric character is uppercase. Leading dialogue dashes,
/// quotes and brackets are skipped.
pub fn starts_with_capital(text: &str) -> bool {
    text.chars()
        .find(|c| c.is_alphanumeric())
        .is_some_and(char::is_uppercase)
}

pub fn punctuation_or_next_capital(text: &str, next: Option<&str>) -> bool {
    ends_with_punctuation(text) || next.is_some_and(starts_with_capital)
}

pub fn boundary_or_bracket_or_next_capital(text: &str, next: Option<&str>) -> bool {
    ends_with_punctuation(text)
        || ends_with_bracket(text)
        || ends_with_dash(text)
        || next.is_some_and(starts_with_capital)
}

pub fn strong_punctuation_or_next_capital(text: &str, next: Option<&str>) -> bool {
    ends_with_strong_punctuation(text) || next.is_some_and(starts_with_capital)
}

/// Whether a segment may begin at `pos`: the cue before it has to close a
/// clause. The first cue of a transcript always qualifies.
pub fn opens_segment(records: &[Record], pos: usize) -> bool {
    match pos.checked_sub(1).and_then(|prev| records.get(prev)) {
        Some(prev) => boundary_or_bracket_or_next_capital(
            &prev.text,
            records.get(pos).map(|r| r.text.as_str()),
        ),
        None => true,
    }
}

/// Whether a segment may end at `pos`.
///
/// The transcript's last cue always closes a segment, even without terminal
/// punctuation, since nothing follows it.
pub fn closes_segment(records: &[Record], pos: usize) -> bool {
    let Some(record) = records.get(pos) else {
        return false;
    };
    match records.get(pos + 1) {
        Some(next) => strong_punctuation_or_next_capital(&record.text, Some(&next.text)),
        None => true,
    }
}

/// Last whitespace-separated token, reduced to its letters and lowercased.
pub fn extract_last_word(text: &str) -> Option<String> {
    let token = text.split_whitespace().next_back()?;
    let word: String = token
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    (!word.is_empty()).then_some(word)
}

pub fn is_excluded_word(word: &str) -> bool {
    EXCLUDED_WORDS.contains(&word.to_lowercase().as_str())
}

/// Tokens that contain at least one letter.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace()
        .filter(|token| token.chars().any(char::is_alphabetic))
        .count()
}

/// The built-in stop words plus any configured extras.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    extra: HashSet<String>,
}

impl StopWords {
    pub fn with_extra<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extra: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        is_excluded_word(word) || self.extra.contains(&word.to_lowercase())
    }

    /// A valid opening answer line: exactly one content word, not a stop word.
    pub fn is_valid_t1_frame3(&self, text: &str) -> bool {
        count_words(text) == 1
            && extract_last_word(text).is_some_and(|word| !self.contains(&word))
    }
}
