//! Inverted index from candidate keywords to the cues that mention them.

use regex::RegexSet;
use std::collections::HashMap;

use super::error::FinderError;
use crate::transcript::Record;

/// Keywords compiled into one `RegexSet` per scan over the transcript.
const SCAN_BATCH: usize = 256;

fn word_pattern(keyword: &str) -> String {
    format!(r"(?i)\b{}\b", regex::escape(keyword))
}

#[derive(Debug, Clone)]
pub struct KeywordEntry {
    keyword: String,
    /// Sorted record positions whose text contains the keyword as a word.
    occurrences: Vec<usize>,
}

impl KeywordEntry {
    /// First occurrence at or after `from`.
    pub fn next_occurrence(&self, from: usize) -> Option<usize> {
        let idx = self.occurrences.partition_point(|&pos| pos < from);
        self.occurrences.get(idx).copied()
    }

    /// Whether the keyword occurs in any record position in `lo..=hi`.
    pub fn contains_in_range(&self, lo: usize, hi: usize) -> bool {
        self.next_occurrence(lo).is_some_and(|pos| pos <= hi)
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    entries: HashMap<String, KeywordEntry>,
}

impl KeywordIndex {
    pub fn build<'a, I>(records: &[Record], keywords: I) -> Result<Self, FinderError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut keywords: Vec<&str> = keywords.into_iter().collect();
        keywords.sort_unstable();
        keywords.dedup();

        let mut entries: Vec<KeywordEntry> = keywords
            .iter()
            .map(|keyword| KeywordEntry {
                keyword: keyword.to_string(),
                occurrences: Vec::new(),
            })
            .collect();

        for batch in entries.chunks_mut(SCAN_BATCH) {
            let set = RegexSet::new(batch.iter().map(|e| word_pattern(&e.keyword))).map_err(
                |source| FinderError::Matcher {
                    keywords: format!(
                        "{}..{}",
                        batch[0].keyword,
                        batch[batch.len() - 1].keyword
                    ),
                    source,
                },
            )?;
            for (pos, record) in records.iter().enumerate() {
                for hit in set.matches(&record.text).iter() {
                    batch[hit].occurrences.push(pos);
                }
            }
        }

        Ok(Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.keyword.clone(), entry))
                .collect(),
        })
    }

    pub fn get(&self, keyword: &str) -> Option<&KeywordEntry> {
        self.entries.get(keyword)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|keyword, _| keep(keyword));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn records(texts: &[&str]) -> Vec<Record> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Record {
                index: i as u32 + 1,
                start: Duration::from_secs(i as u64),
                end: Duration::from_secs(i as u64 + 1),
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn indexes_whole_words_case_insensitively() {
        let records = records(&[
            "The TREASURE is here",
            "treasures are plural",
            "no match",
            "Find the treasure!",
        ]);
        let index = KeywordIndex::build(&records, ["treasure", "here"]).expect("build");
        let entry = index.get("treasure").expect("entry");
        assert_eq!(entry.occurrences, vec![0, 3]);
        assert_eq!(index.get("here").unwrap().occurrences, vec![0]);
        assert!(index.get("plural").is_none());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn range_queries() {
        let records = records(&["cat", "dog", "cat", "dog", "dog", "cat"]);
        let index = KeywordIndex::build(&records, ["cat"]).unwrap();
        let cat = index.get("cat").unwrap();
        assert!(cat.contains_in_range(0, 0));
        assert!(cat.contains_in_range(1, 2));
        assert!(!cat.contains_in_range(3, 4));
        assert!(cat.contains_in_range(3, 5));
        assert!(!cat.contains_in_range(6, 10));
        assert_eq!(cat.next_occurrence(3), Some(5));
        assert_eq!(cat.next_occurrence(6), None);
    }

    #[test]
    fn duplicate_keywords_collapse() {
        let records = records(&["apple"]);
        let index = KeywordIndex::build(&records, ["apple", "apple"]).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("apple").unwrap().occurrences, vec![0]);
    }

    #[test]
    fn many_keywords_span_several_batches() {
        let words: Vec<String> = (0..600).map(|i| format!("w{i}x")).collect();
        let texts: Vec<String> = words.iter().map(|w| format!("say {w} now")).collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let records = records(&text_refs);
        let index = KeywordIndex::build(&records, words.iter().map(String::as_str)).unwrap();
        assert_eq!(index.len(), 600);
        assert_eq!(index.get("w599x").unwrap().occurrences, vec![599]);
        assert_eq!(index.get("w0x").unwrap().occurrences, vec![0]);
    }

    #[test]
    fn retain_drops_entries() {
        let records = records(&["a b"]);
        let mut index = KeywordIndex::build(&records, ["alpha", "beta"]).unwrap();
        index.retain(|k| k == "beta");
        assert_eq!(index.len(), 1);
        assert!(index.get("alpha").is_none());
        assert!(index.get("beta").is_some());
    }
}
