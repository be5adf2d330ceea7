//! Keyword commonness scoring and the rarity filter.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::config::FinderConfig;
use super::error::{FinderError, OracleError};
use crate::ui::{self, Level};

/// Source of word commonness scores; higher means more common.
#[async_trait]
pub trait CommonnessOracle: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(&self, word: &str) -> Result<f64, OracleError>;
}

/// Scores read from a `word count` list. Unknown words score 0.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    scores: HashMap<String, f64>,
}

impl FrequencyTable {
    /// Parse lines of `word count`, separated by whitespace, a tab or a
    /// comma. Blank lines and `#` comments are ignored; a repeated word keeps
    /// its highest count.
    pub fn parse(contents: &str) -> Result<Self, OracleError> {
        let mut scores: HashMap<String, f64> = HashMap::new();
        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let invalid = || OracleError::InvalidTableLine {
                line: number + 1,
                content: line.to_string(),
            };
            let mut parts = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty());
            let word = parts.next().ok_or_else(invalid)?;
            let count = parts
                .next()
                .and_then(|raw| raw.parse::<f64>().ok())
                .filter(|count| count.is_finite())
                .ok_or_else(invalid)?;
            let entry = scores.entry(word.to_lowercase()).or_insert(count);
            *entry = entry.max(count);
        }
        Ok(Self { scores })
    }

    pub async fn load(path: &Path) -> Result<Self, OracleError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| OracleError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&contents)
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self {
            scores: pairs
                .into_iter()
                .map(|(word, score)| (word.as_ref().to_lowercase(), score))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }
}

#[async_trait]
impl CommonnessOracle for FrequencyTable {
    fn name(&self) -> &'static str {
        "frequency-table"
    }

    async fn score(&self, word: &str) -> Result<f64, OracleError> {
        Ok(self.scores.get(&word.to_lowercase()).copied().unwrap_or(0.0))
    }
}

/// Frequencies from the Datamuse `words` endpoint.
///
/// Datamuse reports occurrences per million words (`f:` tag); scores are
/// scaled to per billion so the default threshold of 10000 means ten per
/// million.
pub struct DatamuseOracle {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DatamuseWord {
    word: String,
    #[serde(default)]
    tags: Vec<String>,
}

impl DatamuseOracle {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

fn frequency_from_tags(tags: &[String]) -> Option<f64> {
    tags.iter()
        .find_map(|tag| tag.strip_prefix("f:"))
        .and_then(|raw| raw.parse::<f64>().ok())
}

#[async_trait]
impl CommonnessOracle for DatamuseOracle {
    fn name(&self) -> &'static str {
        "datamuse"
    }

    async fn score(&self, word: &str) -> Result<f64, OracleError> {
        let url = format!("{}/words", self.base_url);
        let results: Vec<DatamuseWord> = self
            .client
            .get(&url)
            .query(&[("sp", word), ("md", "f"), ("max", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(hit) = results.into_iter().next() else {
            return Ok(0.0);
        };
        if !hit.word.eq_ignore_ascii_case(word) {
            return Ok(0.0);
        }
        let per_million = frequency_from_tags(&hit.tags).ok_or_else(|| OracleError::Response {
            word: word.to_string(),
            message: "missing frequency tag".to_string(),
        })?;
        Ok(per_million * 1000.0)
    }
}

/// Score every keyword, one lookup at a time. The first failed lookup ends
/// the run.
pub async fn score_keywords<O>(
    oracle: &O,
    keywords: &[String],
) -> Result<HashMap<String, f64>, FinderError>
where
    O: CommonnessOracle + ?Sized,
{
    let mut scores = HashMap::with_capacity(keywords.len());
    for keyword in keywords {
        let score = oracle
            .score(keyword)
            .await
            .map_err(|source| FinderError::Oracle {
                word: keyword.clone(),
                source,
            })?;
        scores.insert(keyword.clone(), score);
    }
    Ok(scores)
}

/// Rank keywords rarest first and drop the too-common ones, but never keep
/// fewer than the configured floor while candidates remain.
pub fn filter_by_rarity(scores: &HashMap<String, f64>, config: &FinderConfig) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = scores
        .iter()
        .map(|(word, score)| (word.clone(), *score))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let rare = ranked
        .iter()
        .take_while(|(_, score)| *score <= config.common_threshold)
        .count();
    let keep = rare.max(config.keyword_floor()).min(ranked.len());

    if keep > rare {
        ui::emit(
            Level::Warn,
            "finder.rarity.floor",
            &format!(
                "Only {rare} keyword(s) under the commonness threshold; keeping the {keep} rarest"
            ),
            Some(serde_json::json!({
                "rare": rare,
                "kept": keep,
                "threshold": config.common_threshold,
            })),
        );
    }

    ranked.truncate(keep);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingOracle;

    #[async_trait]
    impl CommonnessOracle for FailingOracle {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn score(&self, word: &str) -> Result<f64, OracleError> {
            if word == "broken" {
                Err(OracleError::Response {
                    word: word.to_string(),
                    message: "boom".to_string(),
                })
            } else {
                Ok(1.0)
            }
        }
    }

    fn config_with_target(target_count: usize) -> FinderConfig {
        FinderConfig {
            target_count,
            ..FinderConfig::default()
        }
    }

    #[test]
    fn parse_table_formats() {
        let table = FrequencyTable::parse(
            "# word counts\nthe 5000000\nTreasure,1200\n\nanchor\t300.5\nthe 10\n",
        )
        .expect("valid table");
        assert_eq!(table.len(), 3);
        assert_eq!(table.scores["the"], 5_000_000.0);
        assert_eq!(table.scores["treasure"], 1200.0);
        assert_eq!(table.scores["anchor"], 300.5);
    }

    #[test]
    fn parse_table_rejects_missing_counts() {
        let err = FrequencyTable::parse("ok 1\nbroken\n").unwrap_err();
        assert!(matches!(err, OracleError::InvalidTableLine { line: 2, .. }));
        assert!(FrequencyTable::parse("word many").is_err());
    }

    #[test]
    fn datamuse_frequency_tag() {
        let tags = vec!["syn".to_string(), "f:12.5".to_string()];
        assert_eq!(frequency_from_tags(&tags), Some(12.5));
        assert_eq!(frequency_from_tags(&[]), None);
    }

    #[tokio::test]
    async fn table_lookups_are_case_insensitive() {
        let table = FrequencyTable::from_pairs([("Anchor", 42.0)]);
        assert_eq!(table.score("anchor").await.unwrap(), 42.0);
        assert_eq!(table.score("ANCHOR").await.unwrap(), 42.0);
        assert_eq!(table.score("kraken").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn load_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("freq.txt");
        std::fs::write(&path, "gold 99\n").unwrap();
        let table = FrequencyTable::load(&path).await.expect("load");
        assert_eq!(table.score("gold").await.unwrap(), 99.0);

        let missing = FrequencyTable::load(&dir.path().join("nope.txt")).await;
        assert!(matches!(missing, Err(OracleError::Io { .. })));
    }

    #[tokio::test]
    async fn oracle_failure_propagates_with_word() {
        let keywords = vec!["fine".to_string(), "broken".to_string()];
        let err = score_keywords(&FailingOracle, &keywords).await.unwrap_err();
        match err {
            FinderError::Oracle { word, .. } => assert_eq!(word, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn scores_every_keyword() {
        let table = FrequencyTable::from_pairs([("a", 1.0), ("b", 2.0)]);
        let keywords = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let scores = score_keywords(&table, &keywords).await.unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores["c"], 0.0);
    }

    #[test]
    fn common_keywords_are_dropped_above_the_floor() {
        let scores: HashMap<String, f64> = (0..10)
            .map(|i| (format!("rare{i}"), i as f64))
            .chain((0..5).map(|i| (format!("common{i}"), 50_000.0 + i as f64)))
            .collect();
        let kept = filter_by_rarity(&scores, &config_with_target(5));
        // floor is ceil(5 * 1.2) = 6, ten rare words already exceed it
        assert_eq!(kept.len(), 10);
        assert!(kept.iter().all(|(word, _)| word.starts_with("rare")));
        assert_eq!(kept[0].0, "rare0");
    }

    #[test]
    fn floor_keeps_rarest_common_words() {
        let scores: HashMap<String, f64> = [
            ("alpha", 1.0),
            ("beta", 20_000.0),
            ("gamma", 90_000.0),
            ("delta", 15_000.0),
        ]
        .into_iter()
        .map(|(w, s)| (w.to_string(), s))
        .collect();
        // floor is ceil(2 * 1.2) = 3
        let kept = filter_by_rarity(&scores, &config_with_target(2));
        let words: Vec<&str> = kept.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["alpha", "delta", "beta"]);
    }

    #[test]
    fn floor_never_exceeds_available_keywords() {
        let scores: HashMap<String, f64> =
            [("only".to_string(), 99_999.0)].into_iter().collect();
        let kept = filter_by_rarity(&scores, &FinderConfig::default());
        assert_eq!(kept.len(), 1);
        assert!(filter_by_rarity(&HashMap::new(), &FinderConfig::default()).is_empty());
    }
}
