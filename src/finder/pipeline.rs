//! The staged finder: first triplets, pre-qualification, rarity scoring,
//! enumeration and selection.

use rand::Rng;
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::boundary::StopWords;
use super::config::FinderConfig;
use super::enumerate::enumerate_sequences;
use super::error::FinderError;
use super::first_index::build_first_triplet_index;
use super::keyword_index::KeywordIndex;
use super::rarity::{CommonnessOracle, filter_by_rarity, score_keywords};
use super::search::prequalify;
use super::select::select_diverse;
use super::types::Sequence;
use crate::transcript::{Record, prepare_transcript};
use crate::ui;

/// Counts after each stage of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub records: usize,
    pub first_triplets: usize,
    pub candidate_keywords: usize,
    pub qualified_keywords: usize,
    pub kept_keywords: usize,
    pub raw_sequences: usize,
    pub selected: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub sequences: Vec<Sequence>,
    /// Commonness of every keyword that survived the rarity filter.
    pub scores: HashMap<String, f64>,
    pub stats: PipelineStats,
}

impl PipelineOutcome {
    fn empty(stats: PipelineStats) -> Self {
        Self {
            stats,
            ..Self::default()
        }
    }
}

pub async fn load_transcript(path: &Path) -> Result<String, FinderError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FinderError::Transcript {
            path: path.to_path_buf(),
            source,
        })
}

/// Strip, parse and run the finder over a raw SRT transcript.
pub async fn find_sequences<O, R>(
    raw: &str,
    oracle: &O,
    config: &FinderConfig,
    rng: &mut R,
) -> Result<PipelineOutcome, FinderError>
where
    O: CommonnessOracle + ?Sized,
    R: Rng + ?Sized,
{
    let records = prepare_transcript(raw);
    run_pipeline(&records, oracle, config, rng).await
}

pub async fn run_pipeline<O, R>(
    records: &[Record],
    oracle: &O,
    config: &FinderConfig,
    rng: &mut R,
) -> Result<PipelineOutcome, FinderError>
where
    O: CommonnessOracle + ?Sized,
    R: Rng + ?Sized,
{
    let mut stats = PipelineStats {
        records: records.len(),
        ..PipelineStats::default()
    };

    let stop_words = StopWords::with_extra(&config.extra_excluded_words);
    let first = build_first_triplet_index(records, &stop_words, config);
    let candidates: HashSet<&str> = first.iter().map(|t| t.keyword.as_str()).collect();
    stats.first_triplets = first.len();
    stats.candidate_keywords = candidates.len();
    ui::debug(
        "finder.first_triplets",
        &format!(
            "{} opening triplets over {} keywords",
            first.len(),
            candidates.len()
        ),
        json!({ "records": records.len(), "first_triplets": first.len(), "keywords": candidates.len() }),
    );
    if first.is_empty() {
        return Ok(PipelineOutcome::empty(stats));
    }

    let mut index = KeywordIndex::build(records, candidates.iter().copied())?;
    let qualified = prequalify(records, &first, &index, config);
    stats.qualified_keywords = qualified.len();
    ui::debug(
        "finder.prequalify",
        &format!("{} of {} keywords complete a chain", qualified.len(), candidates.len()),
        json!({ "qualified": qualified.len() }),
    );
    if qualified.is_empty() {
        return Ok(PipelineOutcome::empty(stats));
    }

    let mut keywords: Vec<String> = qualified.into_iter().collect();
    keywords.sort_unstable();
    ui::debug(
        "finder.rarity.score",
        &format!("Scoring {} keywords with {}", keywords.len(), oracle.name()),
        json!({ "oracle": oracle.name(), "keywords": keywords.len() }),
    );
    let scores = score_keywords(oracle, &keywords).await?;
    let kept = filter_by_rarity(&scores, config);
    stats.kept_keywords = kept.len();

    let kept_words: HashSet<&str> = kept.iter().map(|(word, _)| word.as_str()).collect();
    index.retain(|keyword| kept_words.contains(keyword));
    ui::debug(
        "finder.rarity.kept",
        &format!("{} keywords kept after rarity filtering", index.len()),
        json!({ "kept": index.len(), "scored": scores.len() }),
    );

    let enumeration = enumerate_sequences(records, &first, &index, &kept, config);
    stats.raw_sequences = enumeration.sequences.len();
    ui::debug(
        "finder.enumerate",
        &format!(
            "{} raw sequences for {} keywords",
            enumeration.sequences.len(),
            kept.len()
        ),
        json!({ "kept": kept.len(), "sequences": enumeration.sequences.len() }),
    );

    let sequences = select_diverse(enumeration.sequences, &enumeration.scores, config, rng);
    stats.selected = sequences.len();
    ui::debug(
        "finder.select",
        &format!("Selected {} sequences", sequences.len()),
        json!({ "selected": sequences.len(), "target": config.target_count }),
    );

    Ok(PipelineOutcome {
        sequences,
        scores: enumeration.scores,
        stats,
    })
}
