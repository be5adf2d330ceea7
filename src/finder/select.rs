//! Randomized greedy selection of a diverse final set.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashMap};

use super::config::FinderConfig;
use super::types::{SelectionCandidate, Sequence};

#[derive(Debug, Clone)]
struct Trial {
    picks: Vec<usize>,
    overlap: f64,
    weight: u64,
}

fn commonness(scores: &HashMap<String, f64>, keyword: &str) -> f64 {
    // unscored keywords rank as the most common
    scores.get(keyword).copied().unwrap_or(f64::INFINITY)
}

fn total_overlap(candidates: &[SelectionCandidate], picks: &[usize], with: usize) -> f64 {
    picks
        .iter()
        .map(|&p| candidates[p].range.overlap_secs(&candidates[with].range))
        .sum()
}

fn score_trial(candidates: &[SelectionCandidate], picks: Vec<usize>) -> Trial {
    let mut overlap = 0.0;
    for (i, &a) in picks.iter().enumerate() {
        for &b in &picks[i + 1..] {
            overlap += candidates[a].range.overlap_secs(&candidates[b].range);
        }
    }
    let weight = picks
        .iter()
        .map(|&p| u64::from(candidates[p].content_weight))
        .sum();
    Trial {
        picks,
        overlap,
        weight,
    }
}

fn run_trial<R: Rng + ?Sized>(
    candidates: &[SelectionCandidate],
    groups: &BTreeMap<&str, Vec<usize>>,
    scores: &HashMap<String, f64>,
    config: &FinderConfig,
    rng: &mut R,
) -> Trial {
    let mut pool: Vec<&str> = groups.keys().copied().collect();
    let mut picks: Vec<usize> = Vec::with_capacity(config.target_count);

    while picks.len() < config.target_count && !pool.is_empty() {
        pool.sort_by(|a, b| {
            commonness(scores, a)
                .total_cmp(&commonness(scores, b))
                .then_with(|| a.cmp(b))
        });
        let rarest = config.rarest_pool.clamp(1, pool.len());
        let keyword = pool.remove(rng.gen_range(0..rarest));
        let group = &groups[keyword];

        let pick = if picks.is_empty() {
            group[rng.gen_range(0..group.len())]
        } else {
            let mut best = group[0];
            let mut best_overlap = total_overlap(candidates, &picks, best);
            for &candidate in &group[1..] {
                let overlap = total_overlap(candidates, &picks, candidate);
                let heavier = candidates[candidate].content_weight > candidates[best].content_weight;
                if overlap < best_overlap || (overlap == best_overlap && heavier) {
                    best = candidate;
                    best_overlap = overlap;
                }
            }
            best
        };
        picks.push(pick);
    }

    score_trial(candidates, picks)
}

/// Lowest total overlap wins, then the heavier trial; remaining ties are
/// broken at random.
fn best_trial<'t, R: Rng + ?Sized>(trials: &'t [Trial], rng: &mut R) -> Option<&'t Trial> {
    let lowest = trials.iter().min_by(|a, b| {
        a.overlap
            .total_cmp(&b.overlap)
            .then_with(|| b.weight.cmp(&a.weight))
    })?;
    let tied: Vec<&Trial> = trials
        .iter()
        .filter(|t| t.overlap == lowest.overlap && t.weight == lowest.weight)
        .collect();
    tied.choose(rng).copied()
}

fn group_by_keyword(candidates: &[SelectionCandidate]) -> BTreeMap<&str, Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, candidate) in candidates.iter().enumerate() {
        groups.entry(candidate.keyword.as_str()).or_default().push(i);
    }
    groups
}

/// Pick at most `target_count` sequences, one per keyword, preferring rare
/// keywords and little time overlap. The result is ordered by start time.
pub fn select_diverse<R: Rng + ?Sized>(
    sequences: Vec<Sequence>,
    scores: &HashMap<String, f64>,
    config: &FinderConfig,
    rng: &mut R,
) -> Vec<Sequence> {
    if sequences.is_empty() || config.target_count == 0 {
        return Vec::new();
    }

    let candidates: Vec<SelectionCandidate> =
        sequences.into_iter().map(SelectionCandidate::new).collect();
    let groups = group_by_keyword(&candidates);

    let trials: Vec<Trial> = (0..config.trials.max(1))
        .map(|_| run_trial(&candidates, &groups, scores, config, rng))
        .collect();
    let Some(best) = best_trial(&trials, rng) else {
        return Vec::new();
    };
    let picks = best.picks.clone();

    let mut slots: Vec<Option<SelectionCandidate>> = candidates.into_iter().map(Some).collect();
    let mut chosen: Vec<SelectionCandidate> =
        picks.iter().filter_map(|&p| slots[p].take()).collect();
    chosen.sort_by(|a, b| a.range.start.total_cmp(&b.range.start));
    chosen.into_iter().map(|c| c.sequence).collect()
}
