use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::config::DocumentedConfig;
use crate::common::paths;
use crate::documented_config;

/// Where keyword commonness scores come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    /// Local `word count` frequency table
    #[default]
    Table,
    /// Datamuse word-frequency API
    Datamuse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Records scanned forward when looking for the next triplet
    pub window_size: usize,
    /// Raw sequences kept per keyword before selection
    pub per_keyword_cap: usize,
    /// Sequences returned at most
    pub target_count: usize,
    /// Independent selection trials
    pub trials: usize,
    /// How many of the rarest remaining keywords each draw picks from
    pub rarest_pool: usize,
    /// Commonness above which a keyword counts as too common
    pub common_threshold: f64,
    /// Keywords kept regardless of commonness, as a multiple of `target_count`
    pub floor_ratio: f64,
    pub min_duration_secs: f64,
    pub max_duration_secs: f64,
    /// Filler records allowed between frame1 and frame2
    pub max_fillers: usize,
    /// Upper word bound for the second triplet's answer line
    pub t2_max_words: usize,
    /// Stop words on top of the built-in set
    pub extra_excluded_words: Vec<String>,
    pub oracle: OracleKind,
    pub frequency_table: Option<PathBuf>,
    pub datamuse_url: String,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            window_size: Self::DEFAULT_WINDOW_SIZE,
            per_keyword_cap: Self::DEFAULT_PER_KEYWORD_CAP,
            target_count: Self::DEFAULT_TARGET_COUNT,
            trials: Self::DEFAULT_TRIALS,
            rarest_pool: Self::DEFAULT_RAREST_POOL,
            common_threshold: Self::DEFAULT_COMMON_THRESHOLD,
            floor_ratio: Self::DEFAULT_FLOOR_RATIO,
            min_duration_secs: Self::DEFAULT_MIN_DURATION_SECS,
            max_duration_secs: Self::DEFAULT_MAX_DURATION_SECS,
            max_fillers: Self::DEFAULT_MAX_FILLERS,
            t2_max_words: Self::DEFAULT_T2_MAX_WORDS,
            extra_excluded_words: Vec::new(),
            oracle: OracleKind::default(),
            frequency_table: None,
            datamuse_url: Self::DEFAULT_DATAMUSE_URL.to_string(),
        }
    }
}

impl FinderConfig {
    pub const DEFAULT_WINDOW_SIZE: usize = 1000;
    pub const DEFAULT_PER_KEYWORD_CAP: usize = 100;
    pub const DEFAULT_TARGET_COUNT: usize = 18;
    pub const DEFAULT_TRIALS: usize = 3;
    pub const DEFAULT_RAREST_POOL: usize = 6;
    pub const DEFAULT_COMMON_THRESHOLD: f64 = 10_000.0;
    pub const DEFAULT_FLOOR_RATIO: f64 = 1.2;
    pub const DEFAULT_MIN_DURATION_SECS: f64 = 4.0;
    pub const DEFAULT_MAX_DURATION_SECS: f64 = 20.0;
    pub const DEFAULT_MAX_FILLERS: usize = 6;
    pub const DEFAULT_T2_MAX_WORDS: usize = 6;
    pub const DEFAULT_DATAMUSE_URL: &'static str = "https://api.datamuse.com";

    pub fn load() -> Result<Self> {
        Self::load_from_path(paths::finder_config_path()?)
    }

    /// Load from `path`, writing a documented default file if none exists.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_with_documentation(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading finder config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing finder config {}", path.display()))?;
        Ok(config.sanitized())
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_with_documentation(path.as_ref())
    }

    /// Replace values the search cannot work with by their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.window_size == 0 {
            self.window_size = defaults.window_size;
        }
        if self.per_keyword_cap == 0 {
            self.per_keyword_cap = defaults.per_keyword_cap;
        }
        if self.trials == 0 {
            self.trials = defaults.trials;
        }
        if self.rarest_pool == 0 {
            self.rarest_pool = defaults.rarest_pool;
        }
        if !self.common_threshold.is_finite() {
            self.common_threshold = defaults.common_threshold;
        }
        if !self.floor_ratio.is_finite() || self.floor_ratio < 0.0 {
            self.floor_ratio = defaults.floor_ratio;
        }
        let durations_ok = self.min_duration_secs.is_finite()
            && self.max_duration_secs.is_finite()
            && self.min_duration_secs >= 0.0
            && self.min_duration_secs <= self.max_duration_secs;
        if !durations_ok {
            self.min_duration_secs = defaults.min_duration_secs;
            self.max_duration_secs = defaults.max_duration_secs;
        }
        if self.max_fillers > Self::DEFAULT_MAX_FILLERS {
            self.max_fillers = defaults.max_fillers;
        }
        if self.t2_max_words == 0 {
            self.t2_max_words = defaults.t2_max_words;
        }
        self
    }

    /// Minimum number of keywords the rarity filter keeps when available.
    pub fn keyword_floor(&self) -> usize {
        (self.target_count as f64 * self.floor_ratio).ceil() as usize
    }

    /// Inclusive bound check on a triplet span, in whole milliseconds.
    pub fn span_in_bounds(&self, span: Duration) -> bool {
        let millis = span.as_millis();
        let bound = |secs: f64| (secs * 1000.0).round() as u128;
        millis >= bound(self.min_duration_secs) && millis <= bound(self.max_duration_secs)
    }
}

documented_config!(FinderConfig {
    fields: [
        window_size, "Records scanned forward when looking for the next triplet",
        per_keyword_cap, "Raw sequences kept per keyword before selection",
        target_count, "Sequences returned at most",
        trials, "Independent selection trials",
        rarest_pool, "Rarest keywords each selection draw picks from",
        common_threshold, "Commonness score above which a keyword is too common",
        floor_ratio, "Keywords always kept, as a multiple of target_count",
        min_duration_secs, "Shortest triplet span in seconds",
        max_duration_secs, "Longest triplet span in seconds",
        max_fillers, "Filler records allowed between frame1 and frame2",
        t2_max_words, "Most words allowed in the second answer line",
        extra_excluded_words, "Extra stop words that never become keywords",
        oracle, "Commonness source (table or datamuse)",
        datamuse_url, "Datamuse API base URL",
    ],
    optional: [
        frequency_table, "Path to a 'word count' frequency table",
    ],
    config_path: paths::finder_config_path(),
});
