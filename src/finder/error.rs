use std::path::PathBuf;

use thiserror::Error;

/// Failures of a commonness oracle backend.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read frequency table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("frequency table line {line} is invalid: {content}")]
    InvalidTableLine { line: usize, content: String },

    #[error("unexpected response for '{word}': {message}")]
    Response { word: String, message: String },
}

#[derive(Debug, Error)]
pub enum FinderError {
    /// Any failed lookup ends the run; scores are never defaulted.
    #[error("commonness lookup for '{word}' failed: {source}")]
    Oracle {
        word: String,
        #[source]
        source: OracleError,
    },

    #[error("could not build matcher for keywords {keywords}: {source}")]
    Matcher {
        keywords: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read transcript {path}: {source}")]
    Transcript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
