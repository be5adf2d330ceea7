use clap::{Args, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::transcript::timestamp_to_seconds;

#[derive(Args, Debug, Clone)]
pub struct FindArgs {
    /// SRT transcript to search
    #[arg(value_hint = ValueHint::FilePath)]
    pub transcript: PathBuf,

    /// Finder config file (defaults to the user config directory)
    #[arg(short = 'c', long = "config", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Score keywords with this `word count` frequency table
    #[arg(short = 'f', long = "frequency-table", value_hint = ValueHint::FilePath, conflicts_with = "datamuse")]
    pub frequency_table: Option<PathBuf>,

    /// Score keywords with the Datamuse API
    #[arg(long)]
    pub datamuse: bool,

    /// Seed the selector for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of sequences to return
    #[arg(short = 'n', long = "target")]
    pub target: Option<usize>,

    /// Also write the JSON report to this file
    #[arg(short = 'o', long = "out-file", value_hint = ValueHint::FilePath)]
    pub out_file: Option<PathBuf>,

    /// Export every selected triplet as a standalone SRT file into this directory
    #[arg(long = "export-dir", value_hint = ValueHint::DirPath)]
    pub export_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TranscriptArgs {
    /// SRT transcript file
    #[arg(value_hint = ValueHint::FilePath)]
    pub transcript: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// SRT transcript file
    #[arg(value_hint = ValueHint::FilePath)]
    pub transcript: PathBuf,

    /// Only print records starting at or after this time (HH:MM:SS,mmm)
    #[arg(long, value_parser = timestamp_to_seconds)]
    pub from: Option<f64>,

    /// Only print records ending at or before this time (HH:MM:SS,mmm)
    #[arg(long, value_parser = timestamp_to_seconds)]
    pub to: Option<f64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective finder configuration
    Show {
        #[arg(short = 'c', long = "config", value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
    },
    /// Write a documented default configuration file
    Init {
        #[arg(short = 'c', long = "config", value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the default configuration path
    Path,
}
