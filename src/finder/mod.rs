//! Fill-in-the-blank triplet finder over subtitle transcripts.

mod boundary;
pub mod cli;
pub mod commands;
mod config;
mod enumerate;
mod error;
mod first_index;
mod keyword_index;
mod pipeline;
mod rarity;
mod report;
mod search;
mod select;
mod types;

pub use cli::{ConfigCommands, FindArgs, ParseArgs, TranscriptArgs};
pub use commands::{handle_config, handle_find, handle_parse, handle_strip};
