mod common;
mod finder;
mod transcript;
mod ui;

use clap::{Parser, Subcommand};

use crate::finder::{ConfigCommands, FindArgs, ParseArgs, TranscriptArgs};
use crate::ui::prelude::*;

/// Find fill-in-the-blank triplets in subtitle transcripts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for reports and events
    #[arg(long, value_enum, default_value = "text", global = true)]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search a transcript for keyword-linked triplet sequences
    Find(FindArgs),
    /// Strip markup, parse a transcript and print its records as JSON
    Parse(ParseArgs),
    /// Print a transcript with markup removed
    Strip(TranscriptArgs),
    /// Finder configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let color = !cli.no_color && std::env::var_os("NO_COLOR").is_none();
    if !color {
        colored::control::set_override(false);
    }
    ui::init(cli.output, color);
    ui::set_debug_mode(cli.debug);

    let result = match cli.command {
        Commands::Find(args) => finder::handle_find(args).await,
        Commands::Parse(args) => finder::handle_parse(args).await,
        Commands::Strip(args) => finder::handle_strip(args).await,
        Commands::Config { command } => finder::handle_config(command),
    };

    if let Err(err) = result {
        emit(Level::Error, "blankline.error", &format!("Error: {err:#}"), None);
        std::process::exit(1);
    }
}
