use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use std::fs;
use std::path::Path;

use super::cli::{ConfigCommands, FindArgs, ParseArgs, TranscriptArgs};
use super::config::{FinderConfig, OracleKind};
use super::pipeline::{find_sequences, load_transcript};
use super::rarity::{CommonnessOracle, DatamuseOracle, FrequencyTable};
use super::report::{SequenceReport, export_srt};
use crate::common::config::DocumentedConfig;
use crate::common::progress::{create_spinner, finish_spinner_with_success};
use crate::transcript::{prepare_transcript, strip_markup};
use crate::ui::prelude::*;

fn load_config(path: Option<&Path>) -> Result<FinderConfig> {
    match path {
        Some(path) => FinderConfig::load_from_path(path),
        None => FinderConfig::load(),
    }
}

async fn build_oracle(args: &FindArgs, config: &FinderConfig) -> Result<Box<dyn CommonnessOracle>> {
    let kind = if args.datamuse {
        OracleKind::Datamuse
    } else if args.frequency_table.is_some() {
        OracleKind::Table
    } else {
        config.oracle
    };

    match kind {
        OracleKind::Datamuse => Ok(Box::new(DatamuseOracle::new(config.datamuse_url.clone()))),
        OracleKind::Table => {
            let Some(path) = args
                .frequency_table
                .as_deref()
                .or(config.frequency_table.as_deref())
            else {
                bail!(
                    "No frequency table configured; pass --frequency-table, set frequency_table in the config, or use --datamuse"
                );
            };
            let table = FrequencyTable::load(path)
                .await
                .with_context(|| format!("loading frequency table {}", path.display()))?;
            emit(
                Level::Debug,
                "finder.oracle.table",
                &format!("Loaded {} word frequencies from {}", table.len(), path.display()),
                Some(json!({ "words": table.len(), "path": path.display().to_string() })),
            );
            Ok(Box::new(table))
        }
    }
}

pub async fn handle_find(args: FindArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(target) = args.target {
        config.target_count = target;
    }

    let raw = load_transcript(&args.transcript).await?;
    let oracle = build_oracle(&args, &config).await?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let spinner = matches!(get_output_format(), OutputFormat::Text)
        .then(|| create_spinner(format!("Searching {}", args.transcript.display())));
    let outcome = find_sequences(&raw, oracle.as_ref(), &config, &mut rng).await;
    let outcome = match (outcome, spinner) {
        (Ok(outcome), Some(pb)) => {
            finish_spinner_with_success(
                pb,
                format!("Found {} sequences", outcome.sequences.len()),
            );
            outcome
        }
        (Ok(outcome), None) => outcome,
        (Err(err), pb) => {
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            return Err(err).context("finding sequences");
        }
    };

    let report = SequenceReport::new(&args.transcript, oracle.name(), &outcome);
    match get_output_format() {
        OutputFormat::Json => println!("{}", report.to_json_line()?),
        OutputFormat::Text => print!("{}", report.render_text()),
    }

    if let Some(out_file) = &args.out_file {
        fs::write(out_file, report.to_json()?)
            .with_context(|| format!("writing report to {}", out_file.display()))?;
        emit(
            Level::Success,
            "finder.report.written",
            &format!("Report written to {}", out_file.display()),
            None,
        );
    }

    if let Some(dir) = &args.export_dir {
        let written = export_srt(&outcome.sequences, dir)?;
        emit(
            Level::Success,
            "finder.export",
            &format!("Exported {} triplet files to {}", written.len(), dir.display()),
            Some(json!({ "files": written.len() })),
        );
    }

    Ok(())
}

pub async fn handle_parse(args: ParseArgs) -> Result<()> {
    let raw = load_transcript(&args.transcript).await?;
    let records: Vec<_> = prepare_transcript(&raw)
        .into_iter()
        .filter(|record| args.from.is_none_or(|from| record.start_secs() >= from))
        .filter(|record| args.to.is_none_or(|to| record.end_secs() <= to))
        .collect();
    crate::ui::debug(
        "transcript.parse",
        &format!("Parsed {} records from {}", records.len(), args.transcript.display()),
        json!({ "records": records.len() }),
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&records).context("serializing records")?
    );
    Ok(())
}

pub async fn handle_strip(args: TranscriptArgs) -> Result<()> {
    let raw = load_transcript(&args.transcript).await?;
    print!("{}", strip_markup(&raw));
    Ok(())
}

pub fn handle_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { config } => {
            let config = load_config(config.as_deref())?;
            match get_output_format() {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&config).context("serializing config")?
                ),
                OutputFormat::Text => print!("{}", config.to_documented_toml()),
            }
        }
        ConfigCommands::Init { config, force } => {
            let path = match config {
                Some(path) => path,
                None => FinderConfig::config_path()?,
            };
            if path.exists() && !force {
                bail!(
                    "{} already exists; pass --force to overwrite it",
                    path.display()
                );
            }
            FinderConfig::default().save_to_path(&path)?;
            emit(
                Level::Success,
                "config.init",
                &format!("Wrote default config to {}", path.display()),
                None,
            );
        }
        ConfigCommands::Path => {
            println!("{}", FinderConfig::config_path()?.display());
        }
    }
    Ok(())
}
