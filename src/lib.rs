pub mod cli;
pub mod dataset;
pub mod io_utils;
pub mod match_cmd;
pub mod match_table;
pub mod matcher;
pub mod normalize;
pub mod params;
pub mod pipeline;
pub mod report;
pub mod scorer;
pub mod stats;
pub mod table;

use std::{env, sync::OnceLock, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands},
    dataset::Dataset,
    normalize::Normalizer,
};

pub use crate::{
    params::{PipelineParams, RawParameters},
    pipeline::{PipelineOutput, run_pipeline},
    stats::RunStatistics,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("substance_match", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Match(args) => match_cmd::execute(&args),
        Commands::Normalize(args) => handle_normalize(&args),
        Commands::Stats(args) => handle_stats(&args),
    }
}

fn handle_normalize(args: &cli::NormalizeArgs) -> Result<()> {
    let delimiter = io_utils::resolve_delimiter(Some(args.input.as_path()), args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let column = args
        .column
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(params::DEFAULT_SUBSTANCE_COLUMN);
    info!(
        "Normalizing column '{}' of '{}' with delimiter '{}'",
        column,
        args.input.display(),
        printable_delimiter(delimiter)
    );
    let dataset = Dataset::from_path(&args.input, delimiter, encoding)
        .with_context(|| format!("Loading {:?}", args.input))?;
    let values = dataset.column_or_blank(column);
    let limit = if args.limit == 0 {
        values.len()
    } else {
        args.limit
    };

    let normalizer = Normalizer::default();
    let rows = values
        .iter()
        .take(limit)
        .map(|value| vec![value.clone(), normalizer.normalize(value)])
        .collect::<Vec<_>>();
    let headers = vec!["original".to_string(), "normalized".to_string()];
    print!("{}", table::render_table(&headers, &rows));
    info!("Displayed {} of {} row(s)", rows.len(), values.len());
    Ok(())
}

fn handle_stats(args: &cli::StatsArgs) -> Result<()> {
    let started = Instant::now();
    let delimiter = io_utils::resolve_delimiter(Some(args.input.as_path()), args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dataset = Dataset::from_path(&args.input, delimiter, encoding)
        .with_context(|| format!("Loading match table from {:?}", args.input))?;
    let stats = stats::aggregate_records(dataset.headers(), dataset.rows(), started);
    match_cmd::emit_report(&stats, args.report, false)
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
