use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reconcile free-text substance names against a reference vocabulary",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fuzzy-match a subject column against a reference vocabulary and report match quality
    Match(MatchArgs),
    /// Preview how the values of a column are normalized before matching
    Normalize(NormalizeArgs),
    /// Recompute match statistics from a previously written match table
    Stats(StatsArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    None,
}

#[derive(Debug, Args)]
pub struct MatchArgs {
    /// Subject file containing the free-text substance column ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Reference file containing the canonical substance names
    #[arg(short = 'r', long = "reference")]
    pub reference: PathBuf,
    /// Output file for the match table (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// YAML file with matching parameters; flags given on the command line take precedence
    #[arg(short = 'p', long = "params")]
    pub params: Option<PathBuf>,
    /// Subject column to match (default: Bezeichnung)
    #[arg(long = "substance-col")]
    pub substance_col: Option<String>,
    /// Reference column to match against (default: Substanz)
    #[arg(long = "ref-substance-col")]
    pub ref_substance_col: Option<String>,
    /// Minimum similarity in [0, 1] to keep a candidate (default: 0.85)
    #[arg(long)]
    pub threshold: Option<String>,
    /// Maximum candidates kept per subject row (default: 2)
    #[arg(long = "max-per-match-id")]
    pub max_per_match_id: Option<String>,
    /// Keep only the single best candidate per subject row
    #[arg(long = "only-first-match")]
    pub only_first_match: bool,
    /// Similarity function: levenshtein, jaro-winkler, or sorensen-dice
    #[arg(long)]
    pub scorer: Option<String>,
    /// Delimiter for the subject file (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter for the reference file (defaults to the subject delimiter rules)
    #[arg(long = "reference-delimiter", value_parser = parse_delimiter)]
    pub reference_delimiter: Option<u8>,
    /// Delimiter for the match table output (defaults to the subject delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the subject file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding of the reference file (defaults to utf-8)
    #[arg(long = "reference-encoding")]
    pub reference_encoding: Option<String>,
    /// Prefix the match columns with every column of the subject file
    #[arg(long = "append-source")]
    pub append_source: bool,
    /// How to print the statistics report
    #[arg(long, value_enum, default_value = "table")]
    pub report: ReportFormat,
    /// Also write the statistics as JSON to this path
    #[arg(long = "stats-json")]
    pub stats_json: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Input file to read
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Column whose values are normalized (default: Bezeichnung)
    #[arg(short = 'C', long = "column")]
    pub column: Option<String>,
    /// Number of rows to display (0 = all)
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Match table previously written by `match`
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// How to print the statistics report
    #[arg(long, value_enum, default_value = "table")]
    pub report: ReportFormat,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "semicolon" | ";" => Ok(b';'),
        "pipe" | "|" => Ok(b'|'),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (None, _) => Err("Delimiter cannot be empty".to_string()),
                (Some(_), Some(_)) => Err("Delimiter must be a single character".to_string()),
                (Some(ch), None) if !ch.is_ascii() => Err("Delimiter must be ASCII".to_string()),
                (Some(ch), None) => Ok(ch as u8),
            }
        }
    }
}
