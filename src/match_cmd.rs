use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use log::info;

use crate::{
    cli::{MatchArgs, ReportFormat},
    dataset::Dataset,
    io_utils,
    params::{self, PipelineParams, RawParameters},
    pipeline::run_pipeline,
    printable_delimiter, report,
    stats::RunStatistics,
};

pub fn execute(args: &MatchArgs) -> Result<()> {
    if io_utils::is_dash(&args.input) && io_utils::is_dash(&args.reference) {
        bail!("Subject and reference cannot both be read from stdin");
    }

    let params = resolve_params(args)?;

    let subject_delimiter = io_utils::resolve_delimiter(Some(args.input.as_path()), args.delimiter);
    let reference_delimiter = io_utils::resolve_delimiter(
        Some(args.reference.as_path()),
        args.reference_delimiter.or(args.delimiter),
    );
    let output_delimiter = args.output_delimiter.unwrap_or(subject_delimiter);
    let subject_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let reference_encoding = io_utils::resolve_encoding(args.reference_encoding.as_deref())?;

    info!(
        "Reading subject '{}' (delimiter '{}') and reference '{}' (delimiter '{}')",
        args.input.display(),
        printable_delimiter(subject_delimiter),
        args.reference.display(),
        printable_delimiter(reference_delimiter)
    );
    let subject = Dataset::from_path(&args.input, subject_delimiter, subject_encoding)
        .with_context(|| format!("Loading subject data from {:?}", args.input))?;
    let reference = Dataset::from_path(&args.reference, reference_delimiter, reference_encoding)
        .with_context(|| format!("Loading reference data from {:?}", args.reference))?;

    let output = run_pipeline(&subject, &reference, &params);

    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), output_delimiter)?;
    let written = if args.append_source {
        let (headers, rows) = output.combined(&subject);
        io_utils::write_table(&mut writer, &headers, rows)?
    } else {
        io_utils::write_table(
            &mut writer,
            &output.table.column_names(),
            output.table.records(),
        )?
    };
    match &args.output {
        Some(path) if !io_utils::is_dash(path) => {
            info!("Wrote {written} row(s) to {path:?}")
        }
        _ => info!("Wrote {written} row(s) to stdout"),
    }

    if let Some(path) = &args.stats_json {
        report::write_json(&output.stats, path)?;
        info!("Statistics written to {path:?}");
    }

    let table_on_stdout = args.output.as_deref().is_none_or(io_utils::is_dash);
    emit_report(&output.stats, args.report, table_on_stdout)
}

fn resolve_params(args: &MatchArgs) -> Result<PipelineParams> {
    let mut raw = match &args.params {
        Some(path) => RawParameters::load(path)
            .with_context(|| format!("Loading parameters from {path:?}"))?,
        None => RawParameters::new(),
    };
    let mut overrides = RawParameters::new();
    let flags = [
        (params::KEY_SUBSTANCE_COL, &args.substance_col),
        (params::KEY_REF_SUBSTANCE_COL, &args.ref_substance_col),
        (params::KEY_THRESHOLD, &args.threshold),
        (params::KEY_MAX_PER_MATCH_ID, &args.max_per_match_id),
        (params::KEY_SCORER, &args.scorer),
    ];
    for (key, value) in flags {
        if let Some(value) = value {
            overrides.set(key, value.as_str());
        }
    }
    if args.only_first_match {
        overrides.set(params::KEY_ONLY_FIRST_MATCH, "true");
    }
    raw.merge(overrides);
    Ok(PipelineParams::resolve(&raw))
}

/// Prints the report on stdout, or on stderr when stdout carries the match table.
pub(crate) fn emit_report(stats: &RunStatistics, format: ReportFormat, to_stderr: bool) -> Result<()> {
    let rendered = match format {
        ReportFormat::None => return Ok(()),
        ReportFormat::Table => report::render_summary(stats),
        ReportFormat::Json => {
            let mut json = report::to_json(stats)?;
            json.push('\n');
            json
        }
    };
    if to_stderr {
        io::stderr()
            .write_all(rendered.as_bytes())
            .context("Writing report to stderr")
    } else {
        io::stdout()
            .write_all(rendered.as_bytes())
            .context("Writing report to stdout")
    }
}
