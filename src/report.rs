//! Rendering of [`RunStatistics`] for people (text tables) and for tools (JSON).

use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::{stats::RunStatistics, table};

pub fn render_summary(stats: &RunStatistics) -> String {
    let headers = vec!["metric".to_string(), "value".to_string()];
    let rows = vec![
        row("total rows", stats.total_rows.to_string()),
        row("found", stats.found_count().to_string()),
        row("missing", stats.missing_count.to_string()),
        row("missing %", format!("{:.2}", stats.missing_pct)),
        row("distinct values", stats.unique_total_values.to_string()),
        row("distinct missing", stats.unique_missing_count.to_string()),
        row("distinct missing %", format!("{:.2}", stats.unique_missing_pct)),
        row(
            "mapped column",
            stats.mapped_column.clone().unwrap_or_else(|| "-".to_string()),
        ),
        row("output columns", stats.columns_out.join(", ")),
        row("seconds", format!("{:.4}", stats.processing_seconds)),
    ];
    let mut output = table::render_table(&headers, &rows);

    if !stats.unique_missing_examples.is_empty() {
        output.push('\n');
        output.push_str("Most frequent unmatched values\n");
        let example_headers = vec!["value".to_string(), "count".to_string()];
        let example_rows = stats
            .unique_missing_examples
            .iter()
            .map(|(value, count)| vec![value.clone(), count.to_string()])
            .collect::<Vec<_>>();
        output.push_str(&table::render_table(&example_headers, &example_rows));
    }
    output
}

fn row(label: &str, value: String) -> Vec<String> {
    vec![label.to_string(), value]
}

pub fn to_json(stats: &RunStatistics) -> Result<String> {
    serde_json::to_string_pretty(stats).context("Serializing run statistics")
}

pub fn write_json(stats: &RunStatistics, path: &Path) -> Result<()> {
    let json = to_json(stats)?;
    fs::write(path, json).with_context(|| format!("Writing statistics to {path:?}"))
}
