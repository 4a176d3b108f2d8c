//! Match-quality statistics derived from a completed match table.
//!
//! Row-level metrics count rows whose primary mapping is absent. Distinct
//! metrics work on the trimmed `Original` values, ignoring blanks. The
//! ranked list of unmatched values keeps the [`TOP_MISSING_LIMIT`] most
//! frequent ones, ordered by descending count and then by first appearance.
//!
//! Percentages are rounded to 2 decimals with ties going to the even digit.
//!
//! `unique_missing_pct` divides by 1 when there are no distinct values, so in
//! that case the figure is a raw count rather than a percentage.

use std::{collections::HashMap, time::Instant};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::match_table::{MAPPED_PREFIX, MatchTable, ORIGINAL_COLUMN};

pub const TOP_MISSING_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub total_rows: usize,
    pub missing_count: usize,
    pub missing_pct: f64,
    pub unique_total_values: usize,
    pub unique_missing_count: usize,
    pub unique_missing_pct: f64,
    pub processing_seconds: f64,
    pub columns_out: Vec<String>,
    pub mapped_column: Option<String>,
    pub unique_missing_examples: Vec<(String, usize)>,
}

impl RunStatistics {
    pub fn found_count(&self) -> usize {
        self.total_rows - self.missing_count
    }
}

struct RowObservation {
    missing: bool,
    /// Trimmed original value; `None` when blank or when no `Original` column exists.
    original: Option<String>,
}

/// Summarizes a typed match table. `started` marks the beginning of the run
/// so the reported duration covers matching as well as aggregation.
pub fn aggregate(table: &MatchTable, started: Instant) -> RunStatistics {
    let observations = table.rows().iter().map(|row| RowObservation {
        missing: row.is_missing(),
        original: present(&row.original),
    });
    summarize(
        observations,
        true,
        table.column_names(),
        table.mapped_column(),
        started,
    )
}

/// Summarizes a match table known only by column names and text records,
/// such as one read back from disk. The mapped column is discovered with
/// [`find_mapped_column`].
pub fn aggregate_records(columns: &[String], records: &[Vec<String>], started: Instant) -> RunStatistics {
    let mapped_column = find_mapped_column(columns).map(str::to_string);
    let mapped_index = mapped_column
        .as_deref()
        .and_then(|name| columns.iter().position(|c| c == name));
    let original_index = columns.iter().position(|c| c == ORIGINAL_COLUMN);
    debug!(
        "Discovered mapped column {:?}, original column present: {}",
        mapped_column,
        original_index.is_some()
    );

    let observations = records.iter().map(|record| RowObservation {
        missing: match mapped_index {
            Some(idx) => record.get(idx).is_none_or(|cell| cell.trim().is_empty()),
            None => true,
        },
        original: original_index
            .and_then(|idx| record.get(idx))
            .and_then(|cell| present(cell)),
    });
    summarize(
        observations,
        original_index.is_some(),
        columns.to_vec(),
        mapped_column,
        started,
    )
}

/// Prefers an exact `Mapped_to` column, then the first column starting with it.
pub fn find_mapped_column(columns: &[String]) -> Option<&str> {
    columns
        .iter()
        .find(|c| c.as_str() == MAPPED_PREFIX)
        .or_else(|| columns.iter().find(|c| c.starts_with(MAPPED_PREFIX)))
        .map(String::as_str)
}

fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn summarize(
    observations: impl Iterator<Item = RowObservation>,
    has_original: bool,
    columns_out: Vec<String>,
    mapped_column: Option<String>,
    started: Instant,
) -> RunStatistics {
    let mut total_rows = 0usize;
    let mut missing_count = 0usize;
    let mut distinct = DistinctCounter::default();
    let mut missing = DistinctCounter::default();

    for observation in observations {
        total_rows += 1;
        if observation.missing {
            missing_count += 1;
        }
        if let Some(original) = observation.original {
            if observation.missing {
                missing.ingest(&original);
            }
            distinct.ingest(&original);
        }
    }

    let missing_pct = if total_rows > 0 {
        percent(missing_count, total_rows)
    } else {
        0.0
    };

    let (unique_total_values, unique_missing_count, unique_missing_pct, examples) = if has_original {
        let unique_total = distinct.len();
        let unique_missing = missing.len();
        (
            unique_total,
            unique_missing,
            percent(unique_missing, unique_total.max(1)),
            missing.top(TOP_MISSING_LIMIT),
        )
    } else {
        (
            0,
            missing_count,
            percent(missing_count, total_rows.max(1)),
            Vec::new(),
        )
    };

    let processing_seconds = round_to(started.elapsed().as_secs_f64(), 4);
    info!(
        "{missing_count} of {total_rows} row(s) unmatched ({missing_pct:.2}%), {unique_missing_count} of {unique_total_values} distinct value(s)"
    );

    RunStatistics {
        total_rows,
        missing_count,
        missing_pct,
        unique_total_values,
        unique_missing_count,
        unique_missing_pct,
        processing_seconds,
        columns_out,
        mapped_column,
        unique_missing_examples: examples,
    }
}

/// Counts occurrences per value while remembering first-seen order.
#[derive(Default)]
struct DistinctCounter {
    positions: HashMap<String, usize>,
    counts: Vec<(String, usize)>,
}

impl DistinctCounter {
    fn ingest(&mut self, value: &str) {
        match self.positions.get(value) {
            Some(&idx) => self.counts[idx].1 += 1,
            None => {
                self.positions.insert(value.to_string(), self.counts.len());
                self.counts.push((value.to_string(), 1));
            }
        }
    }

    fn len(&self) -> usize {
        self.counts.len()
    }

    fn top(&self, limit: usize) -> Vec<(String, usize)> {
        let mut items = self.counts.clone();
        // Stable: equal counts stay in first-seen order.
        items.sort_by(|a, b| b.1.cmp(&a.1));
        items.truncate(limit);
        items
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    round_to(part as f64 / whole as f64 * 100.0, 2)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}
