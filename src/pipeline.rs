//! End-to-end reconciliation run: column selection, normalization, matching
//! and statistics.
//!
//! A run is a pure function of its inputs. Missing columns degrade to blank
//! subject values or an empty vocabulary and show up as unmatched rows in the
//! statistics instead of failing the run.

use std::time::Instant;

use log::info;

use crate::{
    dataset::Dataset,
    match_table::{MatchTable, build_match_table},
    params::PipelineParams,
    stats::{self, RunStatistics},
};

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: MatchTable,
    pub stats: RunStatistics,
}

impl PipelineOutput {
    /// Subject columns followed by the match columns, joined by row position.
    pub fn combined(&self, subject: &Dataset) -> (Vec<String>, Vec<Vec<String>>) {
        let mut headers = subject.headers().to_vec();
        headers.extend(self.table.column_names());
        let width = subject.headers().len();
        let rows = subject
            .rows()
            .iter()
            .zip(self.table.records())
            .map(|(source, matched)| {
                let mut row = source.clone();
                row.resize(width, String::new());
                row.extend(matched);
                row
            })
            .collect();
        (headers, rows)
    }
}

pub fn run_pipeline(subject: &Dataset, reference: &Dataset, params: &PipelineParams) -> PipelineOutput {
    let started = Instant::now();
    let subject_column = subject.column_or_blank(&params.substance_col);
    let vocabulary = reference.column_or_empty(&params.ref_substance_col);
    info!(
        "Matching {} value(s) from '{}' against {} reference value(s) from '{}' (threshold {}, max {} per row{}, scorer {})",
        subject_column.len(),
        params.substance_col,
        vocabulary.len(),
        params.ref_substance_col,
        params.threshold,
        params.max_per_match_id,
        if params.only_first_match {
            ", first only"
        } else {
            ""
        },
        params.scorer
    );

    let table = build_match_table(&subject_column, &vocabulary, &params.match_options());
    let stats = stats::aggregate(&table, started);
    info!(
        "Matched {} of {} row(s) in {:.4}s",
        stats.found_count(),
        stats.total_rows,
        stats.processing_seconds
    );
    PipelineOutput { table, stats }
}
