//! Match table construction.
//!
//! The builder normalizes and matches every subject value in order and keeps
//! the result as typed rows. Column names only come into existence when the
//! table is rendered: `Original`, `Normalized`, then one `Mapped_to` and one
//! `Score` column per candidate slot. With a single slot the columns are
//! named `Mapped_to` and `Score`; with several they carry a 1-based suffix
//! (`Mapped_to1`, `Mapped_to2`, ...).

use log::debug;

use crate::{
    matcher::{MatchCandidate, MatchOptions, ReferenceMatcher},
    normalize::Normalizer,
};

pub const ORIGINAL_COLUMN: &str = "Original";
pub const NORMALIZED_COLUMN: &str = "Normalized";
pub const MAPPED_PREFIX: &str = "Mapped_to";
pub const SCORE_PREFIX: &str = "Score";

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    pub original: String,
    pub normalized: String,
    /// Kept candidates, best first. Never longer than the table's slot count.
    pub candidates: Vec<MatchCandidate>,
}

impl MatchRow {
    pub fn primary(&self) -> Option<&MatchCandidate> {
        self.candidates.first()
    }

    /// A row is missing when it has no primary mapping or the mapping is blank.
    pub fn is_missing(&self) -> bool {
        self.primary()
            .is_none_or(|candidate| candidate.reference.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchTable {
    slots: usize,
    rows: Vec<MatchRow>,
}

impl MatchTable {
    pub fn new(slots: usize, rows: Vec<MatchRow>) -> Self {
        Self { slots, rows }
    }

    pub fn rows(&self) -> &[MatchRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        let mut columns = vec![ORIGINAL_COLUMN.to_string(), NORMALIZED_COLUMN.to_string()];
        columns.extend((1..=self.slots).map(|slot| slot_column(MAPPED_PREFIX, slot, self.slots)));
        columns.extend((1..=self.slots).map(|slot| slot_column(SCORE_PREFIX, slot, self.slots)));
        columns
    }

    /// Name of the column carrying the primary mapping, if the table has any slot.
    pub fn mapped_column(&self) -> Option<String> {
        (self.slots > 0).then(|| slot_column(MAPPED_PREFIX, 1, self.slots))
    }

    /// Renders every row as text cells aligned with [`MatchTable::column_names`].
    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(|row| {
            let mut record = Vec::with_capacity(2 + self.slots * 2);
            record.push(row.original.clone());
            record.push(row.normalized.clone());
            for slot in 0..self.slots {
                record.push(
                    row.candidates
                        .get(slot)
                        .map(|c| c.reference.clone())
                        .unwrap_or_default(),
                );
            }
            for slot in 0..self.slots {
                record.push(
                    row.candidates
                        .get(slot)
                        .map(|c| format_score(c.score))
                        .unwrap_or_default(),
                );
            }
            record
        })
    }
}

fn slot_column(prefix: &str, slot: usize, slots: usize) -> String {
    if slots == 1 {
        prefix.to_string()
    } else {
        format!("{prefix}{slot}")
    }
}

pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        let rendered = format!("{score:.4}");
        rendered.trim_end_matches('0').to_string()
    }
}

/// Normalizes and matches a whole subject column, one output row per input row.
pub fn build_match_table<S, R>(
    subject_column: &[S],
    vocabulary: &[R],
    options: &MatchOptions,
) -> MatchTable
where
    S: AsRef<str>,
    R: AsRef<str>,
{
    let normalizer = Normalizer::default();
    let matcher = ReferenceMatcher::new(vocabulary, &normalizer);
    build_match_table_with(&normalizer, &matcher, subject_column, options)
}

pub fn build_match_table_with<S: AsRef<str>>(
    normalizer: &Normalizer,
    matcher: &ReferenceMatcher,
    subject_column: &[S],
    options: &MatchOptions,
) -> MatchTable {
    let rows = subject_column
        .iter()
        .map(|value| {
            let original = value.as_ref().to_string();
            let normalized = normalizer.normalize(&original);
            let candidates = matcher.find(&normalized, options);
            MatchRow {
                original,
                normalized,
                candidates,
            }
        })
        .collect::<Vec<_>>();
    debug!(
        "Matched {} subject row(s) against {} reference entries",
        rows.len(),
        matcher.len()
    );
    MatchTable::new(options.max_matches, rows)
}
