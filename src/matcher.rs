//! Reference matching: scores a normalized subject value against every
//! vocabulary entry and keeps the best candidates.
//!
//! Candidates below the threshold are discarded, the rest are ordered by
//! descending score with ties resolved by vocabulary order, then capped by
//! [`MatchOptions::cap`].

use log::debug;
use serde::Serialize;

use crate::{normalize::Normalizer, scorer::Scorer};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    /// The reference entry exactly as it appears in the vocabulary.
    pub reference: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub threshold: f64,
    pub max_matches: usize,
    pub first_only: bool,
    pub scorer: Scorer,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            max_matches: 2,
            first_only: false,
            scorer: Scorer::default(),
        }
    }
}

impl MatchOptions {
    /// Maximum number of candidates kept per subject value.
    pub fn cap(&self) -> usize {
        if self.first_only {
            self.max_matches.min(1)
        } else {
            self.max_matches
        }
    }
}

#[derive(Debug, Clone)]
struct ReferenceEntry {
    original: String,
    normalized: String,
}

/// A vocabulary prepared for repeated matching. Entries keep their order and
/// duplicates are retained.
#[derive(Debug, Clone)]
pub struct ReferenceMatcher {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceMatcher {
    pub fn new<S: AsRef<str>>(vocabulary: &[S], normalizer: &Normalizer) -> Self {
        let entries = vocabulary
            .iter()
            .map(|entry| ReferenceEntry {
                original: entry.as_ref().to_string(),
                normalized: normalizer.normalize(entry.as_ref()),
            })
            .collect::<Vec<_>>();
        let degenerate = entries.iter().filter(|e| e.normalized.is_empty()).count();
        if degenerate > 0 {
            debug!("{degenerate} reference entries normalize to empty text and can never match");
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, normalized_value: &str, options: &MatchOptions) -> Vec<MatchCandidate> {
        let cap = options.cap();
        if normalized_value.is_empty() || cap == 0 {
            return Vec::new();
        }
        let mut candidates = self
            .entries
            .iter()
            .filter_map(|entry| {
                let score = options
                    .scorer
                    .best_window_score(normalized_value, &entry.normalized);
                (score > 0.0 && score >= options.threshold).then(|| MatchCandidate {
                    reference: entry.original.clone(),
                    score,
                })
            })
            .collect::<Vec<_>>();
        // Stable sort keeps vocabulary order among equal scores.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(cap);
        candidates
    }
}

/// One-shot match of a normalized value against a raw vocabulary.
pub fn match_value<S: AsRef<str>>(
    normalized_value: &str,
    vocabulary: &[S],
    options: &MatchOptions,
) -> Vec<MatchCandidate> {
    ReferenceMatcher::new(vocabulary, &Normalizer::default()).find(normalized_value, options)
}
