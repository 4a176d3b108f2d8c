//! Similarity scoring used by the reference matcher.
//!
//! A reference entry is scored against the whole input and against every
//! contiguous window of input tokens with the same token count as the
//! entry. The best score wins, so `aspirin 100` still scores 1.0 against
//! `aspirin`.

use std::{fmt, str::FromStr};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scorer {
    /// Normalized Levenshtein ratio: `1 - distance / max_len`.
    #[default]
    Levenshtein,
    JaroWinkler,
    /// Bigram overlap.
    SorensenDice,
}

impl Scorer {
    /// Raw similarity in `[0, 1]`. Empty text on either side scores 0.
    pub fn similarity(self, left: &str, right: &str) -> f64 {
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }
        match self {
            Scorer::Levenshtein => strsim::normalized_levenshtein(left, right),
            Scorer::JaroWinkler => strsim::jaro_winkler(left, right),
            Scorer::SorensenDice => strsim::sorensen_dice(left, right),
        }
    }

    /// Best score of `reference` against `input` or any same-width token window of it.
    ///
    /// Both sides are expected in normalized form (single-space separated).
    pub fn best_window_score(self, input: &str, reference: &str) -> f64 {
        if input.is_empty() || reference.is_empty() {
            return 0.0;
        }
        let mut best = self.similarity(input, reference);
        let input_tokens = input.split(' ').collect::<Vec<_>>();
        let width = reference.split(' ').count();
        if input_tokens.len() > width {
            for window in input_tokens.windows(width) {
                let candidate = self.similarity(&window.join(" "), reference);
                if candidate > best {
                    best = candidate;
                }
            }
        }
        round_score(best)
    }

    pub fn name(self) -> &'static str {
        match self {
            Scorer::Levenshtein => "levenshtein",
            Scorer::JaroWinkler => "jaro-winkler",
            Scorer::SorensenDice => "sorensen-dice",
        }
    }
}

impl fmt::Display for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scorer {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "levenshtein" | "ratio" => Ok(Scorer::Levenshtein),
            "jaro-winkler" | "jarowinkler" => Ok(Scorer::JaroWinkler),
            "sorensen-dice" | "dice" => Ok(Scorer::SorensenDice),
            other => Err(anyhow!("Unknown scorer '{other}'")),
        }
    }
}

/// Rounds to 4 decimals so comparisons, ordering, and rendered output agree.
pub fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}
