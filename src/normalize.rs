//! Text normalization applied to subject values before fuzzy matching.
//!
//! Normalization is input-local: it never consults the reference
//! vocabulary. The same rules are applied to reference entries by the
//! matcher so both sides of a comparison share one representation.
//!
//! Steps, in order:
//!
//! 1. Unicode lowercase.
//! 2. Every character that is not a letter, digit, whitespace, `-` or `+`
//!    becomes a space.
//! 3. Split on whitespace and strip `-`/`+` from token edges.
//! 4. Drop noise tokens: dosage-form words and pure dosage quantities
//!    (`500`, `500mg`, `10ml`).
//! 5. Join the surviving tokens with single spaces.

use std::{collections::HashSet, sync::OnceLock};

use regex::Regex;

/// Dosage-form and unit words that carry no substance identity.
pub const DEFAULT_NOISE_TOKENS: &[&str] = &[
    "mg",
    "g",
    "ml",
    "mcg",
    "µg",
    "ug",
    "ie",
    "iu",
    "tbl",
    "tabl",
    "tablette",
    "tabletten",
    "kps",
    "kapsel",
    "kapseln",
    "amp",
    "inf",
    "inj",
    "lsg",
];

fn dosage_pattern() -> &'static Regex {
    static DOSAGE: OnceLock<Regex> = OnceLock::new();
    DOSAGE.get_or_init(|| {
        Regex::new(r"^\d+(mg|g|ml|mcg|µg|ug|ie|iu)?$").expect("dosage pattern is valid")
    })
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    noise_tokens: HashSet<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::with_noise_tokens(DEFAULT_NOISE_TOKENS.iter().copied())
    }
}

impl Normalizer {
    /// Builds a normalizer that drops the given tokens (compared after lowercasing).
    pub fn with_noise_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            noise_tokens: tokens
                .into_iter()
                .map(|token| token.as_ref().trim().to_lowercase())
                .filter(|token| !token.is_empty())
                .collect(),
        }
    }

    /// Normalizes a raw value. Total: degenerate input yields an empty string.
    pub fn normalize(&self, value: &str) -> String {
        let folded = value.to_lowercase();
        let cleaned = folded
            .chars()
            .map(|ch| {
                if ch.is_alphanumeric() || ch.is_whitespace() || ch == '-' || ch == '+' {
                    ch
                } else {
                    ' '
                }
            })
            .collect::<String>();

        cleaned
            .split_whitespace()
            .map(|token| token.trim_matches(|ch: char| ch == '-' || ch == '+'))
            .filter(|token| !token.is_empty() && !self.is_noise(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_noise(&self, token: &str) -> bool {
        self.noise_tokens.contains(token) || dosage_pattern().is_match(token)
    }
}

/// Normalizes with the default noise-token set.
pub fn normalize(value: &str) -> String {
    Normalizer::default().normalize(value)
}
