//! Pipeline parameter resolution.
//!
//! Parameters arrive as loosely-typed text, from CLI flags or a YAML file, and
//! are resolved once into a [`PipelineParams`] record before any matching
//! happens. Values that fail to parse are replaced by their documented
//! defaults and a warning is logged, so a bad value never aborts a run.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde_yaml::Value;
use thiserror::Error;

use crate::{matcher::MatchOptions, scorer::Scorer};

pub const DEFAULT_SUBSTANCE_COLUMN: &str = "Bezeichnung";
pub const DEFAULT_REFERENCE_COLUMN: &str = "Substanz";
pub const DEFAULT_THRESHOLD: f64 = 0.85;
pub const DEFAULT_MAX_PER_MATCH_ID: usize = 2;

pub const KEY_SUBSTANCE_COL: &str = "substance_col";
pub const KEY_REF_SUBSTANCE_COL: &str = "ref_substance_col";
pub const KEY_THRESHOLD: &str = "threshold";
pub const KEY_MAX_PER_MATCH_ID: &str = "max_per_match_id";
pub const KEY_ONLY_FIRST_MATCH: &str = "only_first_match";
pub const KEY_SCORER: &str = "scorer";

const KNOWN_KEYS: &[&str] = &[
    KEY_SUBSTANCE_COL,
    KEY_REF_SUBSTANCE_COL,
    KEY_THRESHOLD,
    KEY_MAX_PER_MATCH_ID,
    KEY_ONLY_FIRST_MATCH,
    KEY_SCORER,
];

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("failed to read parameters file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed parameters YAML")]
    Yaml(#[from] serde_yaml::Error),
    #[error("parameters YAML must be a mapping of option names to values")]
    NotAMapping,
}

/// Unvalidated parameters keyed by option name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParameters {
    values: BTreeMap<String, String>,
}

impl RawParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Overlays `other` on top of `self`; keys present in `other` win.
    pub fn merge(&mut self, other: RawParameters) {
        self.values.extend(other.values);
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, ParamsError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let document: Value = serde_yaml::from_str(source)?;
        let mapping = match document {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            _ => return Err(ParamsError::NotAMapping),
        };
        let mut params = Self::default();
        for (key, value) in mapping {
            let Some(key) = scalar_text(&key) else {
                warn!("Ignoring non-scalar parameter key {key:?}");
                continue;
            };
            match value {
                Value::Null => continue,
                other => match scalar_text(&other) {
                    Some(text) => {
                        params.set(key, text);
                    }
                    None => warn!("Ignoring non-scalar value for parameter '{key}'"),
                },
            }
        }
        Ok(params)
    }

    pub fn load(path: &Path) -> Result<Self, ParamsError> {
        let source = fs::read_to_string(path).map_err(|source| ParamsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Fully-resolved parameters for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParams {
    pub substance_col: String,
    pub ref_substance_col: String,
    pub threshold: f64,
    pub max_per_match_id: usize,
    pub only_first_match: bool,
    pub scorer: Scorer,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            substance_col: DEFAULT_SUBSTANCE_COLUMN.to_string(),
            ref_substance_col: DEFAULT_REFERENCE_COLUMN.to_string(),
            threshold: DEFAULT_THRESHOLD,
            max_per_match_id: DEFAULT_MAX_PER_MATCH_ID,
            only_first_match: false,
            scorer: Scorer::default(),
        }
    }
}

impl PipelineParams {
    pub fn resolve(raw: &RawParameters) -> Self {
        for key in raw.values.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                debug!("Ignoring unknown parameter '{key}'");
            }
        }
        Self {
            substance_col: resolve_column(raw.get(KEY_SUBSTANCE_COL), DEFAULT_SUBSTANCE_COLUMN),
            ref_substance_col: resolve_column(
                raw.get(KEY_REF_SUBSTANCE_COL),
                DEFAULT_REFERENCE_COLUMN,
            ),
            threshold: resolve_threshold(raw.get(KEY_THRESHOLD)),
            max_per_match_id: resolve_max_per_match_id(raw.get(KEY_MAX_PER_MATCH_ID)),
            only_first_match: parse_bool(raw.get(KEY_ONLY_FIRST_MATCH)),
            scorer: resolve_scorer(raw.get(KEY_SCORER)),
        }
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            threshold: self.threshold,
            max_matches: self.max_per_match_id,
            first_only: self.only_first_match,
            scorer: self.scorer,
        }
    }
}

fn resolve_column(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default.to_string(),
    }
}

fn resolve_threshold(value: Option<&str>) -> f64 {
    let Some(raw) = value else {
        return DEFAULT_THRESHOLD;
    };
    match raw.trim().parse::<f64>() {
        Ok(parsed) if (0.0..=1.0).contains(&parsed) => parsed,
        _ => {
            warn!("Invalid threshold '{raw}', falling back to {DEFAULT_THRESHOLD}");
            DEFAULT_THRESHOLD
        }
    }
}

fn resolve_max_per_match_id(value: Option<&str>) -> usize {
    let Some(raw) = value else {
        return DEFAULT_MAX_PER_MATCH_ID;
    };
    match raw.trim().parse::<usize>() {
        Ok(parsed) if parsed >= 1 => parsed,
        _ => {
            warn!("Invalid max_per_match_id '{raw}', falling back to {DEFAULT_MAX_PER_MATCH_ID}");
            DEFAULT_MAX_PER_MATCH_ID
        }
    }
}

fn resolve_scorer(value: Option<&str>) -> Scorer {
    let Some(raw) = value else {
        return Scorer::default();
    };
    raw.parse().unwrap_or_else(|err| {
        warn!("{err}, falling back to {}", Scorer::default());
        Scorer::default()
    })
}

/// `1`, `true`, `yes` and `on` (any case, surrounding whitespace ignored) are true.
pub fn parse_bool(value: Option<&str>) -> bool {
    value.is_some_and(|raw| {
        matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}
