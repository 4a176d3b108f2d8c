//! In-memory tabular dataset with named columns and stable row order.

use std::{io::Read, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, warn};

use crate::io_utils;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_path(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let dataset =
            Self::from_csv(reader, encoding).with_context(|| format!("Reading dataset {path:?}"))?;
        debug!(
            "Loaded {} row(s) x {} column(s) from {:?}",
            dataset.row_count(),
            dataset.headers.len(),
            path
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        Self::from_csv(io_utils::open_csv_reader(reader, delimiter), encoding)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, encoding: &'static Encoding) -> Result<Self> {
        let headers = io_utils::reader_headers(&mut reader, encoding)?;
        let mut rows = Vec::new();
        for (row_idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
            let decoded = io_utils::decode_record(&record, encoding)
                .with_context(|| format!("Decoding row {}", row_idx + 2))?;
            rows.push(decoded);
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of the named column; cells missing from short rows read as empty.
    pub fn column(&self, name: &str) -> Option<Vec<String>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or_default())
                .collect(),
        )
    }

    /// Subject column selection: an absent column becomes one blank value per
    /// row so the row count is preserved.
    pub fn column_or_blank(&self, name: &str) -> Vec<String> {
        self.column(name).unwrap_or_else(|| {
            warn!(
                "Column '{name}' not found (available: {}); treating all {} row(s) as empty",
                self.headers.join(", "),
                self.row_count()
            );
            vec![String::new(); self.row_count()]
        })
    }

    /// Reference column selection: an absent column becomes an empty vocabulary.
    pub fn column_or_empty(&self, name: &str) -> Vec<String> {
        self.column(name).unwrap_or_else(|| {
            warn!(
                "Reference column '{name}' not found (available: {}); vocabulary is empty",
                self.headers.join(", ")
            );
            Vec::new()
        })
    }
}
