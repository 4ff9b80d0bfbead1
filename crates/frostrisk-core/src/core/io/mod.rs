//! Loaders for the engine's external inputs.
//!
//! Every loader either returns a fully parsed table or a [`LoadError`] naming the file. Row-level
//! problems that only affect one dam (bad coordinates, missing values) are not errors here; they
//! are carried through as absent values and resolved by the engine.

pub mod dams;
pub mod projections;
pub mod registry;
pub mod stations;
pub mod thermal;

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Required column '{column}' not found in '{path}'")]
    MissingColumn { path: String, column: &'static str },
    #[error("No usable rows in '{path}'")]
    Empty { path: String },
    #[error("Invalid value in '{path}' (row {row}): {detail}")]
    InvalidValue {
        path: String,
        row: usize,
        detail: String,
    },
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Parses a decimal cell. Accepts comma decimal separators and the Unicode minus sign; empty
/// cells, `-` and non-finite values are absent.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace('\u{2212}', "-").replace(',', ".");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a year cell, tolerating float exports such as `"1965.0"`.
pub fn parse_year(raw: &str) -> Option<i32> {
    let value = parse_decimal(raw)?;
    (value.fract() == 0.0 && (0.0..=9999.0).contains(&value)).then_some(value as i32)
}

/// Case-insensitive header lookup: the first alias found wins.
pub(crate) struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new(headers: &csv::StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_lowercase(), i))
            .collect();
        Self { positions }
    }

    pub(crate) fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.positions.get(*alias).copied())
    }

    pub(crate) fn require(
        &self,
        aliases: &[&str],
        column: &'static str,
        path: &str,
    ) -> Result<usize, LoadError> {
        self.find(aliases).ok_or_else(|| LoadError::MissingColumn {
            path: path.to_string(),
            column,
        })
    }

    /// First header whose name satisfies `pred`.
    pub(crate) fn find_by(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.positions
            .iter()
            .filter(|(name, _)| pred(name))
            .map(|(_, &i)| i)
            .min()
    }
}

pub(crate) fn cell<'a>(record: &'a csv::StringRecord, index: Option<usize>) -> &'a str {
    index.and_then(|i| record.get(i)).unwrap_or("").trim()
}
