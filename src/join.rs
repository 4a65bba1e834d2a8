// src/join.rs

use crate::error::{Error, Result};
use crate::model::JoinedRow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

const DELIMITER: char = ';';

#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub file_path: String,
    pub method: String,
    pub value: f64,
}

/// A `(file, method) -> value` table as read from a semicolon-delimited file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<DataRow>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<DataRow>) -> Self {
        Self { rows }
    }

    /// Parse delimited text. The first line is a header and is skipped;
    /// the first two columns are file and method, the last one the value.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (idx, line) in text.lines().enumerate().skip(1) {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            rows.push(parse_row(idx + 1, line)?);
        }
        Ok(Self { rows })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text)
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows keyed by `(file, method)`; repeated keys are summed.
    fn keyed(&self) -> HashMap<(&str, &str), f64> {
        let mut keyed: HashMap<(&str, &str), f64> = HashMap::new();
        for row in &self.rows {
            match keyed.entry((row.file_path.as_str(), row.method.as_str())) {
                Entry::Occupied(mut slot) => {
                    warn!("duplicate key {};{}, summing values", row.file_path, row.method);
                    *slot.get_mut() += row.value;
                }
                Entry::Vacant(slot) => {
                    slot.insert(row.value);
                }
            }
        }
        keyed
    }
}

fn parse_row(line_no: usize, line: &str) -> Result<DataRow> {
    let columns: Vec<&str> = line.split(DELIMITER).collect();
    if columns.len() < 3 {
        return Err(Error::InvalidRow {
            line: line_no,
            reason: format!("expected at least 3 columns, found {}", columns.len()),
        });
    }

    let raw = columns[columns.len() - 1].trim();
    let value = raw.parse::<f64>().map_err(|_| Error::InvalidRow {
        line: line_no,
        reason: format!("`{}` is not a number", raw),
    })?;

    Ok(DataRow {
        file_path: columns[0].to_string(),
        method: columns[1].to_string(),
        value,
    })
}

/// Inner join on exact `(file, method)` text; the combined value is the
/// product of both sides. Keys missing on either side are dropped.
///
/// Output is ordered by descending value, then file, then method, so it
/// does not depend on the order of the input rows.
pub fn join(left: &Dataset, right: &Dataset) -> Vec<JoinedRow> {
    let right = right.keyed();
    let mut joined: Vec<JoinedRow> = left
        .keyed()
        .into_iter()
        .filter_map(|((file, method), lhs)| {
            right.get(&(file, method)).map(|rhs| JoinedRow {
                file_path: file.to_string(),
                method: method.to_string(),
                combined_value: lhs * rhs,
            })
        })
        .collect();

    joined.sort_by(|a, b| {
        b.combined_value
            .total_cmp(&a.combined_value)
            .then_with(|| a.file_path.cmp(&b.file_path))
            .then_with(|| a.method.cmp(&b.method))
    });
    joined
}
