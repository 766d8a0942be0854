// src/table/entry.rs
//! Validation boundary: untyped table rows → typed timesheet entries.

use serde::{Deserialize, Serialize};

use super::Table;
use crate::error::{MeasureFailure, ReportError, Result};

/// Names of the columns the report pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSet {
    pub period: String,
    pub category: String,
    pub measure: String,
    /// Secondary columns shown when drilling into one category.
    pub detail: Vec<String>,
}

impl Default for ColumnSet {
    fn default() -> Self {
        Self {
            period: "mes".into(),
            category: "actividad".into(),
            measure: "horas".into(),
            detail: vec!["proyecto".into(), "descripcion".into(), "recurso".into()],
        }
    }
}

/// One row with its required attributes resolved and its measure parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<'a> {
    /// Row index in the loaded table.
    pub row: usize,
    pub period: &'a str,
    pub category: &'a str,
    pub measure: f64,
}

/// Trim whitespace and strip one pair of outer quotes.
fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Coerce a measure cell: blank → 0, otherwise a finite number or `None`.
pub fn parse_measure(raw: &str) -> Option<f64> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() {
        return Some(0.0);
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse every cell of `column`, collecting all failures into one error.
pub fn measure_values(table: &Table, column: &str) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(table.len());
    let mut failures = Vec::new();
    for (row, raw) in table.column(column)?.enumerate() {
        match parse_measure(raw) {
            Some(v) => values.push(v),
            None => failures.push(MeasureFailure {
                row: table.origin(row),
                value: raw.to_string(),
            }),
        }
    }
    if !failures.is_empty() {
        return Err(ReportError::InvalidMeasure {
            column: column.to_string(),
            failures,
        });
    }
    Ok(values)
}

/// Check the required columns, then parse each row into an [`Entry`].
pub fn entries<'a>(table: &'a Table, columns: &ColumnSet) -> Result<Vec<Entry<'a>>> {
    let period = table.column_index(&columns.period)?;
    let category = table.column_index(&columns.category)?;
    let measures = measure_values(table, &columns.measure)?;

    Ok(table
        .rows()
        .iter()
        .zip(measures)
        .enumerate()
        .map(|(row, (cells, measure))| Entry {
            row: table.origin(row),
            period: &cells[period],
            category: &cells[category],
            measure,
        })
        .collect())
}
