use std::{fmt, path::PathBuf};

use thiserror::Error;

/// One unparsable measure cell, by row index in the loaded table.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureFailure {
    pub row: usize,
    pub value: String,
}

impl fmt::Display for MeasureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {:?}", self.row, self.value)
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("source file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("missing column `{column}`")]
    MissingColumn { column: String },

    #[error("non-numeric values in `{column}`: {}", list_failures(failures))]
    InvalidMeasure {
        column: String,
        failures: Vec<MeasureFailure>,
    },

    #[error("row {row} out of range ({len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("no columns loaded from {}; nothing to edit", path.display())]
    NoColumns { path: PathBuf },

    #[error("row has {got} values, table has {expected} columns")]
    RowWidth { got: usize, expected: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ReportError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        ReportError::MissingColumn {
            column: column.into(),
        }
    }
}

fn list_failures(failures: &[MeasureFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_measure_lists_every_row() {
        let err = ReportError::InvalidMeasure {
            column: "horas".into(),
            failures: vec![
                MeasureFailure {
                    row: 2,
                    value: "abc".into(),
                },
                MeasureFailure {
                    row: 7,
                    value: "1,5".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            r#"non-numeric values in `horas`: row 2: "abc", row 7: "1,5""#
        );
    }
}
