// src/table/mod.rs
pub mod entry;

use crate::error::{ReportError, Result};
use tracing::warn;

pub use entry::{entries, measure_values, parse_measure, ColumnSet, Entry};

/// In-memory table: a header row plus string cells.
///
/// Every row has exactly `headers.len()` cells. Missing cells are stored as
/// `""`, never left absent. `origin[i]` is the index row `i` had in the table
/// it was loaded as; filtered tables keep it so errors point at source rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    origin: Vec<usize>,
}

impl Table {
    /// Build a table, padding short rows with `""` and truncating long ones
    /// to the header width.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, mut row)| {
                if row.len() > width {
                    warn!(
                        row = idx,
                        cells = row.len(),
                        width,
                        "dropping cells beyond header width"
                    );
                    row.truncate(width);
                }
                row.resize(width, String::new());
                row
            })
            .collect::<Vec<_>>();
        let origin = (0..rows.len()).collect();
        Self {
            headers,
            rows,
            origin,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of `row` in the table this one was filtered from.
    pub fn origin(&self, row: usize) -> usize {
        self.origin[row]
    }

    /// Position of `name` in the header row.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReportError::missing_column(name))
    }

    /// Iterate the cells of one column, in row order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &str> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    /// A new table with the same headers holding the rows that satisfy `keep`.
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[String]) -> bool,
    {
        let (rows, origin): (Vec<Vec<String>>, Vec<usize>) = self
            .rows
            .iter()
            .zip(&self.origin)
            .filter(|(row, _)| keep(row.as_slice()))
            .map(|(row, &o)| (row.clone(), o))
            .unzip();
        Table {
            headers: self.headers.clone(),
            rows,
            origin,
        }
    }

    /// A copy with `name` removed. Unknown names leave the copy unchanged.
    pub fn without_column(&self, name: &str) -> Table {
        let Some(idx) = self.headers.iter().position(|h| h == name) else {
            return self.clone();
        };
        let mut out = self.clone();
        out.headers.remove(idx);
        for row in &mut out.rows {
            row.remove(idx);
        }
        out
    }

    pub fn set_cell(&mut self, row: usize, column: &str, value: String) -> Result<()> {
        let col = self.column_index(column)?;
        let len = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(ReportError::RowOutOfRange { row, len })?;
        cells[col] = value;
        Ok(())
    }

    /// Append a row. Fewer values than columns are padded with `""`; more is
    /// an error.
    pub fn push_row(&mut self, mut values: Vec<String>) -> Result<()> {
        let expected = self.headers.len();
        if values.len() > expected {
            return Err(ReportError::RowWidth {
                got: values.len(),
                expected,
            });
        }
        values.resize(expected, String::new());
        let next = self.origin.iter().max().map_or(0, |m| m + 1);
        self.rows.push(values);
        self.origin.push(next);
        Ok(())
    }

    pub fn remove_row(&mut self, row: usize) -> Result<Vec<String>> {
        let len = self.rows.len();
        if row >= len {
            return Err(ReportError::RowOutOfRange { row, len });
        }
        let gone = self.origin.remove(row);
        for o in &mut self.origin {
            if *o > gone {
                *o -= 1;
            }
        }
        Ok(self.rows.remove(row))
    }
}

#[cfg(test)]
pub(crate) fn table_of(headers: &[&str], rows: &[&[&str]]) -> Table {
    Table::from_rows(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hourboard=debug")),
        )
        .with_test_writer()
        .finish();
    // another test may have installed it already
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_normalized() {
        init_test_logging();
        let t = table_of(&["a", "b", "c"], &[&["1"], &["1", "2", "3", "4"]]);
        assert_eq!(t.rows()[0], vec!["1", "", ""]);
        assert_eq!(t.rows()[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn unknown_column_is_missing_column() {
        let t = table_of(&["mes"], &[&["Jan"]]);
        match t.column_index("actividad") {
            Err(ReportError::MissingColumn { column }) => assert_eq!(column, "actividad"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn without_column_drops_header_and_cells() {
        let t = table_of(&["a", "secret", "b"], &[&["1", "x", "2"]]);
        let v = t.without_column("secret");
        assert_eq!(v.headers(), &["a".to_string(), "b".to_string()]);
        assert_eq!(v.rows()[0], vec!["1", "2"]);
        assert_eq!(t.without_column("nope"), t);
    }

    #[test]
    fn edits_check_bounds() {
        let mut t = table_of(&["a", "b"], &[&["1", "2"]]);
        t.set_cell(0, "b", "9".into()).unwrap();
        assert_eq!(t.rows()[0], vec!["1", "9"]);
        assert!(matches!(
            t.set_cell(3, "a", "x".into()),
            Err(ReportError::RowOutOfRange { row: 3, len: 1 })
        ));

        t.push_row(vec!["3".into()]).unwrap();
        assert_eq!(t.rows()[1], vec!["3", ""]);
        assert!(matches!(
            t.push_row(vec!["1".into(), "2".into(), "3".into()]),
            Err(ReportError::RowWidth {
                got: 3,
                expected: 2
            })
        ));

        assert_eq!(t.remove_row(0).unwrap(), vec!["1", "9"]);
        assert_eq!(t.len(), 1);
        assert!(t.remove_row(1).is_err());
    }

    #[test]
    fn filtered_rows_remember_their_source_index() {
        let t = table_of(&["mes"], &[&["Feb"], &["Jan"], &["Feb"], &["Jan"]]);
        let jan = t.filter_rows(|row| row[0] == "Jan");
        assert_eq!(jan.len(), 2);
        assert_eq!((jan.origin(0), jan.origin(1)), (1, 3));

        let again = jan.filter_rows(|_| true).without_column("nope");
        assert_eq!(again.origin(1), 3);
    }

    #[test]
    fn origin_follows_edits() {
        let mut t = table_of(&["a"], &[&["x"], &["y"], &["z"]]);
        t.remove_row(0).unwrap();
        assert_eq!((t.origin(0), t.origin(1)), (0, 1));
        t.push_row(vec!["w".into()]).unwrap();
        assert_eq!(t.origin(2), 2);
    }
}
