// src/session.rs
use tracing::{info, warn};

use crate::error::{ReportError, Result};
use crate::store::CsvStore;
use crate::table::Table;

/// The one table a user works on, with an explicit load → edit → save cycle.
#[derive(Debug)]
pub struct Session {
    store: CsvStore,
    table: Table,
    dirty: bool,
    /// Set when the source was absent and an empty table was substituted.
    notice: Option<String>,
}

impl Session {
    /// Load the store's table. A missing source degrades to an empty table
    /// with a notice; any other failure is returned.
    pub fn open(store: CsvStore) -> Result<Self> {
        let (table, notice) = match store.load() {
            Ok(table) => (table, None),
            Err(err @ ReportError::SourceNotFound { .. }) => {
                warn!(%err, "continuing with an empty table");
                (Table::default(), Some(err.to_string()))
            }
            Err(err) => return Err(err),
        };
        Ok(Self {
            store,
            table,
            dirty: false,
            notice,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// False for the empty stand-in used when the source was missing.
    pub fn has_columns(&self) -> bool {
        !self.table.headers().is_empty()
    }

    /// Edits need a header row to write back; a column-less table has none.
    fn ensure_columns(&self) -> Result<()> {
        if self.has_columns() {
            Ok(())
        } else {
            Err(ReportError::NoColumns {
                path: self.store.path().to_path_buf(),
            })
        }
    }

    pub fn set_cell(&mut self, row: usize, column: &str, value: impl Into<String>) -> Result<()> {
        self.ensure_columns()?;
        self.table.set_cell(row, column, value.into())?;
        self.dirty = true;
        Ok(())
    }

    pub fn append_row(&mut self, values: Vec<String>) -> Result<()> {
        self.ensure_columns()?;
        self.table.push_row(values)?;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_row(&mut self, row: usize) -> Result<Vec<String>> {
        self.ensure_columns()?;
        let removed = self.table.remove_row(row)?;
        self.dirty = true;
        Ok(removed)
    }

    /// Write the current table over the source file.
    pub fn save(&mut self) -> Result<()> {
        self.ensure_columns()?;
        self.store.save(&self.table)?;
        self.dirty = false;
        self.notice = None;
        info!(path = %self.store.path().display(), "session saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::table_of;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn absent_source_gives_empty_table_with_notice() -> Result<()> {
        let dir = tempdir()?;
        let session = Session::open(CsvStore::new(dir.path().join("testc.csv")))?;
        assert!(session.table().is_empty());
        assert!(session.table().headers().is_empty());
        assert!(session.notice().unwrap().contains("testc.csv"));
        assert!(!session.has_columns());
        Ok(())
    }

    #[test]
    fn absent_source_refuses_edits_and_writes_nothing() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("testc.csv");
        let mut session = Session::open(CsvStore::new(&path))?;

        for res in [
            session.append_row(vec!["Jan".into(), "Design".into()]),
            session.append_row(Vec::new()),
            session.set_cell(0, "horas", "1"),
            session.delete_row(0).map(|_| ()),
            session.save(),
        ] {
            assert!(matches!(res, Err(ReportError::NoColumns { .. })));
        }
        assert!(!session.is_dirty());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn edits_persist_after_save() -> Result<()> {
        let dir = tempdir()?;
        let store = CsvStore::new(dir.path().join("hours.csv"));
        store.save(&table_of(
            &["mes", "actividad", "horas"],
            &[&["Jan", "Design", "3"], &["Jan", "Build", "5"]],
        ))?;

        let mut session = Session::open(store.clone())?;
        assert!(session.notice().is_none());
        session.set_cell(0, "horas", "4")?;
        session.append_row(vec!["Feb".into(), "Test".into()])?;
        session.delete_row(1)?;
        assert!(session.is_dirty());

        // nothing reaches disk before save
        assert_eq!(store.load()?.rows()[0][2], "3");

        session.save()?;
        assert!(!session.is_dirty());
        let reloaded = store.load()?;
        assert_eq!(&reloaded, session.table());
        assert_eq!(
            reloaded.rows(),
            &[
                vec!["Jan".to_string(), "Design".to_string(), "4".to_string()],
                vec!["Feb".to_string(), "Test".to_string(), String::new()],
            ]
        );
        Ok(())
    }

    #[test]
    fn failed_edit_leaves_session_clean() -> Result<()> {
        let dir = tempdir()?;
        let store = CsvStore::new(dir.path().join("hours.csv"));
        store.save(&table_of(&["mes"], &[&["Jan"]]))?;
        let mut session = Session::open(store)?;
        assert!(session.set_cell(0, "actividad", "x").is_err());
        assert!(session.delete_row(5).is_err());
        assert!(!session.is_dirty());
        Ok(())
    }
}
