// src/store.rs
use csv::{ReaderBuilder, WriterBuilder};
use std::{
    fs::File,
    io::{self, BufReader, Read, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{ReportError, Result};
use crate::table::Table;

/// Whole-file CSV storage for one table.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file. A missing file is `SourceNotFound`, distinct from
    /// parse failures.
    #[tracing::instrument(level = "info", skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Table> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ReportError::SourceNotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let table = read_table(BufReader::new(file))?;
        info!(
            rows = table.len(),
            columns = table.headers().len(),
            "loaded table"
        );
        Ok(table)
    }

    /// Overwrite the file with `table`, header row first.
    ///
    /// Writes to a sibling temp file and renames it over the target. No
    /// locking: concurrent writers race and the last one wins.
    #[tracing::instrument(level = "info", skip(self, table), fields(path = %self.path.display()))]
    pub fn save(&self, table: &Table) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        write_table(&mut tmp, table)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| ReportError::Io(e.error))?;
        info!(rows = table.len(), "saved table");
        Ok(())
    }
}

/// Parse CSV with a header row. Ragged rows are normalized by [`Table::from_rows`].
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    debug!(rows = rows.len(), "parsed csv records");
    Ok(Table::from_rows(headers, rows))
}

pub fn write_table<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(table.headers())?;
    for row in table.rows() {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{init_test_logging, table_of};
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_source_not_found() {
        let dir = tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("nope.csv"));
        assert!(matches!(
            store.load(),
            Err(ReportError::SourceNotFound { path }) if path.ends_with("nope.csv")
        ));
    }

    #[test]
    fn malformed_utf8_is_a_parse_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.csv");
        fs::write(&path, b"mes,horas\nJan,\xff\xfe\n")?;
        assert!(matches!(
            CsvStore::new(&path).load(),
            Err(ReportError::Csv(_))
        ));
        Ok(())
    }

    #[test]
    fn load_normalizes_missing_cells() -> Result<()> {
        init_test_logging();
        let data = "mes,actividad,horas\nJan,Design\nJan,Build,5\n";
        let table = read_table(data.as_bytes())?;
        assert_eq!(table.rows()[0], vec!["Jan", "Design", ""]);
        assert_eq!(table.rows()[1], vec!["Jan", "Build", "5"]);
        Ok(())
    }

    #[test]
    fn save_then_load_round_trips() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let store = CsvStore::new(dir.path().join("hours.csv"));
        let table = table_of(
            &["mes", "actividad", "horas", "descripcion"],
            &[
                &["Jan", "Design", "3", "quoted, with comma"],
                &["Feb", "Build", "", "line\nbreak"],
            ],
        );
        store.save(&table)?;
        assert_eq!(store.load()?, table);

        let text = fs::read_to_string(store.path())?;
        assert!(text.starts_with("mes,actividad,horas,descripcion\n"));
        Ok(())
    }

    #[test]
    fn save_overwrites_previous_contents() -> Result<()> {
        let dir = tempdir()?;
        let store = CsvStore::new(dir.path().join("hours.csv"));
        store.save(&table_of(&["a", "b"], &[&["1", "2"], &["3", "4"]]))?;
        let smaller = table_of(&["a"], &[&["9"]]);
        store.save(&smaller)?;
        assert_eq!(fs::read_to_string(store.path())?, "a\n9\n");
        Ok(())
    }
}
