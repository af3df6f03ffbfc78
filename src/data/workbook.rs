//! Source contract: a workbook identifier in, one table per non-empty sheet out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{Cell, InstrumentTable};

use super::csv_workbook::CsvWorkbook;
use super::json_workbook::JsonWorkbook;

/// Terminal for one configuration, never for the whole run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("workbook not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("workbook {} is unreadable: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
}

impl SourceError {
    pub fn unreadable(path: &Path, reason: impl std::fmt::Display) -> Self {
        SourceError::Unreadable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type SheetMap = BTreeMap<String, InstrumentTable>;

pub trait WorkbookSource: Sync {
    /// Sheet name -> table. Empty sheets are left out.
    fn load_sheets(&self, file: &Path, index_column: &str) -> Result<SheetMap, SourceError>;
}

/// Picks the reader from the path: a directory is a CSV workbook, a `.json`
/// file a JSON workbook.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpreadsheetSource;

impl WorkbookSource for SpreadsheetSource {
    fn load_sheets(&self, file: &Path, index_column: &str) -> Result<SheetMap, SourceError> {
        if !file.exists() {
            return Err(SourceError::NotFound(file.to_path_buf()));
        }
        if file.is_dir() {
            return CsvWorkbook.load_sheets(file, index_column);
        }
        match file.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => {
                JsonWorkbook.load_sheets(file, index_column)
            }
            other => Err(SourceError::unreadable(
                file,
                format!("unsupported workbook format {:?}", other.unwrap_or("")),
            )),
        }
    }
}

/// Row-major sheet contents -> table, with the index column lifted out.
/// Returns `Ok(None)` for a sheet without rows.
pub(crate) fn build_table(
    path: &Path,
    sheet: &str,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
    index_column: &str,
) -> Result<Option<InstrumentTable>, SourceError> {
    if rows.is_empty() {
        log::debug!("Skipping empty sheet '{}' in {}", sheet, path.display());
        return Ok(None);
    }
    let Some(index_pos) = headers.iter().position(|h| h == index_column) else {
        return Err(SourceError::unreadable(
            path,
            format!("sheet '{}' has no index column '{}'", sheet, index_column),
        ));
    };

    let mut columns: Vec<(String, Vec<Cell>)> = headers
        .iter()
        .map(|h| (h.clone(), Vec::with_capacity(rows.len())))
        .collect();
    for row in rows {
        for (c, (_, cells)) in columns.iter_mut().enumerate() {
            cells.push(row.get(c).cloned().unwrap_or(Cell::Empty));
        }
    }

    let (_, index_cells) = columns.remove(index_pos);
    let index = index_cells.iter().map(|c| c.to_string()).collect();

    InstrumentTable::new(sheet, index, columns)
        .map(Some)
        .map_err(|e| SourceError::unreadable(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_workbook_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let err = SpreadsheetSource
            .load_sheets(&dir.path().join("MEXBOL.json"), "FECHA")
            .expect_err("missing file");
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn test_unknown_format_is_unreadable() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("MEXBOL.xlsx");
        fs::write(&path, b"PK\x03\x04").expect("write");
        let err = SpreadsheetSource.load_sheets(&path, "FECHA").expect_err("xlsx");
        assert!(matches!(err, SourceError::Unreadable { .. }));
    }

    #[test]
    fn test_dispatch_by_path_shape() {
        let dir = TempDir::new().expect("tempdir");
        let json = dir.path().join("book.json");
        fs::write(&json, r#"{"AMX": [{"FECHA": "2024-01-02", "Precio": 1.0}]}"#).expect("write");
        let sheets = SpreadsheetSource.load_sheets(&json, "FECHA").expect("json");
        assert!(sheets.contains_key("AMX"));

        let csv_dir = dir.path().join("book");
        fs::create_dir(&csv_dir).expect("mkdir");
        fs::write(csv_dir.join("WALMEX.csv"), "FECHA,Precio\n2024-01-02,3.5\n").expect("write");
        let sheets = SpreadsheetSource.load_sheets(&csv_dir, "FECHA").expect("csv");
        assert!(sheets.contains_key("WALMEX"));
    }

    #[test]
    fn test_build_table_lifts_index() {
        let table = build_table(
            Path::new("x"),
            "S",
            vec!["Precio".to_string(), "FECHA".to_string()],
            vec![
                vec![Cell::Number(1.0), Cell::Text("d1".to_string())],
                vec![Cell::Number(2.0)],
            ],
            "FECHA",
        )
        .expect("table")
        .expect("non-empty");
        assert_eq!(table.index(), &["d1".to_string(), String::new()]);
        assert_eq!(table.column_names(), &["Precio".to_string()]);
        assert!(!table.has_column("FECHA"));
    }

    #[test]
    fn test_missing_index_column_is_unreadable() {
        let err = build_table(
            Path::new("x"),
            "S",
            vec!["Precio".to_string()],
            vec![vec![Cell::Number(1.0)]],
            "FECHA",
        )
        .expect_err("no index");
        assert!(err.to_string().contains("FECHA"));
    }
}
